//! Time-windowed batching of timestamped records in front of a batch store
//!
//! A [`StreamBuffer`](streaming::StreamBuffer) accepts records in time order,
//! groups them into windows of bounded span, and hands each closed window to a
//! [`BatchWriter`](storage::BatchWriter) in one call.

pub mod app;
pub mod domain;
pub mod io;
pub mod prelude;
pub mod storage;
pub mod streaming;
pub mod window;
