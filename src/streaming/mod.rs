mod admission;
pub mod buffer;
pub mod config;
pub mod error;
mod flusher;
pub mod policy;
pub mod session;
pub mod versioned;

// Re-export commonly used types
pub use buffer::StreamBuffer;
pub use config::StreamConfig;
pub use error::{ConfigError, ContractViolation, StreamError};
pub use policy::{AbortOnError, ErrorPolicy, SilentSkip, SkipErrors};
pub use session::{ImportSession, ImportSummary};
pub use versioned::VersionedStream;
