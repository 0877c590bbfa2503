use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::admission::Admission;
use super::config::StreamConfig;
use super::error::{ConfigError, ContractViolation, StreamError};
use super::flusher;
use crate::domain::Timestamped;
use crate::storage::{BatchWriter, Commit};
use crate::window::{Window, Windowing};

/// Time-windowed write buffer in front of a batch writer
///
/// Records must arrive in non-decreasing time order. They accumulate in the
/// open window until a record falls outside it, at which point the window is
/// committed to the downstream writer as one batch and the record opens the
/// next window. Nothing is flushed on a timer: a window only closes on a
/// crossing, an explicit [`flush`](Self::flush) or [`close`](Self::close).
///
/// A failed commit keeps the uncommitted records at the front of the window
/// and records a fault. While the fault is set, writes and flushes return it
/// without touching the downstream writer; [`clear_fault`](Self::clear_fault)
/// lets the next flush retry.
///
/// The buffer is itself a [`BatchWriter`], so buffers can be chained.
///
/// # Example
/// ```rust,ignore
/// let store = MemoryBatchStore::new();
/// let mut buffer = StreamBuffer::new(store, Duration::from_secs(3600))?;
///
/// buffer.write_many(&reads).await.into_result()?;
/// buffer.close().await.into_result()?;
/// ```
pub struct StreamBuffer<R, W> {
    writer: W,
    admission: Admission,
    window: Window<R>,
    fault: Option<StreamError>,
    closed: bool,
}

impl<R, W> StreamBuffer<R, W>
where
    R: Timestamped + Clone + Send + Sync,
    W: BatchWriter<R>,
{
    /// Grid-aligned windows of `window` in front of `writer`
    pub fn new(writer: W, window: Duration) -> Result<Self, ConfigError> {
        Self::with_config(writer, &StreamConfig::new(window))
    }

    pub fn with_config(writer: W, config: &StreamConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            writer,
            admission: Admission::from_config(config)?,
            window: Window::new(),
            fault: None,
            closed: false,
        })
    }

    /// Write a single record
    pub async fn write_one(&mut self, record: R) -> Commit<StreamError> {
        self.write_many(std::slice::from_ref(&record)).await
    }

    /// Write records sorted oldest first
    ///
    /// Every window boundary crossed along the way is flushed before the
    /// crossing record is buffered. `committed` in the result counts the input
    /// records the buffer accepted; on error the records from that index on
    /// were not accepted and can be resubmitted.
    pub async fn write_many(&mut self, records: &[R]) -> Commit<StreamError> {
        if let Some(fault) = &self.fault {
            return Commit::failed(0, fault.clone());
        }
        if records.is_empty() {
            warn!("Rejected empty batch");
            return Commit::failed(0, ContractViolation::EmptyBatch.into());
        }

        for (index, record) in records.iter().enumerate() {
            let at = record.timestamp();

            let anchor = match self.admission.admit(index, at) {
                Ok(anchor) => anchor,
                Err(violation) => {
                    warn!(%violation, "Rejected record");
                    return Commit::failed(index, violation.into());
                }
            };

            if self
                .admission
                .needs_flush(self.window.anchor(), self.window.len(), at)
            {
                let outcome = self.flush().await;
                if let Some(error) = outcome.error {
                    return Commit::failed(index, error);
                }
            }

            self.admission.accept(at);
            self.window.push(anchor, record.clone());
            self.closed = false;
        }

        Commit::complete(records.len())
    }

    /// Commit the open window regardless of boundaries
    ///
    /// `committed` counts the records the downstream writer took. On failure
    /// the rest stay buffered and the error becomes the buffer's fault.
    pub async fn flush(&mut self) -> Commit<StreamError> {
        if let Some(fault) = &self.fault {
            return Commit::failed(0, fault.clone());
        }

        let outcome = flusher::commit_run(
            &mut self.writer,
            self.window.records(),
            self.window.anchor(),
        )
        .await;

        match &outcome.error {
            None => self.window.clear(),
            Some(error) => {
                self.window.discard_committed(outcome.committed);
                self.fault = Some(error.clone());
            }
        }

        outcome
    }

    /// Flush the open window, then the downstream writer
    ///
    /// Closing again without writing in between does nothing. If the
    /// downstream flush fails the local window is already committed; the
    /// error is returned and the next `close` retries only the downstream
    /// flush.
    pub async fn close(&mut self) -> Commit<StreamError> {
        if self.closed {
            return Commit::complete(0);
        }

        let outcome = self.flush().await;
        if !outcome.is_ok() {
            return outcome;
        }

        if let Err(error) = self.writer.flush().await {
            warn!(%error, "Downstream flush failed");
            return Commit::failed(outcome.committed, StreamError::store(error));
        }

        self.closed = true;
        info!(committed = outcome.committed, "Stream closed");
        outcome
    }
}

impl<R, W> StreamBuffer<R, W> {
    /// Records held in the open window, not yet committed
    pub fn buffered(&self) -> usize {
        self.window.len()
    }

    /// Buffered records, oldest first
    pub fn pending(&self) -> &[R] {
        self.window.records()
    }

    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.window.anchor()
    }

    pub fn windowing(&self) -> Windowing {
        self.admission.windowing()
    }

    /// Fault recorded by the last failed flush
    pub fn fault(&self) -> Option<&StreamError> {
        self.fault.as_ref()
    }

    /// Forget the recorded fault so the next flush retries the retained records
    pub fn clear_fault(&mut self) -> Option<StreamError> {
        self.fault.take()
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Give back the downstream writer, dropping anything still buffered
    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> BatchWriter<R> for StreamBuffer<R, W>
where
    R: Timestamped + Clone + Send + Sync,
    W: BatchWriter<R>,
{
    type Error = StreamError;

    async fn write_batch(&mut self, batch: &[R]) -> Commit<StreamError> {
        self.write_many(batch).await
    }

    async fn flush(&mut self) -> Result<(), StreamError> {
        self.close().await.into_result().map(|_| ())
    }
}
