use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::admission::Admission;
use super::config::StreamConfig;
use super::error::{ConfigError, ContractViolation, StreamError};
use super::flusher;
use crate::domain::Timestamped;
use crate::storage::{BatchWriter, Commit};
use crate::window::{SharedRun, Windowing};

/// Time-windowed buffer whose operations never mutate an existing version
///
/// Every call takes `&self` and returns the next version alongside the
/// outcome. A caller holding an earlier version keeps seeing exactly the
/// records and writer handle it saw before; it can keep writing from that
/// version, which forks the stream.
///
/// The writer is a cloneable handle. Each version flushes through its own
/// clone and the next version adopts the handle as the writer left it, so
/// writers that track an offset or generation carry it forward.
///
/// Failures follow the same rules as [`StreamBuffer`](super::StreamBuffer):
/// the uncommitted suffix stays in the returned version and the fault sticks
/// until [`without_fault`](Self::without_fault) is used.
#[derive(Clone)]
pub struct VersionedStream<R, W> {
    writer: W,
    admission: Admission,
    run: SharedRun<R>,
    anchor: Option<DateTime<Utc>>,
    fault: Option<StreamError>,
    closed: bool,
}

impl<R, W> VersionedStream<R, W>
where
    R: Timestamped + Clone + Send + Sync,
    W: BatchWriter<R> + Clone,
{
    /// Grid-aligned windows of `window` in front of `writer`
    pub fn new(writer: W, window: Duration) -> Result<Self, ConfigError> {
        Self::with_config(writer, &StreamConfig::new(window))
    }

    pub fn with_config(writer: W, config: &StreamConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            writer,
            admission: Admission::from_config(config)?,
            run: SharedRun::new(),
            anchor: None,
            fault: None,
            closed: false,
        })
    }

    pub async fn write_one(&self, record: R) -> (Self, Commit<StreamError>) {
        self.write_many(std::slice::from_ref(&record)).await
    }

    /// Write records sorted oldest first, producing the next version
    pub async fn write_many(&self, records: &[R]) -> (Self, Commit<StreamError>) {
        let mut next = self.clone();
        let outcome = next.apply_writes(records).await;
        (next, outcome)
    }

    /// Commit the open window, producing the next version
    pub async fn flush(&self) -> (Self, Commit<StreamError>) {
        let mut next = self.clone();
        let outcome = next.commit_open_window().await;
        (next, outcome)
    }

    /// Flush the open window and then the writer, producing the next version
    pub async fn close(&self) -> (Self, Commit<StreamError>) {
        if self.closed {
            return (self.clone(), Commit::complete(0));
        }

        let mut next = self.clone();
        let outcome = next.commit_open_window().await;
        if !outcome.is_ok() {
            return (next, outcome);
        }

        if let Err(error) = next.writer.flush().await {
            warn!(%error, "Downstream flush failed");
            return (
                next,
                Commit::failed(outcome.committed, StreamError::store(error)),
            );
        }

        next.closed = true;
        info!(committed = outcome.committed, "Versioned stream closed");
        (next, outcome)
    }

    async fn apply_writes(&mut self, records: &[R]) -> Commit<StreamError> {
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

            if self.admission.needs_flush(self.anchor, self.run.len(), at) {
                let outcome = self.commit_open_window().await;
                if let Some(error) = outcome.error {
                    return Commit::failed(index, error);
                }
            }

            self.admission.accept(at);
            if self.run.is_empty() {
                self.anchor = Some(anchor);
            }
            self.run.push(record.clone());
            self.closed = false;
        }

        Commit::complete(records.len())
    }

    async fn commit_open_window(&mut self) -> Commit<StreamError> {
        if let Some(fault) = &self.fault {
            return Commit::failed(0, fault.clone());
        }

        let batch = self.run.to_vec();
        let outcome = flusher::commit_run(&mut self.writer, &batch, self.anchor).await;

        match &outcome.error {
            None => {
                self.run = SharedRun::new();
                self.anchor = None;
            }
            Some(error) => {
                self.run = self.run.without_committed(outcome.committed);
                if self.run.is_empty() {
                    self.anchor = None;
                }
                self.fault = Some(error.clone());
            }
        }

        outcome
    }
}

impl<R, W> VersionedStream<R, W>
where
    R: Clone,
    W: Clone,
{
    /// This version with its fault cleared, so the next flush retries
    pub fn without_fault(&self) -> Self {
        Self {
            fault: None,
            ..self.clone()
        }
    }

    /// Buffered records of this version, oldest first
    pub fn pending(&self) -> Vec<R> {
        self.run.to_vec()
    }
}

impl<R, W> VersionedStream<R, W> {
    pub fn buffered(&self) -> usize {
        self.run.len()
    }

    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.anchor
    }

    pub fn windowing(&self) -> Windowing {
        self.admission.windowing()
    }

    pub fn fault(&self) -> Option<&StreamError> {
        self.fault.as_ref()
    }

    /// Writer handle as this version last left it
    pub fn writer(&self) -> &W {
        &self.writer
    }
}
