use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use super::buffer::StreamBuffer;
use super::error::StreamError;
use super::policy::ErrorPolicy;
use crate::domain::Reading;
use crate::io::IoError;
use crate::storage::{BatchWriter, Commit};

/// Counters for one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records read from the source
    pub read: usize,
    /// Records taken by the buffer
    pub accepted: usize,
    /// Records the buffer refused
    pub rejected: usize,
    /// Rows that could not be read
    pub unreadable: usize,
}

/// Drives a record stream into a stream buffer
///
/// [`process_stream`](Self::process_stream) leaves the buffer open, so an
/// aborted import can be dropped without committing the open window.
/// [`run`](Self::run) closes it once the stream has been read to the end.
pub struct ImportSession<R, W, P> {
    buffer: StreamBuffer<R, W>,
    error_policy: P,
    summary: ImportSummary,
}

impl<R, W, P> ImportSession<R, W, P>
where
    R: Reading + Clone + Send + Sync,
    W: BatchWriter<R>,
    P: ErrorPolicy,
{
    pub fn new(buffer: StreamBuffer<R, W>, error_policy: P) -> Self {
        Self {
            buffer,
            error_policy,
            summary: ImportSummary::default(),
        }
    }

    /// Process a stream of records
    /// Returns true if every record was accepted (or skipped per policy)
    /// Returns false if the policy aborted or the buffer faulted; the fault is
    /// available from [`buffer`](Self::buffer)
    pub async fn process_stream<S>(&mut self, mut stream: S) -> bool
    where
        S: Stream<Item = Result<R, IoError>> + Unpin,
    {
        while let Some(result) = stream.next().await {
            match result {
                Ok(record) => {
                    self.summary.read += 1;
                    let commit = self.buffer.write_one(record).await;
                    match commit.error {
                        None => self.summary.accepted += 1,
                        Some(StreamError::ContractViolation(violation)) => {
                            self.summary.rejected += 1;
                            if !self.error_policy.handle_contract_violation(violation) {
                                return false;
                            }
                        }
                        Some(fault) => {
                            warn!(kind = %R::KIND, %fault, "Import stopped on store fault");
                            return false;
                        }
                    }
                }
                Err(e) => {
                    self.summary.unreadable += 1;
                    if !self.error_policy.handle_io_error(e) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Process a stream and close the buffer once it has been read to the end
    ///
    /// `Ok(false)` means the error policy aborted; the open window is left
    /// uncommitted. A store fault, raised while writing or while closing, is
    /// returned as the error.
    pub async fn run<S>(&mut self, stream: S) -> Result<bool, StreamError>
    where
        S: Stream<Item = Result<R, IoError>> + Unpin,
    {
        if !self.process_stream(stream).await {
            return match self.buffer.fault() {
                Some(fault) => Err(fault.clone()),
                None => Ok(false),
            };
        }

        self.close().await.into_result()?;
        debug!(kind = %R::KIND, read = self.summary.read, "Session closed");
        Ok(true)
    }

    /// Commit what is still buffered and flush the downstream chain
    pub async fn close(&mut self) -> Commit<StreamError> {
        self.buffer.close().await
    }

    pub fn summary(&self) -> ImportSummary {
        self.summary
    }

    pub fn buffer(&self) -> &StreamBuffer<R, W> {
        &self.buffer
    }

    /// Consume the session and return the buffer
    pub fn into_buffer(self) -> StreamBuffer<R, W> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GlucoseRead;
    use crate::storage::{MemoryBatchStore, ScriptedOutcome, StorageError};
    use crate::streaming::policy::{AbortOnError, SilentSkip, SkipErrors};
    use chrono::{DateTime, TimeZone, Utc};
    use futures::stream;
    use std::io;
    use std::time::Duration;

    type Store = MemoryBatchStore<GlucoseRead>;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2014, 4, 18, hour, minute, 0).unwrap()
    }

    fn read(hour: u32, minute: u32) -> Result<GlucoseRead, IoError> {
        Ok(GlucoseRead::new(at(hour, minute), 120))
    }

    fn unreadable() -> Result<GlucoseRead, IoError> {
        Err(IoError::from(io::Error::new(io::ErrorKind::InvalidData, "bad row")))
    }

    fn session<P: ErrorPolicy>(policy: P) -> (ImportSession<GlucoseRead, Store, P>, Store) {
        let store = Store::new();
        let buffer = StreamBuffer::new(store.clone(), Duration::from_secs(3600)).unwrap();
        (ImportSession::new(buffer, policy), store)
    }

    #[tokio::test]
    async fn imports_valid_records() {
        let (mut session, store) = session(SilentSkip);

        let records = vec![read(0, 0), read(0, 30), read(1, 0), read(1, 30)];
        assert!(session.process_stream(stream::iter(records)).await);

        // The last window is held until close
        assert_eq!(store.records().await.len(), 2);
        assert_eq!(session.buffer().buffered(), 2);

        assert!(session.close().await.is_ok());
        assert_eq!(store.records().await.len(), 4);
        assert_eq!(
            session.summary(),
            ImportSummary {
                read: 4,
                accepted: 4,
                rejected: 0,
                unreadable: 0,
            }
        );
    }

    #[tokio::test]
    async fn skip_errors_continues_past_bad_rows() {
        let (mut session, _store) = session(SkipErrors);

        let records = vec![read(0, 0), unreadable(), read(0, 10)];
        assert!(session.process_stream(stream::iter(records)).await);

        assert_eq!(session.summary().accepted, 2);
        assert_eq!(session.summary().unreadable, 1);
    }

    #[tokio::test]
    async fn skip_errors_continues_past_out_of_order_records() {
        let (mut session, _store) = session(SkipErrors);

        let records = vec![read(2, 0), read(1, 0), read(2, 5)];
        assert!(session.process_stream(stream::iter(records)).await);

        assert_eq!(session.summary().accepted, 2);
        assert_eq!(session.summary().rejected, 1);
        assert_eq!(session.buffer().buffered(), 2);
    }

    #[tokio::test]
    async fn abort_on_error_stops_on_bad_row() {
        let (mut session, _store) = session(AbortOnError);

        let records = vec![read(0, 0), unreadable(), read(0, 10)];
        assert!(!session.process_stream(stream::iter(records)).await);

        assert_eq!(session.summary().accepted, 1);
        assert_eq!(session.buffer().buffered(), 1);
    }

    #[tokio::test]
    async fn store_fault_stops_any_policy() {
        let (mut session, store) = session(SilentSkip);
        store
            .script(ScriptedOutcome::Fail {
                committed: 0,
                error: StorageError::Unavailable("datastore".to_string()),
            })
            .await;

        let records = vec![read(0, 0), read(1, 0), read(1, 5)];
        assert!(!session.process_stream(stream::iter(records)).await);

        assert_eq!(session.summary().read, 2);
        assert_eq!(session.summary().accepted, 1);
        assert!(session.buffer().fault().is_some());
        // Nothing was lost: the failed window is still buffered
        assert_eq!(session.buffer().buffered(), 1);
    }

    #[tokio::test]
    async fn run_closes_after_clean_import() {
        let (mut session, store) = session(SkipErrors);

        let records = vec![read(0, 0), unreadable(), read(0, 30), read(1, 0)];
        assert!(session.run(stream::iter(records)).await.unwrap());

        assert_eq!(store.records().await.len(), 3);
        assert_eq!(store.flushes().await, 1);
        assert_eq!(session.buffer().buffered(), 0);
    }

    #[tokio::test]
    async fn run_leaves_window_open_when_aborted() {
        let (mut session, store) = session(AbortOnError);

        let records = vec![read(0, 0), read(0, 30), unreadable()];
        assert!(!session.run(stream::iter(records)).await.unwrap());

        assert_eq!(store.write_calls().await, 0);
        assert_eq!(store.flushes().await, 0);
        assert_eq!(session.buffer().buffered(), 2);
    }

    #[tokio::test]
    async fn run_reports_store_fault() {
        let (mut session, store) = session(SkipErrors);
        store.script(ScriptedOutcome::Partial(0)).await;

        let records = vec![read(0, 0), read(1, 0)];
        let err = session.run(stream::iter(records)).await.unwrap_err();

        assert!(matches!(
            err,
            StreamError::ShortWrite {
                committed: 0,
                submitted: 1
            }
        ));
    }

    #[tokio::test]
    async fn processes_empty_stream() {
        let (mut session, store) = session(SilentSkip);

        let records: Vec<Result<GlucoseRead, IoError>> = vec![];
        assert!(session.process_stream(stream::iter(records)).await);

        assert_eq!(session.summary(), ImportSummary::default());
        assert_eq!(store.write_calls().await, 0);
    }

    #[tokio::test]
    async fn into_buffer_returns_buffer() {
        let (session, _store) = session(SilentSkip);
        let buffer = session.into_buffer();
        assert_eq!(buffer.buffered(), 0);
    }
}
