use async_trait::async_trait;
use csv_async::AsyncSerializer;
use serde::Serialize;
use tokio::io::AsyncWrite;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, warn};

use super::error::IoError;
use crate::storage::{BatchWriter, Commit};

/// Batch writer appending records as CSV rows to an async writer
///
/// The header row is written with the first record. Rows sit in the
/// serializer's buffer until [`BatchWriter::flush`] is called.
///
/// A row that fails to serialize may leave its leading fields in that buffer.
/// From then on the sink refuses every write and flush with
/// [`IoError::SinkBroken`], so a partial row never reaches the writer.
pub struct CsvBatchSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    serializer: AsyncSerializer<Compat<W>>,
    batches: usize,
    rows: usize,
    broken: bool,
}

impl<W> CsvBatchSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            serializer: AsyncSerializer::from_writer(writer.compat_write()),
            batches: 0,
            rows: 0,
            broken: false,
        }
    }

    /// Number of batches written in full
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Number of rows written
    pub fn rows(&self) -> usize {
        self.rows
    }
}

#[async_trait]
impl<R, W> BatchWriter<R> for CsvBatchSink<W>
where
    R: Serialize + Send + Sync,
    W: AsyncWrite + Unpin + Send,
{
    type Error = IoError;

    async fn write_batch(&mut self, batch: &[R]) -> Commit<IoError> {
        if self.broken {
            return Commit::failed(0, IoError::SinkBroken);
        }

        for (committed, record) in batch.iter().enumerate() {
            if let Err(error) = self.serializer.serialize(record).await {
                self.broken = true;
                warn!(%error, row = self.rows, "CSV row failed, sink closed to writes");
                return Commit::failed(committed, error.into());
            }
            self.rows += 1;
        }

        self.batches += 1;
        debug!(batch = self.batches, rows = batch.len(), "CSV batch written");
        Commit::complete(batch.len())
    }

    async fn flush(&mut self) -> Result<(), IoError> {
        if self.broken {
            return Err(IoError::SinkBroken);
        }
        self.serializer.flush().await?;
        Ok(())
    }
}
