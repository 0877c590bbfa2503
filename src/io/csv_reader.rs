use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::error::IoError;

/// Async stream of records deserialized from CSV input with a header row
pub struct CsvRecordStream<R> {
    inner: Pin<Box<dyn Stream<Item = Result<R, IoError>> + Send>>,
}

impl<R> CsvRecordStream<R>
where
    R: DeserializeOwned + Send + 'static,
{
    /// Create a new record stream from an async reader
    pub fn new<Rd>(reader: Rd) -> Self
    where
        Rd: AsyncRead + Unpin + Send + 'static,
    {
        let csv_reader = AsyncReaderBuilder::new()
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        let stream = csv_reader
            .into_deserialize::<R>()
            .map(|result| result.map_err(IoError::from));

        Self {
            inner: Box::pin(stream),
        }
    }

    /// Open a CSV file and stream its records
    ///
    /// # Example
    /// ```rust,ignore
    /// let reads = CsvRecordStream::<GlucoseRead>::from_file("reads.csv").await?;
    /// ```
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file.compat()))
    }
}

impl<R> Stream for CsvRecordStream<R> {
    type Item = Result<R, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
