use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::error::StreamError;
use crate::storage::{BatchWriter, Commit};

/// Submit a run of records and classify what the writer reports
///
/// Never calls the writer for an empty run. The returned count is clamped to
/// the run length and always names a committed prefix.
pub(crate) async fn commit_run<R, W>(
    writer: &mut W,
    run: &[R],
    anchor: Option<DateTime<Utc>>,
) -> Commit<StreamError>
where
    R: Send + Sync,
    W: BatchWriter<R>,
{
    if run.is_empty() {
        return Commit::complete(0);
    }

    let outcome = writer.write_batch(run).await;
    classify(run.len(), outcome, anchor)
}

fn classify<E>(
    submitted: usize,
    outcome: Commit<E>,
    anchor: Option<DateTime<Utc>>,
) -> Commit<StreamError>
where
    E: std::error::Error + Send + Sync + 'static,
{
    if outcome.committed > submitted {
        warn!(
            reported = outcome.committed,
            submitted, "Writer reported more records than submitted"
        );
    }
    let committed = outcome.committed.min(submitted);

    match outcome.error {
        Some(error) => {
            warn!(committed, submitted, %error, "Batch write failed");
            Commit::failed(committed, StreamError::store(error))
        }
        None if committed < submitted => {
            warn!(committed, submitted, "Short batch write");
            Commit::failed(
                committed,
                StreamError::ShortWrite {
                    committed,
                    submitted,
                },
            )
        }
        None => {
            debug!(committed, anchor = ?anchor, "Batch committed");
            Commit::complete(committed)
        }
    }
}
