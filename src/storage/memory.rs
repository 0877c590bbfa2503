use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::StorageError;
use super::traits::{BatchWriter, Commit};

/// Outcome forced on the next `write_batch` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// Commit only the first `n` records and report no error
    Partial(usize),

    /// Commit the first `committed` records, then fail with `error`
    Fail {
        committed: usize,
        error: StorageError,
    },
}

struct Inner<R> {
    batches: Vec<Vec<R>>,
    script: VecDeque<ScriptedOutcome>,
    flush_failures: VecDeque<StorageError>,
    write_calls: usize,
    flushes: usize,
}

/// In-memory batch store
///
/// A handle over shared state: clones see the same committed batches. Each
/// handle also carries a generation that advances on every commit made
/// through it, so a caller holding an older handle can tell it apart from
/// the one that performed later writes.
pub struct MemoryBatchStore<R> {
    inner: Arc<Mutex<Inner<R>>>,
    generation: u64,
}

impl<R> MemoryBatchStore<R> {
    /// Create an empty store that commits everything it is given
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                batches: Vec::new(),
                script: VecDeque::new(),
                flush_failures: VecDeque::new(),
                write_calls: 0,
                flushes: 0,
            })),
            generation: 0,
        }
    }

    /// Number of commits made through this handle
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Force the outcome of the next unscripted `write_batch` call
    pub async fn script(&self, outcome: ScriptedOutcome) {
        self.inner.lock().await.script.push_back(outcome);
    }

    /// Make the next `flush` call fail
    pub async fn fail_next_flush(&self, error: StorageError) {
        self.inner.lock().await.flush_failures.push_back(error);
    }

    /// Number of `write_batch` calls received, including failed ones
    pub async fn write_calls(&self) -> usize {
        self.inner.lock().await.write_calls
    }

    /// Number of successful `flush` calls
    pub async fn flushes(&self) -> usize {
        self.inner.lock().await.flushes
    }
}

impl<R: Clone> MemoryBatchStore<R> {
    /// Committed batches in commit order
    pub async fn batches(&self) -> Vec<Vec<R>> {
        self.inner.lock().await.batches.clone()
    }

    /// Every committed record in commit order
    pub async fn records(&self) -> Vec<R> {
        self.inner
            .lock()
            .await
            .batches
            .iter()
            .flatten()
            .cloned()
            .collect()
    }
}

impl<R> Clone for MemoryBatchStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            generation: self.generation,
        }
    }
}

impl<R> Default for MemoryBatchStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> BatchWriter<R> for MemoryBatchStore<R>
where
    R: Clone + Send + Sync,
{
    type Error = StorageError;

    async fn write_batch(&mut self, batch: &[R]) -> Commit<StorageError> {
        let mut inner = self.inner.lock().await;
        inner.write_calls += 1;

        let (committed, error) = match inner.script.pop_front() {
            None => (batch.len(), None),
            Some(ScriptedOutcome::Partial(n)) => (n.min(batch.len()), None),
            Some(ScriptedOutcome::Fail { committed, error }) => {
                (committed.min(batch.len()), Some(error))
            }
        };

        if committed > 0 {
            inner.batches.push(batch[..committed].to_vec());
            self.generation += 1;
        }

        debug!(
            submitted = batch.len(),
            committed,
            generation = self.generation,
            "Memory store write"
        );

        Commit { committed, error }
    }

    async fn flush(&mut self) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if let Some(error) = inner.flush_failures.pop_front() {
            return Err(error);
        }
        inner.flushes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commits_whole_batches_by_default() {
        let mut store = MemoryBatchStore::new();

        let commit = store.write_batch(&[1, 2, 3]).await;
        assert_eq!(commit, Commit::complete(3));

        let commit = store.write_batch(&[4]).await;
        assert_eq!(commit, Commit::complete(1));

        assert_eq!(store.batches().await, vec![vec![1, 2, 3], vec![4]]);
        assert_eq!(store.records().await, vec![1, 2, 3, 4]);
        assert_eq!(store.write_calls().await, 2);
    }

    #[tokio::test]
    async fn scripted_partial_commits_a_prefix() {
        let mut store = MemoryBatchStore::new();
        store.script(ScriptedOutcome::Partial(2)).await;

        let commit = store.write_batch(&['a', 'b', 'c', 'd']).await;

        assert_eq!(commit, Commit::complete(2));
        assert_eq!(store.records().await, vec!['a', 'b']);
    }

    #[tokio::test]
    async fn scripted_failure_reports_error_and_prefix() {
        let mut store = MemoryBatchStore::new();
        let error = StorageError::Unavailable("datastore timeout".to_string());
        store
            .script(ScriptedOutcome::Fail {
                committed: 1,
                error: error.clone(),
            })
            .await;

        let commit = store.write_batch(&[7, 8, 9]).await;

        assert_eq!(commit, Commit::failed(1, error));
        assert_eq!(store.records().await, vec![7]);

        // Script is consumed, next write succeeds
        let commit = store.write_batch(&[8, 9]).await;
        assert_eq!(commit, Commit::complete(2));
    }

    #[tokio::test]
    async fn generation_advances_per_handle() {
        let mut store = MemoryBatchStore::new();
        let older = store.clone();

        let _ = store.write_batch(&[1]).await;
        let _ = store.write_batch(&[2]).await;

        assert_eq!(store.generation(), 2);
        assert_eq!(older.generation(), 0);
        // Both handles see the same data
        assert_eq!(older.records().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn zero_commit_does_not_advance_generation() {
        let mut store = MemoryBatchStore::<u8>::new();
        store.script(ScriptedOutcome::Partial(0)).await;

        let commit = store.write_batch(&[1, 2]).await;

        assert_eq!(commit.committed, 0);
        assert_eq!(store.generation(), 0);
        assert!(store.batches().await.is_empty());
    }

    #[tokio::test]
    async fn flush_failures_are_consumed_once() {
        let mut store = MemoryBatchStore::<u8>::new();
        store
            .fail_next_flush(StorageError::Unavailable("offline".to_string()))
            .await;

        assert!(store.flush().await.is_err());
        assert!(store.flush().await.is_ok());
        assert_eq!(store.flushes().await, 1);
    }
}
