use async_trait::async_trait;

/// Outcome of submitting records downstream
///
/// `committed` counts the records the writer took responsibility for, always
/// a prefix of what was submitted. A commit without an error that covers fewer
/// records than submitted is a short write.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit<E> {
    pub committed: usize,
    pub error: Option<E>,
}

impl<E> Commit<E> {
    /// Every submitted record was committed
    pub fn complete(committed: usize) -> Self {
        Self {
            committed,
            error: None,
        }
    }

    /// The first `committed` records went through before `error`
    pub fn failed(committed: usize, error: E) -> Self {
        Self {
            committed,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<usize, E> {
        match self.error {
            None => Ok(self.committed),
            Some(e) => Err(e),
        }
    }
}

/// Batch-oriented sink for records of a single kind
///
/// Implemented by stores and by the stream buffer itself, so buffers can be
/// layered on top of each other.
#[async_trait]
pub trait BatchWriter<R: Send + Sync>: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit an ordered, non-empty batch
    async fn write_batch(&mut self, batch: &[R]) -> Commit<Self::Error>;

    /// Make everything written so far durable
    async fn flush(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_commit_converts_to_ok() {
        let commit = Commit::<String>::complete(4);
        assert!(commit.is_ok());
        assert_eq!(commit.into_result(), Ok(4));
    }

    #[test]
    fn failed_commit_keeps_partial_count() {
        let commit = Commit::failed(2, "disk full".to_string());
        assert!(!commit.is_ok());
        assert_eq!(commit.committed, 2);
        assert_eq!(commit.into_result(), Err("disk full".to_string()));
    }
}
