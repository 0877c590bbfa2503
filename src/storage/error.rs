use thiserror::Error;

/// Errors reported by the in-memory batch store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
