use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced by the stream buffers
///
/// Cloneable so a recorded fault can be handed back on every later flush.
#[derive(Error, Debug, Clone)]
pub enum StreamError {
    #[error("Short write: store committed {committed} of {submitted} records")]
    ShortWrite { committed: usize, submitted: usize },

    #[error("Store failure: {0}")]
    StoreFailure(#[source] Arc<dyn StdError + Send + Sync>),

    #[error("Contract violation: {0}")]
    ContractViolation(#[from] ContractViolation),
}

impl StreamError {
    /// Wrap an error reported by the downstream writer
    pub fn store<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::StoreFailure(Arc::new(error))
    }

    /// Faults come from the downstream writer and stick to the buffer until
    /// cleared; contract violations only reject the offending input
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::ShortWrite { .. } | Self::StoreFailure(_))
    }

    /// The downstream error behind a store failure
    pub fn store_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::StoreFailure(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

/// Input the buffer refuses to accept
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("Empty batch")]
    EmptyBatch,

    #[error("Record {index} at {timestamp} is older than the previous record at {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("Record {index} at {timestamp} has no representable grid window")]
    OutsideGrid {
        index: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Invalid stream configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Window must be at least one millisecond, got {0:?}")]
    WindowTooShort(Duration),

    #[error("Window must be a whole number of milliseconds, got {0:?}")]
    WindowNotWholeMillis(Duration),

    #[error("Window is too long: {0:?}")]
    WindowTooLong(Duration),

    #[error("Maximum batch size must be at least 1")]
    ZeroMaxBatch,
}
