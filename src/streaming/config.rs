use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::domain::{Reading, RecordKind};
use crate::window::{WindowPolicy, Windowing};

/// Settings of a single stream buffer, immutable once the buffer is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Longest time span a single batch may cover
    pub window: Duration,

    #[serde(default)]
    pub policy: WindowPolicy,

    /// Upper bound on records per batch; a full window is flushed before the
    /// next record is accepted
    #[serde(default)]
    pub max_batch: Option<usize>,
}

impl StreamConfig {
    /// Grid-aligned windows of the given span, no size bound
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            policy: WindowPolicy::default(),
            max_batch: None,
        }
    }

    /// Settings matching how a record kind is persisted
    pub fn for_kind(kind: RecordKind) -> Self {
        Self::new(kind.default_window())
    }

    /// Settings for the kind of `R`
    pub fn for_reading<R: Reading>() -> Self {
        Self::for_kind(R::KIND)
    }

    /// Set how windows are anchored (defaults to grid-aligned)
    pub fn with_policy(mut self, policy: WindowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound the number of records per batch
    ///
    /// # Example
    /// ```rust,ignore
    /// // Daily batches, but never more than 288 five-minute reads
    /// StreamConfig::new(Duration::from_secs(86_400)).with_max_batch(288)
    /// ```
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = Some(max_batch);
        self
    }

    /// Check the settings and build the windowing rule
    pub fn validate(&self) -> Result<Windowing, ConfigError> {
        if self.max_batch == Some(0) {
            return Err(ConfigError::ZeroMaxBatch);
        }

        if self.window < Duration::from_millis(1) {
            return Err(ConfigError::WindowTooShort(self.window));
        }

        let span =
            TimeDelta::from_std(self.window).map_err(|_| ConfigError::WindowTooLong(self.window))?;

        if self.window.subsec_nanos() % 1_000_000 != 0 {
            return Err(ConfigError::WindowNotWholeMillis(self.window));
        }

        Windowing::new(self.policy, span).ok_or(ConfigError::WindowNotWholeMillis(self.window))
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::for_kind(RecordKind::GlucoseRead)
    }
}
