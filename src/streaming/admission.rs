use chrono::{DateTime, Utc};
use tracing::debug;

use super::config::StreamConfig;
use super::error::{ConfigError, ContractViolation};
use crate::window::Windowing;

/// Per-record decisions shared by the buffer representations: ordering,
/// window crossings and the anchor of a newly opened window
#[derive(Debug, Clone, Copy)]
pub(crate) struct Admission {
    windowing: Windowing,
    max_batch: Option<usize>,
    watermark: Option<DateTime<Utc>>,
}

impl Admission {
    pub(crate) fn from_config(config: &StreamConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            windowing: config.validate()?,
            max_batch: config.max_batch,
            watermark: None,
        })
    }

    pub(crate) fn windowing(&self) -> Windowing {
        self.windowing
    }

    /// Check a record before anything is flushed for it
    ///
    /// Rejects a record older than the last accepted one, or one whose grid
    /// window cannot be represented. Returns the anchor a window opened by the
    /// record gets.
    pub(crate) fn admit(
        &self,
        index: usize,
        at: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ContractViolation> {
        if let Some(previous) = self.watermark
            && at < previous
        {
            return Err(ContractViolation::OutOfOrder {
                index,
                timestamp: at,
                previous,
            });
        }

        self.windowing
            .anchor_for(at)
            .ok_or(ContractViolation::OutsideGrid {
                index,
                timestamp: at,
            })
    }

    /// True when the open window must be committed before `at` joins
    pub(crate) fn needs_flush(
        &self,
        anchor: Option<DateTime<Utc>>,
        buffered: usize,
        at: DateTime<Utc>,
    ) -> bool {
        let Some(anchor) = anchor else {
            return false;
        };

        if self.windowing.crosses(anchor, at) {
            debug!(%anchor, %at, "Window boundary crossed");
            return true;
        }

        self.max_batch.is_some_and(|max_batch| buffered >= max_batch)
    }

    /// Record `at` as the newest accepted timestamp
    pub(crate) fn accept(&mut self, at: DateTime<Utc>) {
        self.watermark = Some(at);
    }
}
