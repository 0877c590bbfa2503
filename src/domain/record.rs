use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anything that occupies a single point in time
///
/// The buffer only ever reads the timestamp; the rest of the record is opaque
/// and handed to the store untouched.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// A record kind known to the import pipeline
pub trait Reading: Timestamped {
    const KIND: RecordKind;
}

/// The kinds of records imported from a device export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    GlucoseRead,
    CalibrationRead,
    Injection,
    Carb,
    Meal,
    Exercise,
}

impl RecordKind {
    pub const ALL: [RecordKind; 6] = [
        RecordKind::GlucoseRead,
        RecordKind::CalibrationRead,
        RecordKind::Injection,
        RecordKind::Carb,
        RecordKind::Meal,
        RecordKind::Exercise,
    ];

    /// Stable name used in logs and output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GlucoseRead => "glucose_read",
            Self::CalibrationRead => "calibration_read",
            Self::Injection => "injection",
            Self::Carb => "carb",
            Self::Meal => "meal",
            Self::Exercise => "exercise",
        }
    }

    /// Span of a single stored batch; every kind is persisted one day per entity
    pub fn default_window(&self) -> Duration {
        Duration::from_secs(24 * 60 * 60)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
