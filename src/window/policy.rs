use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// How the anchor of a new window is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowPolicy {
    /// Anchor on the first record truncated down to a multiple of the span
    /// since the Unix epoch (DEFAULT)
    ///
    /// Window boundaries depend only on the data, so replaying the same records
    /// always produces the same batches.
    ///
    /// ```text
    /// span: 1h
    /// 00:15 -> window [00:00, 01:00)
    /// 01:05 -> window [01:00, 02:00)
    /// ```
    #[default]
    GridAligned,

    /// Anchor on the timestamp of the first record of the window
    ///
    /// ```text
    /// span: 1h
    /// 00:15 -> window [00:15, 01:15)
    /// 01:20 -> window [01:20, 02:20)
    /// ```
    FirstArrival,
}

impl WindowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GridAligned => "grid",
            Self::FirstArrival => "first-arrival",
        }
    }

    /// Parse the short names accepted on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "grid" | "grid-aligned" => Some(Self::GridAligned),
            "first" | "first-arrival" => Some(Self::FirstArrival),
            _ => None,
        }
    }
}

/// Windowing rule: a policy paired with the span of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windowing {
    policy: WindowPolicy,
    span: TimeDelta,
}

impl Windowing {
    /// Returns `None` unless the span is a positive whole number of
    /// milliseconds, the resolution the grid is computed on
    pub fn new(policy: WindowPolicy, span: TimeDelta) -> Option<Self> {
        let millis = span.num_milliseconds();
        if millis < 1 || span != TimeDelta::milliseconds(millis) {
            return None;
        }
        Some(Self { policy, span })
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub fn span(&self) -> TimeDelta {
        self.span
    }

    /// Anchor of a window opened by a record at `at`
    ///
    /// `None` when the grid line below `at` lies before the earliest
    /// representable instant.
    pub fn anchor_for(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.policy {
            WindowPolicy::FirstArrival => Some(at),
            WindowPolicy::GridAligned => {
                let span_millis = self.span.num_milliseconds();
                let aligned = at
                    .timestamp_millis()
                    .div_euclid(span_millis)
                    .checked_mul(span_millis)?;
                DateTime::from_timestamp_millis(aligned)
            }
        }
    }

    /// True when a record at `at` falls outside the window anchored at `anchor`
    pub fn crosses(&self, anchor: DateTime<Utc>, at: DateTime<Utc>) -> bool {
        at - anchor >= self.span
    }
}
