use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{Reading, RecordKind, Timestamped};

/// Continuous glucose monitor sample, in mg/dL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlucoseRead {
    pub timestamp: DateTime<Utc>,
    pub value: u16,
}

/// Fingerstick value entered to calibrate the sensor, in mg/dL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationRead {
    pub timestamp: DateTime<Utc>,
    pub value: u16,
}

/// Insulin dose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Injection {
    pub timestamp: DateTime<Utc>,
    pub units: f32,
    #[serde(default)]
    pub insulin_name: String,
}

/// Carbohydrate intake logged on its own, in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carb {
    pub timestamp: DateTime<Utc>,
    pub grams: f32,
}

/// Meal with its macronutrients, in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub timestamp: DateTime<Utc>,
    pub carbohydrates: f32,
    pub proteins: f32,
    pub fat: f32,
    pub saturated_fat: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub timestamp: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(default)]
    pub intensity: String,
    #[serde(default)]
    pub description: String,
}

impl GlucoseRead {
    pub fn new(timestamp: DateTime<Utc>, value: u16) -> Self {
        Self { timestamp, value }
    }
}

impl CalibrationRead {
    pub fn new(timestamp: DateTime<Utc>, value: u16) -> Self {
        Self { timestamp, value }
    }
}

impl Meal {
    /// Meal with only a carbohydrate count, the common case for pump exports
    pub fn carbs_only(timestamp: DateTime<Utc>, carbohydrates: f32) -> Self {
        Self {
            timestamp,
            carbohydrates,
            proteins: 0.0,
            fat: 0.0,
            saturated_fat: 0.0,
        }
    }
}

impl Timestamped for GlucoseRead {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for CalibrationRead {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for Injection {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for Carb {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for Meal {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for Exercise {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Reading for GlucoseRead {
    const KIND: RecordKind = RecordKind::GlucoseRead;
}

impl Reading for CalibrationRead {
    const KIND: RecordKind = RecordKind::CalibrationRead;
}

impl Reading for Injection {
    const KIND: RecordKind = RecordKind::Injection;
}

impl Reading for Carb {
    const KIND: RecordKind = RecordKind::Carb;
}

impl Reading for Meal {
    const KIND: RecordKind = RecordKind::Meal;
}

impl Reading for Exercise {
    const KIND: RecordKind = RecordKind::Exercise;
}
