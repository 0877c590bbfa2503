pub mod readings;
pub mod record;

// Re-export commonly used types
pub use readings::{CalibrationRead, Carb, Exercise, GlucoseRead, Injection, Meal};
pub use record::{Reading, RecordKind, Timestamped};
