//! Prelude module for convenient imports
//!
//! Import everything you need with: `use windowed_batch::prelude::*;`

// Domain types
pub use crate::domain::{
    CalibrationRead, Carb, Exercise, GlucoseRead, Injection, Meal, Reading, RecordKind,
    Timestamped,
};

// Window types
pub use crate::window::{WindowPolicy, Windowing};

// Storage types
pub use crate::storage::{BatchWriter, Commit, MemoryBatchStore, ScriptedOutcome, StorageError};

// IO types
pub use crate::io::{CsvBatchSink, CsvRecordStream, IoError};

// Streaming types
pub use crate::streaming::{
    AbortOnError, ConfigError, ContractViolation, ErrorPolicy, ImportSession, ImportSummary,
    SilentSkip, SkipErrors, StreamBuffer, StreamConfig, StreamError, VersionedStream,
};

// App types
pub use crate::app::{AppError, CliApp};
