pub mod csv_reader;
pub mod csv_sink;
pub mod error;

// Re-export commonly used types
pub use csv_reader::CsvRecordStream;
pub use csv_sink::CsvBatchSink;
pub use error::IoError;
