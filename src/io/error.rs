use std::io;
use thiserror::Error;

/// IO-level errors for CSV reading and writing
#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV sink stopped after a row failed partway through")]
    SinkBroken,
}
