use thiserror::Error;

use crate::io::IoError;
use crate::streaming::{ConfigError, StreamError};

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("CSV IO error: {0}")]
    CsvIo(#[from] IoError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Import aborted after {0} records")]
    ImportAborted(usize),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            AppError::ImportAborted(12).to_string(),
            "Import aborted after 12 records"
        );
        assert_eq!(
            AppError::InvalidArguments("missing file".to_string()).to_string(),
            "Invalid arguments: missing file"
        );
    }

    #[test]
    fn csv_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err = AppError::from(IoError::from(io_err));

        match app_err {
            AppError::CsvIo(IoError::Io(_)) => {}
            _ => panic!("Expected CsvIo error variant"),
        }
    }

    #[test]
    fn stream_error_conversion() {
        let stream_err = StreamError::ShortWrite {
            committed: 1,
            submitted: 3,
        };
        let app_err = AppError::from(stream_err);

        match app_err {
            AppError::Stream(StreamError::ShortWrite {
                committed: 1,
                submitted: 3,
            }) => {}
            _ => panic!("Expected Stream error variant"),
        }
    }

    #[test]
    fn config_error_conversion() {
        let config_err = ConfigError::WindowTooShort(Duration::ZERO);
        let app_err = AppError::from(config_err);

        match app_err {
            AppError::Config(ConfigError::WindowTooShort(_)) => {}
            _ => panic!("Expected Config error variant"),
        }
    }
}
