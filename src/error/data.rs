// Data loading and preprocessing error types

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Data error code constants
///
/// Error code range: 4001-4006
pub struct DataErrorCodes {}

impl DataErrorCodes {
    /// Reading or writing a file failed
    pub const IO: i32 = 4001;

    /// JSON payload could not be parsed
    pub const PARSE: i32 = 4002;

    /// Array dimensions are inconsistent
    pub const INVALID_SHAPE: i32 = 4003;

    /// Input contained no usable samples
    pub const EMPTY_INPUT: i32 = 4004;

    /// WAV decoding failed
    pub const WAVEFORM: i32 = 4005;

    /// CSV track table decoding failed
    pub const TRACKS: i32 = 4006;
}

/// Log a data error with structured context
pub fn log_data_error(err: &DataError, context: &str) {
    error!(
        "Data error in {}: code={}, component=Dataset, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while loading signals, tracks and cached arrays
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// File system access failed
    Io { path: String, details: String },

    /// JSON payload was malformed
    Parse { details: String },

    /// Dimensions do not agree (ragged rows, shape/data length mismatch)
    InvalidShape { reason: String },

    /// Nothing to work with
    EmptyInput { what: String },

    /// WAV decoding failed
    Waveform { details: String },

    /// CSV decoding failed
    Tracks { details: String },
}

impl DataError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        DataError::Io {
            path: path.as_ref().display().to_string(),
            details: err.to_string(),
        }
    }
}

impl ErrorCode for DataError {
    fn code(&self) -> i32 {
        match self {
            DataError::Io { .. } => DataErrorCodes::IO,
            DataError::Parse { .. } => DataErrorCodes::PARSE,
            DataError::InvalidShape { .. } => DataErrorCodes::INVALID_SHAPE,
            DataError::EmptyInput { .. } => DataErrorCodes::EMPTY_INPUT,
            DataError::Waveform { .. } => DataErrorCodes::WAVEFORM,
            DataError::Tracks { .. } => DataErrorCodes::TRACKS,
        }
    }

    fn message(&self) -> String {
        match self {
            DataError::Io { path, details } => format!("I/O error on {}: {}", path, details),
            DataError::Parse { details } => format!("Failed to parse JSON: {}", details),
            DataError::InvalidShape { reason } => format!("Invalid shape: {}", reason),
            DataError::EmptyInput { what } => format!("Empty input: {}", what),
            DataError::Waveform { details } => format!("Failed to decode waveform: {}", details),
            DataError::Tracks { details } => format!("Failed to decode track table: {}", details),
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for DataError {}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse {
            details: err.to_string(),
        }
    }
}

impl From<hound::Error> for DataError {
    fn from(err: hound::Error) -> Self {
        DataError::Waveform {
            details: err.to_string(),
        }
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Tracks {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_codes() {
        assert_eq!(
            DataError::Io {
                path: "a".to_string(),
                details: "b".to_string()
            }
            .code(),
            4001
        );
        assert_eq!(
            DataError::Parse {
                details: "x".to_string()
            }
            .code(),
            4002
        );
        assert_eq!(
            DataError::InvalidShape {
                reason: "x".to_string()
            }
            .code(),
            4003
        );
        assert_eq!(
            DataError::EmptyInput {
                what: "x".to_string()
            }
            .code(),
            4004
        );
        assert_eq!(
            DataError::Waveform {
                details: "x".to_string()
            }
            .code(),
            4005
        );
        assert_eq!(
            DataError::Tracks {
                details: "x".to_string()
            }
            .code(),
            4006
        );
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<Vec<f32>>("[1.0,").unwrap_err();
        let err: DataError = json_err.into();
        assert_eq!(err.code(), DataErrorCodes::PARSE);
        assert!(err.message().starts_with("Failed to parse JSON"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DataError::io("data/spectrogram.json", io_err);
        assert!(err.message().contains("data/spectrogram.json"));
        assert!(err.message().contains("gone"));
    }
}
