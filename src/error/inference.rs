// Inference gate error types and constants

use crate::error::ErrorCode;
use crate::gate::{ObservedShape, ShapeContract};
use log::error;
use std::fmt;

/// Inference error code constants
///
/// Error code range: 3001-3004
pub struct InferenceErrorCodes {}

impl InferenceErrorCodes {
    /// Request body did not carry the configured input field
    pub const MISSING_FIELD: i32 = 3001;

    /// Input rows/columns violate the model's shape contract
    pub const SHAPE_MISMATCH: i32 = 3002;

    /// Model artifact failed to load at startup
    pub const MODEL_UNAVAILABLE: i32 = 3003;

    /// Unclassified failure during normalization or invocation
    pub const INTERNAL: i32 = 3004;
}

/// Discriminant of [`InferenceError`], for assertions and metrics that
/// should not depend on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ErrorKind {
    MissingField,
    ShapeMismatch,
    ModelUnavailable,
    Internal,
}

impl ErrorKind {
    /// Client errors are caused by the request and never retried server-side.
    pub fn is_client_error(self) -> bool {
        matches!(self, ErrorKind::MissingField | ErrorKind::ShapeMismatch)
    }
}

/// Log an inference error with structured context
///
/// Logs the numeric code, the error kind, the serving domain and the
/// human-readable message. Never includes a backtrace.
pub fn log_inference_error(err: &InferenceError, domain: &str) {
    error!(
        "Inference error in domain {}: code={}, kind={:?}, message={}",
        domain,
        err.code(),
        err.kind(),
        err.message()
    );
}

/// Per-request inference failures
///
/// Every variant is independent per request; none carries state into the
/// next request.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// The named input field is absent from the request body
    MissingField { field: String },

    /// The input does not satisfy the (rows, cols) contract
    ShapeMismatch {
        expected: ShapeContract,
        actual: ObservedShape,
    },

    /// The model artifact for this domain never loaded
    ModelUnavailable { domain: String, reason: String },

    /// Anything else raised during normalization or invocation
    Internal { message: String },
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::MissingField { .. } => ErrorKind::MissingField,
            InferenceError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            InferenceError::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            InferenceError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

impl ErrorCode for InferenceError {
    fn code(&self) -> i32 {
        match self {
            InferenceError::MissingField { .. } => InferenceErrorCodes::MISSING_FIELD,
            InferenceError::ShapeMismatch { .. } => InferenceErrorCodes::SHAPE_MISMATCH,
            InferenceError::ModelUnavailable { .. } => InferenceErrorCodes::MODEL_UNAVAILABLE,
            InferenceError::Internal { .. } => InferenceErrorCodes::INTERNAL,
        }
    }

    fn message(&self) -> String {
        match self {
            InferenceError::MissingField { field } => {
                format!("Missing '{}' key in request", field)
            }
            InferenceError::ShapeMismatch { expected, actual } => {
                format!(
                    "Input must be {} rows (or 1 row) with {} columns; {}",
                    expected.expected_rows, expected.expected_cols, actual
                )
            }
            InferenceError::ModelUnavailable { domain, reason } => {
                format!("{} model not loaded: {}", domain, reason)
            }
            InferenceError::Internal { message } => message.clone(),
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InferenceError::{:?} (code {}): {}",
            self.kind(),
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for InferenceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inference_error_codes() {
        assert_eq!(
            InferenceError::MissingField {
                field: "spectrogram".to_string()
            }
            .code(),
            InferenceErrorCodes::MISSING_FIELD
        );
        assert_eq!(
            InferenceError::ShapeMismatch {
                expected: ShapeContract::new(64, 6),
                actual: ObservedShape::NotAnArray,
            }
            .code(),
            InferenceErrorCodes::SHAPE_MISMATCH
        );
        assert_eq!(
            InferenceError::ModelUnavailable {
                domain: "cyclone".to_string(),
                reason: "missing file".to_string()
            }
            .code(),
            InferenceErrorCodes::MODEL_UNAVAILABLE
        );
        assert_eq!(
            InferenceError::Internal {
                message: "boom".to_string()
            }
            .code(),
            InferenceErrorCodes::INTERNAL
        );
    }

    #[test]
    fn test_shape_mismatch_message_names_expected_shape() {
        let err = InferenceError::ShapeMismatch {
            expected: ShapeContract::new(64, 6),
            actual: ObservedShape::RowWidth { row: 0, cols: 5 },
        };
        let message = err.message();
        assert!(message.contains("64 rows"));
        assert!(message.contains("6 columns"));
        assert!(message.contains("row 0 has 5 columns"));
    }

    #[test]
    fn test_model_unavailable_message() {
        let err = InferenceError::ModelUnavailable {
            domain: "Cyclone".to_string(),
            reason: "file not found".to_string(),
        };
        assert!(err.message().contains("not loaded"));
        assert!(err.message().starts_with("Cyclone"));
    }

    #[test]
    fn test_client_error_kinds() {
        assert!(ErrorKind::MissingField.is_client_error());
        assert!(ErrorKind::ShapeMismatch.is_client_error());
        assert!(!ErrorKind::ModelUnavailable.is_client_error());
        assert!(!ErrorKind::Internal.is_client_error());
    }

    #[test]
    fn test_inference_error_display() {
        let err = InferenceError::Internal {
            message: "model returned NaN".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("InferenceError"));
        assert!(display.contains("3004"));
        assert!(display.contains("model returned NaN"));
    }
}
