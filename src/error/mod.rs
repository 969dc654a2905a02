// Error types for the hazard classifier
//
// This module defines custom error types for the inference gate, data loading
// and model artifacts, providing structured error handling with numeric codes
// suitable for logs and HTTP payloads.

mod data;
mod inference;
mod model;

pub use data::{log_data_error, DataError, DataErrorCodes};
pub use inference::{log_inference_error, ErrorKind, InferenceError, InferenceErrorCodes};
pub use model::{ModelError, ModelErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the HTTP and CLI boundaries.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
