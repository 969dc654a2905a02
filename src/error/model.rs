// Model artifact and invocation errors

use crate::error::ErrorCode;
use std::fmt;

/// Model error code constants
///
/// Error code range: 5001-5003
pub struct ModelErrorCodes {}

impl ModelErrorCodes {
    /// Artifact file could not be read
    pub const ARTIFACT_UNREADABLE: i32 = 5001;

    /// Artifact parsed but is internally inconsistent
    pub const ARTIFACT_INVALID: i32 = 5002;

    /// Input tensor does not fit the model
    pub const INPUT_REJECTED: i32 = 5003;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    ArtifactUnreadable { path: String, details: String },
    ArtifactInvalid { reason: String },
    InputRejected { reason: String },
}

impl ErrorCode for ModelError {
    fn code(&self) -> i32 {
        match self {
            ModelError::ArtifactUnreadable { .. } => ModelErrorCodes::ARTIFACT_UNREADABLE,
            ModelError::ArtifactInvalid { .. } => ModelErrorCodes::ARTIFACT_INVALID,
            ModelError::InputRejected { .. } => ModelErrorCodes::INPUT_REJECTED,
        }
    }

    fn message(&self) -> String {
        match self {
            ModelError::ArtifactUnreadable { path, details } => {
                format!("Failed to read model artifact {}: {}", path, details)
            }
            ModelError::ArtifactInvalid { reason } => {
                format!("Invalid model artifact: {}", reason)
            }
            ModelError::InputRejected { reason } => format!("Model rejected input: {}", reason),
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for ModelError {}

impl From<crate::error::DataError> for ModelError {
    fn from(err: crate::error::DataError) -> Self {
        ModelError::InputRejected {
            reason: err.message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_messages() {
        let err = ModelError::ArtifactUnreadable {
            path: "models/cyclone.json".to_string(),
            details: "No such file".to_string(),
        };
        assert_eq!(err.code(), 5001);
        assert!(err.message().contains("models/cyclone.json"));

        let err = ModelError::InputRejected {
            reason: "expected 6 features, got 5".to_string(),
        };
        assert_eq!(err.code(), 5003);
        assert!(format!("{}", err).contains("expected 6 features"));
    }
}
