//! Error types for loanfit

use thiserror::Error;

/// Result type alias for loanfit operations
pub type Result<T> = std::result::Result<T, LoanfitError>;

/// Main error type for the model builder
#[derive(Error, Debug)]
pub enum LoanfitError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid feature selection: {0}")]
    InvalidFeatureSelection(String),

    #[error("Invalid feature creation: {0}")]
    InvalidFeatureCreation(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanfitError {
    /// Shorthand for a rejected parameter value
    pub fn invalid_param(name: &str, value: impl ToString, reason: &str) -> Self {
        LoanfitError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for LoanfitError {
    fn from(err: polars::error::PolarsError) -> Self {
        LoanfitError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for LoanfitError {
    fn from(err: serde_json::Error) -> Self {
        LoanfitError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for LoanfitError {
    fn from(err: ndarray::ShapeError) -> Self {
        LoanfitError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoanfitError::InvalidModel("Random Forest".to_string());
        assert_eq!(err.to_string(), "Invalid model: Random Forest");
    }

    #[test]
    fn test_invalid_param_display() {
        let err = LoanfitError::invalid_param("k", 0, "must be at least 1");
        assert_eq!(err.to_string(), "Invalid parameter: k = 0, must be at least 1");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LoanfitError = io_err.into();
        assert!(matches!(err, LoanfitError::IoError(_)));
    }
}
