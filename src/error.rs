//! Error types for the credit-scoring pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, ScoringError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Column '{column}' has {count} missing values")]
    MissingValues { column: String, count: usize },

    #[error("Unknown category '{value}' in column '{column}' (not seen during fit)")]
    UnknownCategory { column: String, value: String },

    #[error("No code table recorded for column '{0}'")]
    MissingCodeTable(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<polars::error::PolarsError> for ScoringError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScoringError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ScoringError {
    fn from(err: serde_json::Error) -> Self {
        ScoringError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ScoringError {
    fn from(err: ndarray::ShapeError) -> Self {
        ScoringError::ShapeError {
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
        let err = ScoringError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_unknown_category_display() {
        let err = ScoringError::UnknownCategory {
            column: "profissao".to_string(),
            value: "astronauta".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown category 'astronauta' in column 'profissao' (not seen during fit)"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ScoringError = io_err.into();
        assert!(matches!(err, ScoringError::IoError(_)));
    }
}
