//! Error types for catalog feature preparation

use thiserror::Error;

/// Result type alias for catalog feature operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Pipeline not fitted: {0}")]
    NotFitted(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Binning failed for column '{column}': {reason}")]
    BinningFailure { column: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CatalogError {
    /// Shorthand for a binning failure on one column
    pub fn binning(column: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::BinningFailure {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for CatalogError {
    fn from(err: polars::error::PolarsError) -> Self {
        CatalogError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_binning_failure_display() {
        let err = CatalogError::binning("brand", "target has a single class");
        assert_eq!(
            err.to_string(),
            "Binning failed for column 'brand': target has a single class"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CatalogError = io_err.into();
        assert!(matches!(err, CatalogError::IoError(_)));
    }
}
