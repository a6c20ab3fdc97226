//! Error types for the Assayer library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Assayer operations.
#[derive(Debug, Error)]
pub enum AssayerError {
    /// Malformed input rejected before any processing.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A transformation operation failed while applying a rule.
    #[error("Rule '{rule}' failed: {message}")]
    RuleApplication { rule: String, message: String },

    /// Transformation type the engine does not know how to run.
    #[error("Unsupported transformation type: {0}")]
    UnsupportedOperation(String),

    /// A rule referenced a column the dataset does not have.
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssayerError {
    /// Build a rule application error.
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        AssayerError::RuleApplication {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for Assayer operations.
pub type Result<T> = std::result::Result<T, AssayerError>;
