//! Error types for record loading

use thiserror::Error;

/// Errors that can occur while loading records.
///
/// Invalid chart or table configuration is never an error here; it is
/// reported through [`crate::ValidationResult`].
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error reading input
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing JSON data
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Input had the wrong shape
    #[error("Invalid records: {0}")]
    InvalidRecords(String),

    /// Root path did not resolve to a value
    #[error("Invalid path expression: {0}")]
    InvalidPath(String),
}

/// Result type for record loading
pub type Result<T> = std::result::Result<T, DataError>;
