//! Error types for the charts crate

use thiserror::Error;

/// Errors that can occur when compiling chart specifications.
///
/// An invalid chart configuration is not an error; it is reported through
/// the context's `ValidationResult`.
#[derive(Error, Debug)]
pub enum ChartError {
    /// Record loading or data error
    #[error("Data error: {0}")]
    Data(#[from] chart_data::DataError),

    /// Unknown chart kind name
    #[error("Invalid chart type: {0}")]
    InvalidChartType(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for chart operations
pub type ChartResult<T> = Result<T, ChartError>;
