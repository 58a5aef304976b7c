//! Error types for the inscan-core library.
//!
//! Metric extraction itself never fails: unreadable scans produce an empty
//! or partial mapping. These errors cover the surrounding surface (config
//! files, user-supplied overrides).

use thiserror::Error;

/// Main error type for the inscan library.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Metric name or value error.
    #[error("metric error: {0}")]
    Metric(#[from] MetricError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to metric names and user-supplied values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// The name is not one of the known body-composition metrics.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// The value could not be read as a number.
    #[error("invalid value for {metric}: {value}")]
    InvalidValue { metric: String, value: String },

    /// An override was not written as `metric=value`.
    #[error("expected metric=value, got: {0}")]
    MalformedOverride(String),
}

/// Result type for the inscan library.
pub type Result<T> = std::result::Result<T, ScanError>;
