//! Error types for loading datasets and writing exports

use thiserror::Error;

/// Errors raised outside the core computations (loading, config, output)
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A data row without a customer id
    #[error("row {row}: customer id is missing")]
    MissingCustomerId { row: usize },

    /// Dataset file with an unknown extension or wrapper
    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
