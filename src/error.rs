//! Error types for ratewise

use thiserror::Error;

/// Main error type for ratewise
#[derive(Error, Debug)]
pub enum ConverterError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Index {index} out of bounds for favorites list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type alias for ratewise operations
pub type Result<T> = std::result::Result<T, ConverterError>;
