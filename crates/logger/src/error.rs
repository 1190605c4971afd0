//! Error types for the logger

use thiserror::Error;

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a logger or writing records
#[derive(Debug, Error)]
pub enum Error {
    /// A file destination failed
    #[error(transparent)]
    File(#[from] proven_logger_file::Error),

    /// The timestamp pattern is not valid strftime
    #[error("invalid timestamp format: {0:?}")]
    InvalidTimeFormat(String),

    /// IO operation failed
    #[error("{0}: {1}")]
    Io(&'static str, #[source] std::io::Error),
}
