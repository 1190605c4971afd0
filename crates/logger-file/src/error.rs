//! Error types for file-based log destinations

use std::io;
use std::path::PathBuf;

/// Result type for file destination operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while writing or rotating log files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error occurred
    #[error("{0}: {1}")]
    Io(&'static str, #[source] io::Error),

    /// Failed to open the log file itself
    #[error("failed to open log file at {path}: {source}")]
    Open {
        /// The path that failed to open
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to create log directory
    #[error("failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The path that failed to be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to rotate log file
    #[error("failed to rotate log file: {0}")]
    Rotation(String),

    /// Failed to compress a rotated backup
    #[error("failed to compress backup {path}: {source}")]
    Compression {
        /// The backup that could not be compressed
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// The path is already open as a different kind of log file
    #[error("log file {0} is already open with a different rotation mode")]
    InUse(PathBuf),

    /// The destination currently has no open handle
    #[error("log file {0} is not open")]
    NotOpen(PathBuf),
}
