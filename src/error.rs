use std::path::PathBuf;

use thiserror::Error as ThisError;

/// Errors that can occur in the logging pipeline
#[derive(ThisError, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Unknown level string in configuration.
    #[error("Invalid log level: {0:?}")]
    InvalidLevel(String),
    /// Rotation template contains an unsupported placeholder.
    #[error("Invalid rotation pattern ({template}): {reason}")]
    Pattern { template: String, reason: String },
    /// Initialization failed.
    #[error("Initialization error: {0}")]
    Init(String),
    /// A file sink was written to before `init` or after close.
    #[error("not an opened file: {}", .0.display())]
    NotOpen(PathBuf),
    /// The dispatcher has been shut down.
    #[error("dispatcher is closed")]
    Closed,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
