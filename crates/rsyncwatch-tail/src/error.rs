//! Error types for log following.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while opening or following a log file.
#[derive(Debug, Error)]
pub enum TailError {
    /// The log file could not be opened. This is the one fatal error
    /// class: it is only produced at startup and terminates the watcher.
    #[error("failed to open log file {path}: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading from an already-open log file failed.
    #[error("failed to read log file: {0}")]
    Read(#[from] io::Error),
}

/// Result type for tail operations.
pub type Result<T> = std::result::Result<T, TailError>;
