//! Error types for log line parsing and event correlation.
//!
//! All of these are per-line conditions: the consuming loop reports them
//! and moves on to the next line. None of them terminate the stream.

use thiserror::Error;

use crate::types::ProcessId;

/// Errors that can occur while parsing or correlating a single log line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    /// The line does not match the rsyncd log shape.
    #[error("unparseable log line: {line:?}")]
    ParseFailure {
        /// The raw line that failed to parse.
        line: String,
    },

    /// A line references a pid with no open transfer and is not a
    /// connection-opening line.
    #[error("line for unknown pid {pid}: {message:?}")]
    UnexpectedLine {
        /// The pid the line referenced.
        pid: ProcessId,
        /// The message body of the dropped line.
        message: String,
    },

    /// A `connect from` line arrived for a pid that already has an open
    /// transfer. The original transfer is kept.
    #[error("duplicate connect for open pid {pid}: {message:?}")]
    DuplicateConnect {
        /// The pid with an already-open transfer.
        pid: ProcessId,
        /// The message body of the rejected line.
        message: String,
    },

    /// A `sent` line carried no parsable `total size` integer. The
    /// transfer stays open; a later well-formed terminal line may still
    /// finalize it.
    #[error("sent line for pid {pid} lacks a parsable total size: {message:?}")]
    MalformedFinalization {
        /// The pid whose finalization was rejected.
        pid: ProcessId,
        /// The message body of the malformed terminal line.
        message: String,
    },
}

/// Result type for parsing and correlation operations.
pub type Result<T> = std::result::Result<T, EventError>;
