//! Top-level errors: only startup-time failures reach this type.

use thiserror::Error;

/// Fatal watcher errors.
///
/// Per-line parse and correlation problems never appear here; they are
/// logged inside the pipeline and the stream continues.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The log file could not be opened or read.
    #[error(transparent)]
    Tail(#[from] rsyncwatch_tail::TailError),

    /// The metrics endpoint could not be started or failed fatally.
    #[error(transparent)]
    Exporter(#[from] rsyncwatch_metrics::ExporterError),
}
