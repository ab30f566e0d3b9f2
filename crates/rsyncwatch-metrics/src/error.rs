//! Error types for the metrics exporter.

use thiserror::Error;

/// Errors that can occur in the scrape endpoint.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Failed to bind the scrape listener. Fatal at startup.
    #[error("failed to bind metrics endpoint on {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The HTTP server failed after startup.
    #[error("metrics server error: {0}")]
    Serve(String),
}

/// Result type for exporter operations.
pub type Result<T> = std::result::Result<T, ExporterError>;
