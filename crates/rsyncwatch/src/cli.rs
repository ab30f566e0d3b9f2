//! Command line interface for the watcher.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Prometheus exporter for rsync daemon transfer logs.
///
/// Follows LOG_FILE as it grows, correlates each connection's log lines
/// into completed transfer events, and serves duration, size, and request
/// metrics for scraping.
#[derive(Debug, Parser)]
#[command(name = "rsyncwatch", version)]
pub struct Cli {
    /// Path to the rsyncd log file to follow.
    pub log_file: PathBuf,

    /// Address to serve Prometheus scrapes on.
    #[arg(long, default_value = "0.0.0.0:9090")]
    pub listen: SocketAddr,

    /// Milliseconds to wait between polls for newly appended log data.
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,
}

impl Cli {
    /// Poll cadence as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
