//! Prometheus exposition for finalized rsync transfers.
//!
//! This crate is the concrete metrics sink behind the correlation state
//! machine:
//!
//! - [`registry`] — the `prometheus-client` registry and the
//!   [`TransferMetrics`] family implementing
//!   [`rsyncwatch_events::TransferSink`]
//! - [`server`] — the HTTP scrape endpoint (`/metrics`, `/health`)
//!
//! Observations are local registry writes with bounded latency; nothing
//! here can stall line consumption.
//!
//! # Example
//!
//! ```rust
//! use rsyncwatch_metrics::MetricsRegistry;
//! use rsyncwatch_events::TransferSink;
//!
//! let registry = MetricsRegistry::new();
//! let sink = registry.transfers().clone();
//! sink.observe_duration("10.0.0.1", "backups", 5.0);
//! sink.observe_size("10.0.0.1", "backups", 4096);
//! sink.inc_requests();
//!
//! let output = registry.encode();
//! assert!(output.contains("rsync_tasks_seconds"));
//! ```

pub mod error;
pub mod registry;
pub mod server;

pub use error::{ExporterError, Result};
pub use registry::{MetricsRegistry, TransferLabels, TransferMetrics};
pub use server::MetricsServer;
