//! Watcher wiring: CLI, pipeline loop, and top-level errors.
//!
//! The binary follows one rsyncd log file and feeds every line through
//! parse → correlate, exposing finalized transfers as Prometheus metrics.
//! Per-line problems are logged and skipped; only startup failures (bad
//! arguments, unopenable file, unbindable listen address) terminate the
//! process.

pub mod cli;
pub mod error;
pub mod pipeline;

pub use cli::Cli;
pub use error::WatchError;
pub use pipeline::Pipeline;
