//! Event correlation for rsync daemon logs.
//!
//! An rsync daemon writes one interleaved log stream for all of its
//! connections, identified only by an ephemeral process-id token. This
//! crate turns that stream into discrete, completed transfer events:
//!
//! - [`parser`] — splits a raw log line into a [`ParsedLine`]
//! - [`store`] — the [`EventStore`] holding in-flight [`TransferEvent`]s
//! - [`correlator`] — the per-pid state machine that opens, updates, and
//!   finalizes events, emitting each [`FinalizedTransfer`] to a
//!   [`TransferSink`]
//!
//! Memory use is bounded by the number of in-flight transfers, never by
//! total log volume: a finalized event is removed from the store at the
//! same instant it is handed to the sink.
//!
//! # Example
//!
//! ```rust
//! use rsyncwatch_events::{parser, Correlator, TransferSink};
//!
//! #[derive(Default)]
//! struct NullSink;
//! impl TransferSink for NullSink {
//!     fn observe_duration(&self, _source: &str, _dataset: &str, _seconds: f64) {}
//!     fn observe_size(&self, _source: &str, _dataset: &str, _bytes: u64) {}
//!     fn inc_requests(&self) {}
//! }
//!
//! let mut correlator = Correlator::new(NullSink);
//! let line = parser::parse("2024/01/01 10:00:00 [111] connect from 10.0.0.1").unwrap();
//! correlator.apply(&line).unwrap();
//! assert_eq!(correlator.store().len(), 1);
//! ```

pub mod correlator;
pub mod error;
pub mod parser;
pub mod store;
pub mod types;

// Re-export main types at crate root
pub use correlator::{Applied, Correlator, TransferSink};
pub use error::{EventError, Result};
pub use parser::ParsedLine;
pub use store::EventStore;
pub use types::{FinalizedTransfer, ProcessId, TransferEvent};
