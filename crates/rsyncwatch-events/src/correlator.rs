//! The per-pid state machine that turns parsed lines into transfers.
//!
//! Each pid moves through `absent → open → finalized`, where absent means
//! no store entry and finalized is simultaneous with removal. The message
//! body drives transitions by literal prefix match:
//!
//! - `connect from ` opens a transfer (absent only)
//! - `rsync on ` names the dataset
//! - `sent ... total size N` finalizes with a byte count
//! - `unknown module 'X' tried from ...` finalizes a rejected request
//! - anything else is recorded for diagnostic replay
//!
//! The daemon interleaves many connections in one stream but writes each
//! connection's lines in order, so the machine is keyed per pid and never
//! reorders. Every line is applied exactly once, synchronously, with at
//! most one store mutation.

use tracing::info;

use crate::error::{EventError, Result};
use crate::parser::ParsedLine;
use crate::store::EventStore;
use crate::types::{FinalizedTransfer, TransferEvent};

const CONNECT_PREFIX: &str = "connect from ";
const MODULE_PREFIX: &str = "rsync on ";
const SENT_PREFIX: &str = "sent ";
const UNKNOWN_MODULE_PREFIX: &str = "unknown module ";
const TOTAL_SIZE_MARKER: &str = "total size ";
const TRIED_FROM_MARKER: &str = " tried from";

/// Receiver for finalized transfers.
///
/// The three calls happen together, exactly once per finalized transfer,
/// in declaration order, fire-and-forget: the correlator has already
/// removed the store entry and does not react to sink behavior. An
/// implementation must not block line consumption; a bounded-latency
/// local registry write qualifies, a network call does not.
pub trait TransferSink {
    /// Records the wall-clock duration of a finalized transfer.
    fn observe_duration(&self, source: &str, dataset: &str, seconds: f64);

    /// Records the total byte size of a finalized transfer.
    fn observe_size(&self, source: &str, dataset: &str, bytes: u64);

    /// Counts one finished request, regardless of outcome.
    fn inc_requests(&self);
}

/// What applying a line to the state machine did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// A new transfer was opened for the line's pid.
    Opened,
    /// An existing transfer absorbed the line and stays open.
    Recorded,
    /// The line terminated its transfer; the store entry is gone and the
    /// sink has been notified.
    Finalized(FinalizedTransfer),
}

/// The correlation state machine over one log stream.
///
/// Owns its [`EventStore`] and the sink it emits to; both are injected,
/// nothing is ambient. Single writer, single reader: the one task feeding
/// lines through [`Correlator::apply`].
#[derive(Debug)]
pub struct Correlator<S> {
    store: EventStore,
    sink: S,
}

impl<S: TransferSink> Correlator<S> {
    /// Creates a correlator with an empty store emitting to `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            store: EventStore::new(),
            sink,
        }
    }

    /// Returns the in-flight transfer store.
    #[must_use]
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Applies one parsed line to its pid's state machine.
    ///
    /// # Errors
    ///
    /// All errors are per-line conditions the caller reports and skips:
    ///
    /// - [`EventError::UnexpectedLine`] — non-connect line for a pid with
    ///   no open transfer; dropped, store unchanged.
    /// - [`EventError::DuplicateConnect`] — connect for an already-open
    ///   pid; rejected, the original transfer is kept.
    /// - [`EventError::MalformedFinalization`] — `sent` line without a
    ///   parsable size; the transfer stays open rather than finalizing
    ///   with made-up numbers.
    pub fn apply(&mut self, line: &ParsedLine) -> Result<Applied> {
        if let Some(source) = line.message.strip_prefix(CONNECT_PREFIX) {
            return self.open(line, source);
        }

        if !self.store.contains(&line.pid) {
            return Err(EventError::UnexpectedLine {
                pid: line.pid.clone(),
                message: line.message.clone(),
            });
        }

        if line.message.starts_with(SENT_PREFIX) {
            return self.finalize_sent(line);
        }
        if let Some(rest) = line.message.strip_prefix(UNKNOWN_MODULE_PREFIX) {
            return self.finalize_unknown_module(line, rest);
        }

        // The transfer exists; everything else is recorded and kept open.
        if let Some(event) = self.store.get_mut(&line.pid) {
            if let Some(rest) = line.message.strip_prefix(MODULE_PREFIX) {
                if let Some(dataset) = rest.split_whitespace().next() {
                    event.set_dataset(dataset);
                }
            }
            event.record_message(&line.message);
        }
        Ok(Applied::Recorded)
    }

    fn open(&mut self, line: &ParsedLine, source: &str) -> Result<Applied> {
        if self.store.contains(&line.pid) {
            // The daemon never reuses a pid while its connection lives, so
            // this indicates a corrupt or replayed log. Keep the original.
            return Err(EventError::DuplicateConnect {
                pid: line.pid.clone(),
                message: line.message.clone(),
            });
        }
        self.store.insert(TransferEvent::open(
            line.pid.clone(),
            source,
            line.timestamp,
            &line.message,
        ));
        Ok(Applied::Opened)
    }

    fn finalize_sent(&mut self, line: &ParsedLine) -> Result<Applied> {
        let Some(total_size) = parse_total_size(&line.message) else {
            // Fail closed: a later well-formed terminal line may still
            // finalize this transfer correctly.
            return Err(EventError::MalformedFinalization {
                pid: line.pid.clone(),
                message: line.message.clone(),
            });
        };

        match self.store.remove(&line.pid) {
            Some(mut event) => {
                event.record_message(&line.message);
                Ok(Applied::Finalized(
                    self.emit(event.finalize(line.timestamp, total_size)),
                ))
            }
            None => Err(EventError::UnexpectedLine {
                pid: line.pid.clone(),
                message: line.message.clone(),
            }),
        }
    }

    fn finalize_unknown_module(&mut self, line: &ParsedLine, rest: &str) -> Result<Applied> {
        match self.store.remove(&line.pid) {
            Some(mut event) => {
                // `unknown module 'backups' tried from host (addr)`
                let dataset = rest
                    .split(TRIED_FROM_MARKER)
                    .next()
                    .unwrap_or(rest)
                    .trim_matches('\'');
                event.set_dataset(dataset);
                event.record_message(&line.message);
                Ok(Applied::Finalized(self.emit(event.finalize(line.timestamp, 0))))
            }
            None => Err(EventError::UnexpectedLine {
                pid: line.pid.clone(),
                message: line.message.clone(),
            }),
        }
    }

    /// Hands a finalized transfer to the sink: duration, size, then the
    /// request count, exactly once, no rollback.
    fn emit(&self, transfer: FinalizedTransfer) -> FinalizedTransfer {
        self.sink
            .observe_duration(&transfer.source, &transfer.dataset, transfer.duration_seconds());
        self.sink
            .observe_size(&transfer.source, &transfer.dataset, transfer.total_size);
        self.sink.inc_requests();

        info!(
            pid = %transfer.pid,
            source = %transfer.source,
            dataset = %transfer.dataset,
            duration_seconds = transfer.duration_seconds(),
            total_size = transfer.total_size,
            "transfer finalized"
        );
        transfer
    }
}

/// Extracts the integer following `total size ` from a `sent` line.
fn parse_total_size(message: &str) -> Option<u64> {
    let (_, rest) = message.split_once(TOTAL_SIZE_MARKER)?;
    rest.split_whitespace().next()?.parse().ok()
}
