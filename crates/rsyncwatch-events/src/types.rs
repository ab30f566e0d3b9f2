//! Core types for transfer event correlation.
//!
//! This module provides:
//! - [`ProcessId`] — the opaque correlation key taken from the log
//! - [`TransferEvent`] — an in-flight transfer owned by the store
//! - [`FinalizedTransfer`] — a completed transfer handed to the sink

use std::collections::VecDeque;
use std::fmt;

use chrono::NaiveDateTime;

/// Maximum number of raw message bodies retained per in-flight transfer.
///
/// A transfer whose process hangs never finalizes, so its message buffer
/// would otherwise grow for the lifetime of the watcher. Past the cap the
/// oldest message is dropped; metrics correctness does not depend on the
/// buffer at all, it exists for diagnostic replay.
pub const MESSAGE_CAP: usize = 256;

/// The process-id token an rsync daemon prints between brackets.
///
/// Treated as an opaque string key: it only needs equality and
/// uniqueness-while-live. A finalized transfer releases its key, and the
/// daemon may later reuse the token for an unrelated connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessId(String);

impl ProcessId {
    /// Creates a process id from the bracket-stripped log token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProcessId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// An in-flight transfer, keyed by its pid in the [`EventStore`].
///
/// Created by a `connect from` line, mutated by subsequent lines sharing
/// its pid, and consumed by [`TransferEvent::finalize`] at the instant a
/// terminal line arrives. Source and start time are fixed at creation.
///
/// [`EventStore`]: crate::store::EventStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pid: ProcessId,
    source: String,
    start_time: NaiveDateTime,
    dataset: String,
    messages: VecDeque<String>,
}

impl TransferEvent {
    /// Opens a new transfer from a `connect from` line.
    #[must_use]
    pub fn open(
        pid: ProcessId,
        source: impl Into<String>,
        start_time: NaiveDateTime,
        first_message: impl Into<String>,
    ) -> Self {
        let mut messages = VecDeque::new();
        messages.push_back(first_message.into());
        Self {
            pid,
            source: source.into(),
            start_time,
            dataset: String::new(),
            messages,
        }
    }

    /// Returns the pid this transfer is keyed by.
    #[must_use]
    pub fn pid(&self) -> &ProcessId {
        &self.pid
    }

    /// Returns the client address from the opening line.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the timestamp of the opening line.
    #[must_use]
    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    /// Returns the dataset name, empty until learned.
    #[must_use]
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Returns the retained raw message bodies, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Sets the dataset being synced.
    pub fn set_dataset(&mut self, dataset: impl Into<String>) {
        self.dataset = dataset.into();
    }

    /// Appends a raw message body, dropping the oldest past [`MESSAGE_CAP`].
    pub fn record_message(&mut self, message: impl Into<String>) {
        if self.messages.len() == MESSAGE_CAP {
            self.messages.pop_front();
        }
        self.messages.push_back(message.into());
    }

    /// Completes the transfer, consuming it.
    ///
    /// The caller removes the store entry in the same step; a finalized
    /// transfer is never held in the store.
    #[must_use]
    pub fn finalize(self, end_time: NaiveDateTime, total_size: u64) -> FinalizedTransfer {
        FinalizedTransfer {
            pid: self.pid,
            source: self.source,
            dataset: self.dataset,
            start_time: self.start_time,
            end_time,
            total_size,
            messages: self.messages.into(),
        }
    }
}

/// A completed transfer, produced exactly once per terminal line.
///
/// Ownership passes to the metrics sink at finalization; nothing in the
/// correlation layer references it afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedTransfer {
    /// The pid the transfer was keyed by while live.
    pub pid: ProcessId,
    /// Client address from the opening line.
    pub source: String,
    /// Dataset name, empty if never learned.
    pub dataset: String,
    /// Timestamp of the opening line.
    pub start_time: NaiveDateTime,
    /// Timestamp of the terminal line.
    pub end_time: NaiveDateTime,
    /// Bytes reported by the terminal line, 0 for rejected modules.
    pub total_size: u64,
    /// Retained raw message bodies, oldest first.
    pub messages: Vec<String>,
}

impl FinalizedTransfer {
    /// Wall-clock duration of the transfer in seconds.
    ///
    /// The log carries second resolution, so this is a whole number for
    /// any well-ordered input.
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        (self.end_time - self.start_time).num_seconds() as f64
    }
}
