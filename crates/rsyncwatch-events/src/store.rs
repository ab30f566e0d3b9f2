//! The correlation state machine's memory: pid → in-flight transfer.

use std::collections::HashMap;

use crate::types::{ProcessId, TransferEvent};

/// Mapping from live pid to its in-flight [`TransferEvent`].
///
/// The store exclusively owns all live transfers. There is no iteration,
/// no eviction, and no capacity bound beyond natural process lifetime: a
/// transfer whose terminal line never arrives stays here for the life of
/// the watcher. That leak is an accepted property of the log format, not
/// something the store papers over.
///
/// Explicitly owned and passed, never ambient: multiple independent
/// watchers can each carry their own store.
#[derive(Debug, Default)]
pub struct EventStore {
    events: HashMap<ProcessId, TransferEvent>,
}

impl EventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the transfer for `pid`, if one is open.
    #[must_use]
    pub fn get(&self, pid: &ProcessId) -> Option<&TransferEvent> {
        self.events.get(pid)
    }

    /// Returns the transfer for `pid` mutably, if one is open.
    pub fn get_mut(&mut self, pid: &ProcessId) -> Option<&mut TransferEvent> {
        self.events.get_mut(pid)
    }

    /// Returns whether a transfer is open for `pid`.
    #[must_use]
    pub fn contains(&self, pid: &ProcessId) -> bool {
        self.events.contains_key(pid)
    }

    /// Inserts a freshly opened transfer, keyed by its own pid.
    ///
    /// Returns the previous transfer if one was open under the same pid;
    /// the correlator treats that case as a rejected duplicate before
    /// ever calling this.
    pub fn insert(&mut self, event: TransferEvent) -> Option<TransferEvent> {
        self.events.insert(event.pid().clone(), event)
    }

    /// Removes and returns the transfer for `pid`.
    pub fn remove(&mut self, pid: &ProcessId) -> Option<TransferEvent> {
        self.events.remove(pid)
    }

    /// Number of in-flight transfers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns whether no transfers are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
