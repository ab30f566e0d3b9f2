//! Follow semantics for a live-growing log file.
//!
//! An rsync daemon appends to its log for as long as it runs, so the
//! reader's contract is "give me the next line, blocking until one is
//! available": read to the current end of file, then wait for appended
//! bytes, indefinitely, without ever missing bytes written between reads
//! and without ever yielding a partially-written line.
//!
//! [`LogFollower`] is the single implementation; polling is used for the
//! wait because it behaves identically on local and network filesystems.

pub mod error;
pub mod follower;

pub use error::{Result, TailError};
pub use follower::LogFollower;
