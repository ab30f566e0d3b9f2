//! The single-consumer loop feeding log lines through the correlator.

use tracing::warn;

use rsyncwatch_events::{parser, Correlator, EventError, TransferSink};
use rsyncwatch_tail::{LogFollower, Result as TailResult};

/// Sequential parse → correlate pipeline over one log stream.
///
/// One logical task pulls lines and applies them synchronously; the
/// correlator's store needs no locking because this is its only reader
/// and writer.
#[derive(Debug)]
pub struct Pipeline<S> {
    correlator: Correlator<S>,
}

impl<S: TransferSink> Pipeline<S> {
    /// Creates a pipeline emitting finalized transfers to `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            correlator: Correlator::new(sink),
        }
    }

    /// Returns the correlator, for store introspection.
    #[must_use]
    pub fn correlator(&self) -> &Correlator<S> {
        &self.correlator
    }

    /// Applies one raw line, reporting per-line problems and moving on.
    ///
    /// Nothing a line contains can fail the pipeline: malformed lines,
    /// orphan pids, duplicate connects, and unparsable terminal sizes are
    /// all logged and skipped.
    pub fn handle_line(&mut self, raw: &str) {
        let line = match parser::parse(raw) {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "skipping unparseable line");
                return;
            }
        };

        match self.correlator.apply(&line) {
            Ok(_) => {}
            Err(err @ EventError::MalformedFinalization { .. }) => {
                warn!(%err, "terminal line rejected, transfer stays open");
            }
            Err(err) => {
                warn!(%err, "dropping line");
            }
        }
    }

    /// Consumes lines from `follower` until a read error.
    ///
    /// Runs indefinitely in normal operation; the follower blocks at end
    /// of file rather than finishing.
    ///
    /// # Errors
    ///
    /// Returns the follower's error if reading the log file fails.
    pub async fn run(&mut self, follower: &mut LogFollower) -> TailResult<()> {
        loop {
            let raw = follower.next_line().await?;
            self.handle_line(&raw);
        }
    }
}
