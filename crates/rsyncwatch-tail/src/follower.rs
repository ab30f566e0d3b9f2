//! Poll-based tail reader over one append-only log file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{Result, TailError};

const READ_CHUNK: usize = 8 * 1024;

/// Reads lines from a growing file, waiting at end of file for more.
///
/// Bytes are accumulated in an internal buffer and handed out only at
/// `\n` boundaries, so a line the daemon has written halfway is withheld
/// until its newline arrives. End of file is never surfaced to the
/// caller; [`LogFollower::next_line`] suspends on the poll interval and
/// retries until new bytes appear.
#[derive(Debug)]
pub struct LogFollower {
    file: File,
    path: PathBuf,
    buf: Vec<u8>,
    poll_interval: Duration,
}

impl LogFollower {
    /// Opens `path` for following, starting from the beginning of the
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`TailError::Open`] if the file cannot be opened; callers
    /// treat this as fatal.
    pub async fn open(path: impl AsRef<Path>, poll_interval: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|source| TailError::Open {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "following log file");

        Ok(Self {
            file,
            path,
            buf: Vec::new(),
            poll_interval,
        })
    }

    /// Returns the path being followed.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the next complete line, without its trailing newline.
    ///
    /// Suspends indefinitely when no complete line is available. Invalid
    /// UTF-8 is replaced rather than rejected; the log is a diagnostic
    /// stream, not a protocol.
    ///
    /// # Errors
    ///
    /// Returns [`TailError::Read`] if the underlying read fails.
    pub async fn next_line(&mut self) -> Result<String> {
        loop {
            if let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(String::from_utf8_lossy(&line).into_owned());
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = self.file.read(&mut chunk).await?;
            if n == 0 {
                // At end of file: the writer is still alive, wait for it.
                sleep(self.poll_interval).await;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::time::timeout;

    const POLL: Duration = Duration::from_millis(10);

    fn log_with(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        file.write_all(content.as_bytes()).unwrap_or_else(|e| panic!("{e}"));
        file.flush().unwrap_or_else(|e| panic!("{e}"));
        file
    }

    fn append(file: &mut tempfile::NamedTempFile, content: &str) {
        file.write_all(content.as_bytes()).unwrap_or_else(|e| panic!("{e}"));
        file.flush().unwrap_or_else(|e| panic!("{e}"));
    }

    #[tokio::test]
    async fn reads_existing_lines_in_order() {
        let log = log_with("first\nsecond\nthird\n");
        let mut follower = LogFollower::open(log.path(), POLL).await.unwrap();

        assert_eq!(follower.next_line().await.unwrap(), "first");
        assert_eq!(follower.next_line().await.unwrap(), "second");
        assert_eq!(follower.next_line().await.unwrap(), "third");
    }

    #[tokio::test]
    async fn picks_up_lines_appended_after_end_of_file() {
        let mut log = log_with("existing\n");
        let mut follower = LogFollower::open(log.path(), POLL).await.unwrap();
        assert_eq!(follower.next_line().await.unwrap(), "existing");

        append(&mut log, "appended\n");
        assert_eq!(follower.next_line().await.unwrap(), "appended");
    }

    #[tokio::test(start_paused = true)]
    async fn withholds_a_partially_written_line() {
        let mut log = log_with("whole\nhalf");
        let mut follower = LogFollower::open(log.path(), POLL).await.unwrap();
        assert_eq!(follower.next_line().await.unwrap(), "whole");

        // No newline yet: next_line must keep waiting.
        let pending = timeout(Duration::from_millis(100), follower.next_line()).await;
        assert!(pending.is_err());

        // The rest of the line arrives and the fragments join up.
        append(&mut log, " a line\n");
        assert_eq!(follower.next_line().await.unwrap(), "half a line");
    }

    #[tokio::test]
    async fn strips_carriage_returns() {
        let log = log_with("windows line\r\n");
        let mut follower = LogFollower::open(log.path(), POLL).await.unwrap();
        assert_eq!(follower.next_line().await.unwrap(), "windows line");
    }

    #[tokio::test]
    async fn replaces_invalid_utf8_instead_of_failing() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        file.write_all(b"bad \xff byte\n").unwrap_or_else(|e| panic!("{e}"));
        file.flush().unwrap_or_else(|e| panic!("{e}"));

        let mut follower = LogFollower::open(file.path(), POLL).await.unwrap();
        let line = follower.next_line().await.unwrap();
        assert!(line.starts_with("bad "));
        assert!(line.ends_with(" byte"));
    }

    #[tokio::test]
    async fn missing_file_is_a_fatal_open_error() {
        let err = LogFollower::open("/nonexistent/rsyncd.log", POLL)
            .await
            .err()
            .unwrap_or_else(|| panic!("expected open failure"));
        assert!(matches!(err, TailError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/rsyncd.log"));
    }
}
