//! Error types for the download module.
//!
//! The `Display` text of each variant is what ends up in a failed job's
//! `error_message`, so messages are written for the end user.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while driving an external downloader.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The process did not finish within the configured limit and was killed.
    #[error("Download timeout ({})", describe_limit(.limit))]
    Timeout {
        /// Tool tag, e.g. `SpotDL`.
        tool: &'static str,
        /// The limit that was exceeded.
        limit: Duration,
    },

    /// The process exited with a non-zero status.
    #[error("{tool} error: {detail}")]
    ProcessFailed {
        /// Tool tag, e.g. `YT-DLP`.
        tool: &'static str,
        /// Exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed stderr, or a description of the exit status when stderr was empty.
        detail: String,
    },

    /// The executable could not be started (missing binary, permissions, ...).
    #[error("Unexpected error: failed to launch {}: {source}", .program.display())]
    Spawn {
        /// Program that failed to launch.
        program: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// IO failure while collecting the process output.
    #[error("Unexpected error: {source}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The download task ended abnormally (panic or cancellation).
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Description of what went wrong.
        message: String,
    },
}

impl DownloadError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(tool: &'static str, limit: Duration) -> Self {
        Self::Timeout { tool, limit }
    }

    /// Creates a launch error.
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates a catch-all error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns true if this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn describe_limit(limit: &Duration) -> String {
    let secs = limit.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        let minutes = secs / 60;
        if minutes == 1 {
            "1 minute".to_string()
        } else {
            format!("{minutes} minutes")
        }
    } else if secs >= 1 {
        format!("{secs} seconds")
    } else {
        format!("{} ms", limit.as_millis())
    }
}
