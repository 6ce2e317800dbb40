//! Bounded execution of external downloader processes.

use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, instrument, warn};

use super::DownloadError;

/// Captured result of a finished process.
#[derive(Debug)]
pub struct ToolOutput {
    /// Exit status.
    pub status: ExitStatus,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl ToolOutput {
    /// Returns `self` on a zero exit, otherwise a tool-tagged
    /// [`DownloadError::ProcessFailed`] built from stderr.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::ProcessFailed`] when the exit status is non-zero.
    pub fn check(self, tool: &'static str) -> Result<Self, DownloadError> {
        if self.status.success() {
            return Ok(self);
        }

        let stderr = self.stderr.trim();
        let detail = if stderr.is_empty() {
            format!("process exited with {}", self.status)
        } else {
            stderr.to_string()
        };
        Err(DownloadError::ProcessFailed {
            tool,
            code: self.status.code(),
            detail,
        })
    }
}

/// Runs `program` with `args`, capturing output, killing it after `limit`.
///
/// # Errors
///
/// - [`DownloadError::Spawn`] if the process cannot be started
/// - [`DownloadError::Timeout`] if it runs longer than `limit`
/// - [`DownloadError::Io`] if collecting output fails
#[instrument(skip(program, args), fields(program = %program.display(), limit_ms = limit.as_millis()))]
pub async fn run_tool(
    tool: &'static str,
    program: &Path,
    args: &[OsString],
    limit: Duration,
) -> Result<ToolOutput, DownloadError> {
    debug!(?args, "spawning process");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| DownloadError::spawn(program, source))?;

    // Dropping the wait future on timeout drops the child, which kills it.
    match tokio::time::timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => {
            debug!(status = %output.status, "process exited");
            Ok(ToolOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Ok(Err(source)) => Err(DownloadError::Io { source }),
        Err(_elapsed) => {
            warn!("process exceeded time limit, killed");
            Err(DownloadError::timeout(tool, limit))
        }
    }
}
