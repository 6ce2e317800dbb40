//! Sequential download worker.
//!
//! The [`Worker`] is the queue's only consumer. It claims the oldest waiting
//! job, hands it to the matching [`Downloader`], records the outcome, and only
//! then looks for the next job, so at most one external download runs at a
//! time. Nothing a single job does (error, timeout, panic) stops the loop.
//!
//! # Example
//!
//! ```no_run
//! use audio_downloader_core::{DownloaderConfig, Queue, Worker};
//!
//! # async fn example() {
//! let queue = Queue::new();
//! let handle = Worker::from_config(queue.clone(), &DownloaderConfig::default()).spawn();
//! queue.enqueue("https://youtu.be/xyz");
//! # drop(handle);
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::config::DownloaderConfig;
use crate::download::{DownloadError, Downloader, DownloaderRegistry, build_default_registry};
use crate::queue::{Job, JobId, Queue, TrackMetadata};

/// Error text for jobs whose source kind has no registered downloader.
pub const UNKNOWN_TYPE_MESSAGE: &str = "Unknown URL type";

/// Result of one [`Worker::run_once`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerStep {
    /// No waiting job was available.
    Idle,
    /// A job was processed; this is its terminal state.
    Finished(Job),
    /// A job was processed but removed from the queue before its result
    /// could be recorded.
    Orphaned(JobId),
}

/// Single-consumer queue processor.
///
/// Run exactly one worker per [`Queue`]; the one-download-at-a-time guarantee
/// comes from this loop, not from the queue.
#[derive(Debug, Clone)]
pub struct Worker {
    queue: Queue,
    downloaders: DownloaderRegistry,
    poll_interval: Duration,
}

impl Worker {
    /// Creates a worker over `queue` using `downloaders`.
    #[must_use]
    pub fn new(queue: Queue, downloaders: DownloaderRegistry, poll_interval: Duration) -> Self {
        Self {
            queue,
            downloaders,
            poll_interval,
        }
    }

    /// Creates a worker with the production spotdl/yt-dlp adapters.
    #[must_use]
    pub fn from_config(queue: Queue, config: &DownloaderConfig) -> Self {
        Self::new(queue, build_default_registry(config), config.poll_interval)
    }

    /// Starts [`run`](Self::run) on the Tokio runtime.
    #[must_use = "dropping the handle detaches the worker; keep it to abort in tests"]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Processes jobs forever, sleeping `poll_interval` whenever the queue has
    /// nothing waiting.
    pub async fn run(self) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis(),
            downloaders = self.downloaders.len(),
            "download worker started"
        );

        loop {
            if self.run_once().await == WorkerStep::Idle {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
    }

    /// Claims and processes at most one job.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> WorkerStep {
        let Some(job) = self.queue.claim_next() else {
            return WorkerStep::Idle;
        };
        let id = job.id;
        info!(job_id = %id, url = %job.url, kind = %job.source_kind, "processing download");

        let result = match self.downloaders.get(job.source_kind) {
            Some(downloader) => execute(downloader, job).await.map_err(|e| e.to_string()),
            None => Err(UNKNOWN_TYPE_MESSAGE.to_string()),
        };

        let recorded = match result {
            Ok(metadata) => self.queue.mark_completed(id, metadata),
            Err(message) => {
                warn!(job_id = %id, error = %message, "download failed");
                self.queue.mark_failed(id, &message)
            }
        };

        match recorded {
            Ok(job) => {
                info!(
                    job_id = %id,
                    status = %job.status,
                    track = %job.track_name,
                    artist = %job.artist_name,
                    "download finished"
                );
                WorkerStep::Finished(job)
            }
            Err(error) => {
                // Best-effort status update - the job may have been removed meanwhile
                warn!(job_id = %id, %error, "failed to record download result");
                WorkerStep::Orphaned(id)
            }
        }
    }
}

/// Runs the adapter on its own task so a panic surfaces as a failed job.
async fn execute(
    downloader: Arc<dyn Downloader>,
    job: Job,
) -> Result<TrackMetadata, DownloadError> {
    let task = tokio::spawn(async move { downloader.download(&job).await });
    match task.await {
        Ok(result) => result,
        Err(join_error) => {
            warn!(error = %join_error, "download task panicked");
            Err(DownloadError::unexpected(join_error.to_string()))
        }
    }
}
