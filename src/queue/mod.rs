//! In-memory download queue.
//!
//! This module owns every [`Job`] the service knows about and moves them
//! through their lifecycle (waiting → `in_progress` → completed/failed).
//!
//! # Overview
//!
//! The queue system consists of:
//! - [`Queue`] - Cloneable handle; all clones share one job collection
//! - [`Job`] - Individual download request with metadata
//! - [`JobStatus`] - Job lifecycle states
//! - [`QueueError`] - Operation error types
//!
//! Every operation takes the same mutex for its whole duration and never
//! performs I/O while holding it, so readers always see whole jobs and the
//! worker's long-running downloads never block status requests.
//!
//! # Example
//!
//! ```
//! use audio_downloader_core::queue::{JobStatus, Queue, TrackMetadata};
//!
//! let queue = Queue::new();
//! let job = queue.enqueue("https://youtu.be/xyz").expect("supported url");
//!
//! let claimed = queue.claim_next().expect("one waiting job");
//! assert_eq!(claimed.id, job.id);
//!
//! queue.mark_completed(claimed.id, TrackMetadata::default()).unwrap();
//! assert_eq!(queue.snapshot().counts.completed, 1);
//! ```

mod error;
mod item;

pub use error::QueueError;
pub use item::{Job, JobId, JobStatus, TrackMetadata};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::source::classify_url;

/// Result type for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Per-status job counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueCounts {
    /// Jobs not yet claimed.
    pub waiting: usize,
    /// Jobs currently downloading.
    pub in_progress: usize,
    /// Jobs that finished successfully.
    pub completed: usize,
    /// Jobs that failed.
    pub failed: usize,
    /// All jobs in the queue.
    pub total: usize,
}

impl QueueCounts {
    fn tally<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Self {
        let mut counts = Self::default();
        for job in jobs {
            match job.status {
                JobStatus::Waiting => counts.waiting += 1,
                JobStatus::InProgress => counts.in_progress += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

/// Point-in-time copy of the queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    /// All jobs, most recently created first.
    pub items: Vec<Job>,
    /// Aggregate counts over `items`.
    pub counts: QueueCounts,
}

/// Thread-safe download queue.
///
/// Jobs are stored in creation order; claim order is FIFO among waiting jobs.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    jobs: Arc<Mutex<Vec<Job>>>,
}

impl Queue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // No critical section can leave the Vec half-updated, so a poisoned lock
    // still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, Vec<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a URL to the queue as a waiting job.
    ///
    /// Returns `None` without changing the queue when the trimmed URL is
    /// empty, is not a supported source, or already has a waiting or
    /// in-progress job. Completed and failed jobs do not block re-queueing.
    #[instrument(skip(self))]
    pub fn enqueue(&self, url: &str) -> Option<Job> {
        let mut jobs = self.lock();
        push_if_new(&mut jobs, url)
    }

    /// Adds a batch of URLs under a single lock acquisition.
    ///
    /// Returns the jobs actually added, in input order.
    #[instrument(skip_all)]
    pub fn enqueue_all<I, S>(&self, urls: I) -> Vec<Job>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut jobs = self.lock();
        let added: Vec<Job> = urls
            .into_iter()
            .filter_map(|url| push_if_new(&mut jobs, url.as_ref()))
            .collect();
        info!(added = added.len(), total = jobs.len(), "enqueued downloads");
        added
    }

    /// Returns a copy of every job, newest first, with status counts.
    #[must_use]
    pub fn snapshot(&self) -> QueueSnapshot {
        let jobs = self.lock();
        // Insertion order is creation order.
        let items: Vec<Job> = jobs.iter().rev().cloned().collect();
        let counts = QueueCounts::tally(jobs.iter());
        QueueSnapshot { items, counts }
    }

    /// Returns the per-status counts without copying jobs.
    #[must_use]
    pub fn counts(&self) -> QueueCounts {
        QueueCounts::tally(self.lock().iter())
    }

    /// Returns a copy of one job.
    #[must_use]
    pub fn get(&self, id: JobId) -> Option<Job> {
        self.lock().iter().find(|job| job.id == id).cloned()
    }

    /// Number of jobs in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when the queue holds no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes a job regardless of its status.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ItemNotFound`] if no job has the given ID.
    #[instrument(skip(self))]
    pub fn remove(&self, id: JobId) -> Result<Job> {
        let mut jobs = self.lock();
        let index = jobs
            .iter()
            .position(|job| job.id == id)
            .ok_or(QueueError::ItemNotFound(id))?;
        let job = jobs.remove(index);
        info!(%id, status = %job.status, "removed job");
        Ok(job)
    }

    /// Removes every completed or failed job and returns how many were removed.
    #[instrument(skip(self))]
    pub fn clear_terminal(&self) -> usize {
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|job| !job.status.is_terminal());
        let removed = before - jobs.len();
        info!(removed, remaining = jobs.len(), "cleared finished jobs");
        removed
    }

    /// Claims the oldest waiting job for processing.
    ///
    /// Atomically transitions it to `in_progress`, stamps `started_at`, and
    /// returns a copy. Returns `None` if nothing is waiting.
    #[instrument(skip(self))]
    pub fn claim_next(&self) -> Option<Job> {
        let mut jobs = self.lock();
        let job = jobs
            .iter_mut()
            .find(|job| job.status == JobStatus::Waiting)?;
        job.start(Utc::now());
        debug!(id = %job.id, url = %job.url, "claimed job");
        Some(job.clone())
    }

    /// Marks an in-progress job completed and applies extracted metadata.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ItemNotFound`] if the job was removed, or
    /// [`QueueError::InvalidTransition`] if it is not in progress.
    #[instrument(skip(self, metadata))]
    pub fn mark_completed(&self, id: JobId, metadata: TrackMetadata) -> Result<Job> {
        self.finish(id, JobStatus::Completed, |job, now| {
            job.complete(metadata, now);
        })
    }

    /// Marks an in-progress job failed with an error message.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ItemNotFound`] if the job was removed, or
    /// [`QueueError::InvalidTransition`] if it is not in progress.
    #[instrument(skip(self), fields(error = %message))]
    pub fn mark_failed(&self, id: JobId, message: &str) -> Result<Job> {
        self.finish(id, JobStatus::Failed, |job, now| job.fail(message, now))
    }

    fn finish(
        &self,
        id: JobId,
        to: JobStatus,
        apply: impl FnOnce(&mut Job, chrono::DateTime<Utc>),
    ) -> Result<Job> {
        let mut jobs = self.lock();
        let job = jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or(QueueError::ItemNotFound(id))?;

        if !job.status.can_transition_to(to) {
            return Err(QueueError::InvalidTransition {
                id,
                from: job.status,
                to,
            });
        }

        apply(job, Utc::now());
        Ok(job.clone())
    }
}

fn push_if_new(jobs: &mut Vec<Job>, url: &str) -> Option<Job> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let Some(kind) = classify_url(url) else {
        debug!(url, "skipping unsupported url");
        return None;
    };

    if jobs
        .iter()
        .any(|job| job.url == url && job.status.is_active())
    {
        debug!(url, "skipping url already queued");
        return None;
    }

    let job = Job::new(url, kind);
    debug!(id = %job.id, url, kind = %kind, "enqueued job");
    jobs.push(job.clone());
    Some(job)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::source::SourceKind;

    const SPOTIFY: &str = "https://open.spotify.com/track/abc";
    const YOUTUBE: &str = "https://youtu.be/xyz";

    #[test]
    fn test_enqueue_trims_and_classifies() {
        let queue = Queue::new();
        let job = queue.enqueue("  https://youtu.be/xyz \n").unwrap();
        assert_eq!(job.url, YOUTUBE);
        assert_eq!(job.source_kind, SourceKind::YouTube);
        assert_eq!(job.status, JobStatus::Waiting);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_enqueue_skips_empty_and_unknown() {
        let queue = Queue::new();
        assert!(queue.enqueue("   ").is_none());
        assert!(queue.enqueue("not-a-url").is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_enqueue_skips_active_duplicate() {
        let queue = Queue::new();
        queue.enqueue(SPOTIFY).unwrap();
        assert!(queue.enqueue(SPOTIFY).is_none());

        queue.claim_next().unwrap();
        assert!(queue.enqueue(SPOTIFY).is_none(), "in-progress blocks too");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_enqueue_allows_requeue_after_terminal() {
        let queue = Queue::new();
        let first = queue.enqueue(SPOTIFY).unwrap();
        queue.claim_next().unwrap();
        queue.mark_failed(first.id, "nope").unwrap();

        let second = queue.enqueue(SPOTIFY).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_enqueue_all_returns_added_in_input_order() {
        let queue = Queue::new();
        let added = queue.enqueue_all([SPOTIFY, "not-a-url", YOUTUBE, SPOTIFY]);
        let urls: Vec<&str> = added.iter().map(|job| job.url.as_str()).collect();
        assert_eq!(urls, vec![SPOTIFY, YOUTUBE]);
    }

    #[test]
    fn test_snapshot_orders_newest_first() {
        let queue = Queue::new();
        queue.enqueue_all([SPOTIFY, YOUTUBE]);
        let snapshot = queue.snapshot();
        assert_eq!(snapshot.items[0].url, YOUTUBE);
        assert_eq!(snapshot.items[1].url, SPOTIFY);
    }

    #[test]
    fn test_claim_next_is_fifo_and_none_when_empty() {
        let queue = Queue::new();
        assert!(queue.claim_next().is_none());

        let first = queue.enqueue(SPOTIFY).unwrap();
        let second = queue.enqueue(YOUTUBE).unwrap();

        let claimed = queue.claim_next().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.status, JobStatus::InProgress);
        assert!(claimed.started_at.is_some());

        assert_eq!(queue.claim_next().unwrap().id, second.id);
        assert!(queue.claim_next().is_none());
    }

    #[test]
    fn test_mark_completed_applies_metadata() {
        let queue = Queue::new();
        let job = queue.enqueue(YOUTUBE).unwrap();
        queue.claim_next().unwrap();

        let done = queue
            .mark_completed(
                job.id,
                TrackMetadata::new(Some("Artist".into()), Some("Title".into())),
            )
            .unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.artist_name, "Artist");
        assert_eq!(done.track_name, "Title");
        assert!(done.completed_at >= done.started_at);
    }

    #[test]
    fn test_mark_on_waiting_job_is_invalid_transition() {
        let queue = Queue::new();
        let job = queue.enqueue(YOUTUBE).unwrap();
        let err = queue.mark_failed(job.id, "x").unwrap_err();
        assert_eq!(
            err,
            QueueError::InvalidTransition {
                id: job.id,
                from: JobStatus::Waiting,
                to: JobStatus::Failed,
            }
        );
        assert_eq!(queue.get(job.id).unwrap().status, JobStatus::Waiting);
    }

    #[test]
    fn test_terminal_job_cannot_change_again() {
        let queue = Queue::new();
        let job = queue.enqueue(YOUTUBE).unwrap();
        queue.claim_next().unwrap();
        queue.mark_completed(job.id, TrackMetadata::default()).unwrap();

        let result = queue.mark_failed(job.id, "late failure");
        assert!(matches!(
            result,
            Err(QueueError::InvalidTransition {
                from: JobStatus::Completed,
                ..
            })
        ));
    }

    #[test]
    fn test_mark_removed_job_is_not_found() {
        let queue = Queue::new();
        let job = queue.enqueue(YOUTUBE).unwrap();
        queue.claim_next().unwrap();
        queue.remove(job.id).unwrap();

        let result = queue.mark_completed(job.id, TrackMetadata::default());
        assert_eq!(result, Err(QueueError::ItemNotFound(job.id)));
    }

    #[test]
    fn test_remove_unknown_id_reports_not_found() {
        let queue = Queue::new();
        queue.enqueue(YOUTUBE).unwrap();
        let missing = Uuid::new_v4();
        assert_eq!(queue.remove(missing), Err(QueueError::ItemNotFound(missing)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_clear_terminal_keeps_active_jobs() {
        let queue = Queue::new();
        let done = queue.enqueue(SPOTIFY).unwrap();
        let failed = queue.enqueue(YOUTUBE).unwrap();
        let running = queue.enqueue("https://music.youtube.com/watch?v=1").unwrap();
        let waiting = queue.enqueue("https://open.spotify.com/track/def").unwrap();

        queue.claim_next().unwrap();
        queue.mark_completed(done.id, TrackMetadata::default()).unwrap();
        queue.claim_next().unwrap();
        queue.mark_failed(failed.id, "err").unwrap();
        queue.claim_next().unwrap();

        assert_eq!(queue.clear_terminal(), 2);
        assert!(queue.get(running.id).is_some());
        assert!(queue.get(waiting.id).is_some());
        assert!(queue.get(done.id).is_none());
        assert!(queue.get(failed.id).is_none());
        assert_eq!(queue.clear_terminal(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let queue = Queue::new();
        let other = queue.clone();
        queue.enqueue(YOUTUBE).unwrap();
        assert_eq!(other.counts().waiting, 1);
    }
}
