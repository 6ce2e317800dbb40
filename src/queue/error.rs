//! Error types for queue operations.

use thiserror::Error;

use super::{JobId, JobStatus};

/// Errors that can occur during queue operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Job not found.
    #[error(
        "job not found: id {0}\n  Suggestion: The job may have been removed or the ID is incorrect"
    )]
    ItemNotFound(JobId),

    /// Requested status change is not allowed by the job state machine.
    #[error("invalid status transition for job {id}: {from} -> {to}")]
    InvalidTransition {
        /// The job being updated.
        id: JobId,
        /// Current status.
        from: JobStatus,
        /// Requested status.
        to: JobStatus,
    },
}

impl QueueError {
    /// Returns true for [`QueueError::ItemNotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ItemNotFound(_))
    }
}
