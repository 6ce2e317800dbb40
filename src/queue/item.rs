//! Job types and status definitions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::source::SourceKind;

/// Opaque job identifier. Random v4 UUIDs, never reused within a process.
pub type JobId = Uuid;

/// Status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Queued, not yet claimed by the worker.
    Waiting,
    /// Claimed by the worker; the external downloader is running.
    InProgress,
    /// Downloader exited successfully.
    Completed,
    /// Downloader failed, timed out, or could not be started.
    Failed,
}

impl JobStatus {
    /// Returns the wire string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Waiting and in-progress jobs count as pending work for de-duplication.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Waiting | Self::InProgress)
    }

    /// Completed and failed jobs never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true when `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Waiting, Self::InProgress)
                | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(Self::Waiting),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid job status: {s}")),
        }
    }
}

/// Best-effort track metadata reported by a downloader.
///
/// `None` fields leave the job's current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    /// Track title.
    pub track_name: Option<String>,
    /// Artist or channel name.
    pub artist_name: Option<String>,
}

impl TrackMetadata {
    /// Builds metadata from optional values, dropping blank strings.
    #[must_use]
    pub fn new(artist_name: Option<String>, track_name: Option<String>) -> Self {
        Self {
            track_name: track_name.filter(|s| !s.trim().is_empty()),
            artist_name: artist_name.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Returns true when nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.track_name.is_none() && self.artist_name.is_none()
    }
}

/// A single requested download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier.
    pub id: JobId,
    /// The URL as submitted (whitespace trimmed).
    pub url: String,
    /// Which downloader handles this URL.
    #[serde(rename = "download_type")]
    pub source_kind: SourceKind,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Extracted track title, empty until a download reports one.
    pub track_name: String,
    /// Extracted artist, empty until a download reports one.
    pub artist_name: String,
    /// Failure reason, empty unless `status` is `Failed`.
    pub error_message: String,
    /// When the job was queued.
    pub created_at: DateTime<Utc>,
    /// When the worker claimed the job.
    pub started_at: Option<DateTime<Utc>>,
    /// When the job reached a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a new waiting job.
    #[must_use]
    pub fn new(url: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            source_kind,
            status: JobStatus::Waiting,
            track_name: String::new(),
            artist_name: String::new(),
            error_message: String::new(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Waiting -> `InProgress`.
    pub(crate) fn start(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::InProgress;
        self.started_at = Some(now.max(self.created_at));
    }

    /// `InProgress` -> Completed, applying any extracted metadata.
    pub(crate) fn complete(&mut self, metadata: TrackMetadata, now: DateTime<Utc>) {
        if let Some(track_name) = metadata.track_name {
            self.track_name = track_name;
        }
        if let Some(artist_name) = metadata.artist_name {
            self.artist_name = artist_name;
        }
        self.status = JobStatus::Completed;
        self.completed_at = Some(self.clamp_finish(now));
    }

    /// `InProgress` -> Failed.
    pub(crate) fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = JobStatus::Failed;
        self.error_message = message.into();
        self.completed_at = Some(self.clamp_finish(now));
    }

    // Wall-clock adjustments must not produce completed_at < started_at.
    fn clamp_finish(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.started_at.unwrap_or(self.created_at))
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job {{ id: {}, url: {}, status: {} }}",
            self.id, self.url, self.status
        )
    }
}
