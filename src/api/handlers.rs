//! Route handlers. Each one is a thin call into [`Queue`] or the cookie helpers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::cookies::{CookieStatus, cookie_status, save_cookie_file};
use crate::queue::{Job, JobId, QueueSnapshot};
use crate::source::SourceKind;

/// Artist shown for freshly added jobs.
const PLACEHOLDER_ARTIST: &str = "Unknown Artist";

/// Multipart field carrying the cookie file.
const COOKIE_FIELD: &str = "file";

/// One job accepted by `POST /add-downloads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedItem {
    /// New job id.
    pub id: JobId,
    /// The queued URL.
    pub url: String,
    /// Source kind.
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Placeholder title until the download reports one.
    pub track_name: String,
    /// Placeholder artist until the download reports one.
    pub artist_name: String,
}

impl From<Job> for AddedItem {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            track_name: job.source_kind.placeholder_track_name().to_string(),
            artist_name: PLACEHOLDER_ARTIST.to_string(),
            url: job.url,
            kind: job.source_kind,
        }
    }
}

/// Body of `POST /add-downloads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDownloadsResponse {
    /// Human-readable summary.
    pub message: String,
    /// Jobs actually added; skipped URLs are simply absent.
    pub added: Vec<AddedItem>,
}

/// Body of `DELETE /clear-queue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearQueueResponse {
    /// Human-readable summary.
    pub message: String,
    /// Number of completed/failed jobs removed.
    pub removed: usize,
}

/// Generic `{"message": ...}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable summary.
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `POST /add-downloads` - queue a list of URLs.
#[instrument(skip_all, fields(submitted = urls.len()))]
pub async fn add_downloads(
    State(state): State<AppState>,
    Json(urls): Json<Vec<String>>,
) -> Json<AddDownloadsResponse> {
    let added: Vec<AddedItem> = state
        .queue
        .enqueue_all(&urls)
        .into_iter()
        .map(AddedItem::from)
        .collect();

    Json(AddDownloadsResponse {
        message: format!("Added {} downloads to queue", added.len()),
        added,
    })
}

/// `GET /queue-status` - every job, newest first, plus counts.
pub async fn queue_status(State(state): State<AppState>) -> Json<QueueSnapshot> {
    Json(state.queue.snapshot())
}

/// `DELETE /clear-queue` - drop completed and failed jobs.
pub async fn clear_queue(State(state): State<AppState>) -> Json<ClearQueueResponse> {
    let removed = state.queue.clear_terminal();
    Json(ClearQueueResponse {
        message: format!("Removed {removed} completed/failed items from queue"),
        removed,
    })
}

/// `DELETE /remove-item/{id}` - drop one job in any state.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for unknown or malformed ids.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let not_found = || ApiError::NotFound("Item not found".to_string());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;
    state.queue.remove(id).map_err(|_| not_found())?;
    Ok(Json(MessageResponse::new("Item removed from queue")))
}

/// `POST /upload-cookie` - store the multipart `file` field as the cookie file.
///
/// # Errors
///
/// Returns [`ApiError::BadRequest`] for a malformed upload or missing field,
/// [`ApiError::Internal`] if the file cannot be written.
pub async fn upload_cookie(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(COOKIE_FIELD) {
            continue;
        }

        let contents = field.bytes().await?;
        let path = state.config.cookie_file();
        info!(path = %path.display(), bytes = contents.len(), "Received cookie file");
        tokio::task::spawn_blocking(move || save_cookie_file(&path, &contents))
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))??;
        return Ok(Json(MessageResponse::new("Cookie file uploaded successfully")));
    }

    Err(ApiError::BadRequest(format!(
        "missing multipart field '{COOKIE_FIELD}'"
    )))
}

/// `GET /cookie-status` - presence, size and mtime of the cookie file.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if the file exists but cannot be inspected.
pub async fn cookie_status_handler(
    State(state): State<AppState>,
) -> Result<Json<CookieStatus>, ApiError> {
    Ok(Json(cookie_status(&state.config.cookie_file())?))
}
