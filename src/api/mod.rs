//! HTTP API over the download queue.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/add-downloads` | Queue a JSON array of URLs |
//! | `GET` | `/queue-status` | All jobs (newest first) and counts |
//! | `DELETE` | `/clear-queue` | Remove completed/failed jobs |
//! | `DELETE` | `/remove-item/{id}` | Remove one job, 404 if unknown |
//! | `POST` | `/upload-cookie` | Multipart upload of `cookies.txt` |
//! | `GET` | `/cookie-status` | Cookie file presence, size, mtime |
//!
//! Anything else falls through to the static front-end directory, if configured.

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{
    AddDownloadsResponse, AddedItem, ClearQueueResponse, MessageResponse, add_downloads,
    clear_queue, cookie_status_handler, queue_status, remove_item, upload_cookie,
};

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{debug, warn};

use crate::config::DownloaderConfig;
use crate::queue::Queue;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The queue also consumed by the worker.
    pub queue: Queue,
    /// Paths for the cookie file.
    pub config: Arc<DownloaderConfig>,
}

impl AppState {
    /// Creates handler state.
    #[must_use]
    pub fn new(queue: Queue, config: Arc<DownloaderConfig>) -> Self {
        Self { queue, config }
    }
}

/// Builds the API router, serving `static_dir` for unmatched paths when it exists.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/add-downloads", post(add_downloads))
        .route("/queue-status", get(queue_status))
        .route("/clear-queue", delete(clear_queue))
        .route("/remove-item/{id}", delete(remove_item))
        .route("/upload-cookie", post(upload_cookie))
        .route("/cookie-status", get(cookie_status_handler))
        .with_state(state);

    let api = match static_dir {
        Some(dir) if dir.is_dir() => {
            debug!(dir = %dir.display(), "serving static files");
            api.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            warn!(dir = %dir.display(), "static directory not found, front-end disabled");
            api
        }
        None => api,
    };

    api.layer(CorsLayer::permissive())
}
