//! External downloader adapters.
//!
//! Each supported [`SourceKind`] has one [`Downloader`] that turns a claimed
//! [`Job`] into files on disk by running an external tool, and reports
//! whatever track metadata it could scrape.
//!
//! # Architecture
//!
//! - [`Downloader`] - Async trait that adapters implement
//! - [`DownloaderRegistry`] - Maps a source kind to its adapter
//! - [`SpotdlDownloader`] - Spotify links via `spotdl`
//! - [`YtDlpDownloader`] - YouTube links via `yt-dlp`
//! - [`run_tool`] - Timeout-bounded process execution shared by adapters
//!
//! # Example
//!
//! ```no_run
//! use audio_downloader_core::download::build_default_registry;
//! use audio_downloader_core::{DownloaderConfig, Job, SourceKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = build_default_registry(&DownloaderConfig::default());
//! let job = Job::new("https://youtu.be/xyz", SourceKind::YouTube);
//! if let Some(downloader) = registry.get(job.source_kind) {
//!     let metadata = downloader.download(&job).await?;
//!     println!("{:?}", metadata.track_name);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod process;
mod spotdl;
mod ytdlp;

pub use error::DownloadError;
pub use process::{ToolOutput, run_tool};
pub use spotdl::{SpotdlDownloader, parse_spotdl_output};
pub use ytdlp::{YtDlpDownloader, parse_print_output};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::DownloaderConfig;
use crate::queue::{Job, TrackMetadata};
use crate::source::SourceKind;

/// Strategy that fulfils one job by driving an external process.
///
/// Implementations must not panic on bad input; every failure is reported as
/// a [`DownloadError`] whose message becomes the job's error text.
#[async_trait]
pub trait Downloader: Send + Sync + fmt::Debug {
    /// The source kind this adapter handles.
    fn kind(&self) -> SourceKind;

    /// Downloads the job's URL, returning best-effort metadata on success.
    async fn download(&self, job: &Job) -> Result<TrackMetadata, DownloadError>;
}

/// Lookup from source kind to adapter.
#[derive(Debug, Clone, Default)]
pub struct DownloaderRegistry {
    downloaders: HashMap<SourceKind, Arc<dyn Downloader>>,
}

impl DownloaderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its own [`Downloader::kind`], replacing any
    /// previous adapter for that kind.
    pub fn register(&mut self, downloader: Arc<dyn Downloader>) {
        let kind = downloader.kind();
        debug!(%kind, ?downloader, "Registering downloader");
        self.downloaders.insert(kind, downloader);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.register(downloader);
        self
    }

    /// Returns the adapter for `kind`, if one is registered.
    #[must_use]
    pub fn get(&self, kind: SourceKind) -> Option<Arc<dyn Downloader>> {
        self.downloaders.get(&kind).cloned()
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.downloaders.len()
    }

    /// Returns true if no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.downloaders.is_empty()
    }
}

/// Builds the registry used in production: spotdl for Spotify, yt-dlp for YouTube.
#[must_use]
pub fn build_default_registry(config: &DownloaderConfig) -> DownloaderRegistry {
    DownloaderRegistry::new()
        .with(Arc::new(SpotdlDownloader::from_config(config)))
        .with(Arc::new(YtDlpDownloader::from_config(config)))
}
