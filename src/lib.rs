//! Audio Downloader Core Library
//!
//! This library queues Spotify and YouTube links and downloads them one at a
//! time with external tools (`spotdl`, `yt-dlp`), exposing the queue over a
//! small HTTP API.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`source`] - URL classification into supported source kinds
//! - [`queue`] - In-memory job store and job state machine
//! - [`download`] - Downloader adapters driving external processes
//! - [`worker`] - Single-consumer loop that drains the queue
//! - [`cookies`] - Cookie file upload and status
//! - [`api`] - axum routes over the queue
//! - [`config`] - Paths, timeouts and program names

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod cookies;
pub mod download;
pub mod queue;
pub mod source;
pub mod worker;

// Re-export commonly used types
pub use config::DownloaderConfig;
pub use download::{
    DownloadError, Downloader, DownloaderRegistry, SpotdlDownloader, YtDlpDownloader,
    build_default_registry,
};
pub use queue::{
    Job, JobId, JobStatus, Queue, QueueCounts, QueueError, QueueSnapshot, TrackMetadata,
};
pub use source::{SourceKind, classify_url};
pub use worker::{Worker, WorkerStep};
