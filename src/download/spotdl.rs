//! Spotify downloads via `spotdl`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};

use super::process::run_tool;
use super::{DownloadError, Downloader};
use crate::config::DownloaderConfig;
use crate::queue::{Job, TrackMetadata};
use crate::source::SourceKind;

/// Tag used in error messages.
const TOOL: &str = "SpotDL";

/// Matches spotdl progress lines such as
/// `Downloaded "Artist - Title": https://music.youtube.com/watch?v=...`.
#[allow(clippy::expect_used)]
static PROGRESS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:Downloaded|Downloading)\s+(?:"(?P<quoted>[^"]+)"|(?P<bare>.+?))(?::\s+https?://\S+)?\s*$"#,
    )
    .expect("spotdl progress regex is valid") // Static pattern, safe to panic
});

/// Downloads Spotify links with `spotdl`, tagging tracks with lyrics.
#[derive(Debug, Clone)]
pub struct SpotdlDownloader {
    program: PathBuf,
    music_dir: PathBuf,
    cookie_file: PathBuf,
    timeout: Duration,
}

impl SpotdlDownloader {
    /// Creates a downloader from the shared configuration.
    #[must_use]
    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self {
            program: config.spotdl_program.clone(),
            music_dir: config.music_dir.clone(),
            cookie_file: config.cookie_file(),
            timeout: config.job_timeout,
        }
    }

    /// Builds the spotdl argument list for `url`.
    ///
    /// The cookie flag is only added when a cookie file is supplied.
    #[must_use]
    pub fn build_args(&self, url: &str, cookie_file: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(12);
        if let Some(cookie_file) = cookie_file {
            args.push("--cookie-file".into());
            args.push(cookie_file.into());
        }
        args.extend(
            ["--format", "m4a", "--bitrate", "auto", "--lyrics", "genius"]
                .into_iter()
                .map(OsString::from),
        );
        args.push("--output".into());
        args.push(self.music_dir.clone().into());
        args.push(url.into());
        args
    }
}

#[async_trait]
impl Downloader for SpotdlDownloader {
    fn kind(&self) -> SourceKind {
        SourceKind::Spotify
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, url = %job.url))]
    async fn download(&self, job: &Job) -> Result<TrackMetadata, DownloadError> {
        let cookie_file = self.cookie_file.is_file().then_some(self.cookie_file.as_path());
        debug!(authenticated = cookie_file.is_some(), "starting spotdl");

        let args = self.build_args(&job.url, cookie_file);
        let output = run_tool(TOOL, &self.program, &args, self.timeout)
            .await?
            .check(TOOL)?;

        let metadata = parse_spotdl_output(&output.stdout);
        debug!(?metadata, "scraped spotdl output");
        Ok(metadata)
    }
}

/// Extracts artist and title from the first recognizable progress line.
///
/// Returns empty metadata when nothing matches.
#[must_use]
pub fn parse_spotdl_output(stdout: &str) -> TrackMetadata {
    stdout
        .lines()
        .filter_map(|line| PROGRESS_LINE.captures(line))
        .filter_map(|caps| {
            let song = caps.name("quoted").or_else(|| caps.name("bare"))?.as_str();
            let (artist, title) = song.split_once(" - ")?;
            Some(TrackMetadata::new(
                Some(artist.trim().to_string()),
                Some(title.trim().to_string()),
            ))
        })
        .find(|metadata| !metadata.is_empty())
        .unwrap_or_default()
}
