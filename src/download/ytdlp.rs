//! YouTube downloads via `yt-dlp`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::process::run_tool;
use super::{DownloadError, Downloader};
use crate::config::DownloaderConfig;
use crate::queue::{Job, TrackMetadata};
use crate::source::SourceKind;

/// Tag used in error messages.
const TOOL: &str = "YT-DLP";

/// Output template; files land as `Artist - Title.m4a`.
const OUTPUT_TEMPLATE: &str = "%(artist)s - %(title)s.%(ext)s";

/// yt-dlp prints this for fields the extractor did not provide.
const MISSING_FIELD: &str = "NA";

/// Downloads YouTube links with `yt-dlp` as m4a with embedded metadata and art.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    program: PathBuf,
    music_dir: PathBuf,
    cookie_file: PathBuf,
    timeout: Duration,
    metadata_timeout: Duration,
}

impl YtDlpDownloader {
    /// Creates a downloader from the shared configuration.
    #[must_use]
    pub fn from_config(config: &DownloaderConfig) -> Self {
        Self {
            program: config.ytdlp_program.clone(),
            music_dir: config.music_dir.clone(),
            cookie_file: config.cookie_file(),
            timeout: config.job_timeout,
            metadata_timeout: config.metadata_timeout,
        }
    }

    /// Builds the download argument list for `url`.
    #[must_use]
    pub fn build_args(&self, url: &str, cookie_file: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-f",
            "140",
            "--embed-metadata",
            "--embed-thumbnail",
            "--add-metadata",
            "--metadata-from-title",
            "%(artist)s - %(title)s",
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(self.music_dir.join(OUTPUT_TEMPLATE).into());
        args.push(url.into());
        push_cookies(&mut args, cookie_file);
        args
    }

    /// Builds the metadata query argument list for `url`.
    ///
    /// Prints artist, title and uploader, one per line.
    #[must_use]
    pub fn build_info_args(&self, url: &str, cookie_file: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--print",
            "%(artist)s",
            "--print",
            "%(title)s",
            "--print",
            "%(uploader)s",
            "--quiet",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(url.into());
        push_cookies(&mut args, cookie_file);
        args
    }

    async fn query_metadata(&self, url: &str, cookie_file: Option<&Path>) -> TrackMetadata {
        let args = self.build_info_args(url, cookie_file);
        match run_tool(TOOL, &self.program, &args, self.metadata_timeout)
            .await
            .and_then(|output| output.check(TOOL))
        {
            Ok(output) => parse_print_output(&output.stdout),
            Err(error) => {
                debug!(%error, "metadata query failed, keeping placeholders");
                TrackMetadata::default()
            }
        }
    }
}

fn push_cookies(args: &mut Vec<OsString>, cookie_file: Option<&Path>) {
    if let Some(cookie_file) = cookie_file {
        args.push("--cookies".into());
        args.push(cookie_file.into());
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    fn kind(&self) -> SourceKind {
        SourceKind::YouTube
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, url = %job.url))]
    async fn download(&self, job: &Job) -> Result<TrackMetadata, DownloadError> {
        let cookie_file = self.cookie_file.is_file().then_some(self.cookie_file.as_path());
        debug!(authenticated = cookie_file.is_some(), "starting yt-dlp");

        let args = self.build_args(&job.url, cookie_file);
        run_tool(TOOL, &self.program, &args, self.timeout)
            .await?
            .check(TOOL)?;

        let metadata = self.query_metadata(&job.url, cookie_file).await;
        debug!(?metadata, "queried yt-dlp metadata");
        Ok(metadata)
    }
}

/// Parses the output of `--print %(artist)s --print %(title)s --print %(uploader)s`.
///
/// A single line is taken as the title. The uploader stands in for a missing
/// artist.
#[must_use]
pub fn parse_print_output(stdout: &str) -> TrackMetadata {
    let mut lines = stdout.trim().lines().map(|line| {
        let line = line.trim();
        (line != MISSING_FIELD && !line.is_empty()).then(|| line.to_string())
    });

    match (lines.next(), lines.next(), lines.next()) {
        (Some(title), None, None) => TrackMetadata::new(None, title),
        (artist, title, uploader) => {
            TrackMetadata::new(artist.flatten().or(uploader.flatten()), title.flatten())
        }
    }
}
