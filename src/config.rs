//! Runtime configuration shared by the worker, the downloaders and the API.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory holding the uploaded cookie file.
pub const DEFAULT_CONFIG_DIR: &str = "/config";

/// Default directory downloads are written to.
pub const DEFAULT_MUSIC_DIR: &str = "/music";

/// Cookie file name inside the config directory.
pub const COOKIE_FILE_NAME: &str = "cookies.txt";

/// How long the worker sleeps when no job is waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wall-clock limit for one download (10 minutes).
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(600);

/// Wall-clock limit for the post-download metadata query.
pub const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(30);

/// Default spotdl executable, resolved through `PATH`.
pub const DEFAULT_SPOTDL_PROGRAM: &str = "spotdl";

/// Default yt-dlp executable, resolved through `PATH`.
pub const DEFAULT_YTDLP_PROGRAM: &str = "yt-dlp";

/// Downloader configuration.
///
/// [`Default`] yields the production policy values; tests shrink the
/// intervals and point the programs at fake executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    /// Directory holding `cookies.txt`.
    pub config_dir: PathBuf,
    /// Directory downloaded audio is written to.
    pub music_dir: PathBuf,
    /// Worker idle sleep between queue polls.
    pub poll_interval: Duration,
    /// Per-job download timeout.
    pub job_timeout: Duration,
    /// Timeout for the follow-up metadata query.
    pub metadata_timeout: Duration,
    /// spotdl executable.
    pub spotdl_program: PathBuf,
    /// yt-dlp executable.
    pub ytdlp_program: PathBuf,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            music_dir: PathBuf::from(DEFAULT_MUSIC_DIR),
            poll_interval: DEFAULT_POLL_INTERVAL,
            job_timeout: DEFAULT_JOB_TIMEOUT,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            spotdl_program: PathBuf::from(DEFAULT_SPOTDL_PROGRAM),
            ytdlp_program: PathBuf::from(DEFAULT_YTDLP_PROGRAM),
        }
    }
}

impl DownloaderConfig {
    /// Path of the cookie file, whether or not it exists.
    #[must_use]
    pub fn cookie_file(&self) -> PathBuf {
        self.config_dir.join(COOKIE_FILE_NAME)
    }

    /// Cookie file path, only if the file is present on disk.
    #[must_use]
    pub fn existing_cookie_file(&self) -> Option<PathBuf> {
        let path = self.cookie_file();
        path.is_file().then_some(path)
    }

    /// Creates the config and music directories if missing.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if a directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.config_dir, &self.music_dir] {
            create_dir(dir)?;
        }
        Ok(())
    }
}

fn create_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        tracing::info!(dir = %dir.display(), "Created directory");
    }
    Ok(())
}
