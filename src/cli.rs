//! CLI argument definitions using clap derive macros.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use audio_downloader_core::DownloaderConfig;
use audio_downloader_core::config::{
    DEFAULT_CONFIG_DIR, DEFAULT_METADATA_TIMEOUT, DEFAULT_MUSIC_DIR, DEFAULT_SPOTDL_PROGRAM,
    DEFAULT_YTDLP_PROGRAM,
};

/// Queue Spotify and YouTube links and download them as tagged audio.
///
/// Starts an HTTP server accepting links and a background worker that runs
/// spotdl or yt-dlp for one link at a time.
#[derive(Parser, Debug)]
#[command(name = "audio-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address the HTTP server listens on
    #[arg(short = 'b', long, default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Directory holding cookies.txt
    #[arg(long, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Directory downloaded audio is written to
    #[arg(short = 'o', long, default_value = DEFAULT_MUSIC_DIR)]
    pub music_dir: PathBuf,

    /// Front-end directory served for unmatched paths
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Worker sleep between polls of an empty queue, in milliseconds (10-60000)
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u64).range(10..=60000))]
    pub poll_interval_ms: u64,

    /// Per-download timeout in seconds (1-86400)
    #[arg(short = 't', long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..=86400))]
    pub job_timeout_secs: u64,

    /// spotdl executable
    #[arg(long, default_value = DEFAULT_SPOTDL_PROGRAM)]
    pub spotdl_bin: PathBuf,

    /// yt-dlp executable
    #[arg(long, default_value = DEFAULT_YTDLP_PROGRAM)]
    pub ytdlp_bin: PathBuf,
}

impl Args {
    /// Log level used when `RUST_LOG` is not set.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Converts the parsed flags into the library configuration.
    #[must_use]
    pub fn downloader_config(&self) -> DownloaderConfig {
        DownloaderConfig {
            config_dir: self.config_dir.clone(),
            music_dir: self.music_dir.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            job_timeout: Duration::from_secs(self.job_timeout_secs),
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            spotdl_program: self.spotdl_bin.clone(),
            ytdlp_program: self.ytdlp_bin.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["audio-downloader"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.bind, "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(args.poll_interval_ms, 2000);
        assert_eq!(args.job_timeout_secs, 600);
        assert_eq!(args.downloader_config(), DownloaderConfig::default());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["audio-downloader", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.default_log_level(), "trace");
    }

    #[test]
    fn test_cli_quiet_wins_over_verbose() {
        let args = Args::try_parse_from(["audio-downloader", "-q", "-v"]).unwrap();
        assert_eq!(args.default_log_level(), "error");
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["audio-downloader", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_paths_and_timeouts_flow_into_config() {
        let args = Args::try_parse_from([
            "audio-downloader",
            "--config-dir",
            "/tmp/cfg",
            "-o",
            "/tmp/music",
            "--poll-interval-ms",
            "50",
            "-t",
            "30",
            "--ytdlp-bin",
            "/usr/local/bin/yt-dlp",
        ])
        .unwrap();
        let config = args.downloader_config();
        assert_eq!(config.cookie_file(), PathBuf::from("/tmp/cfg/cookies.txt"));
        assert_eq!(config.music_dir, PathBuf::from("/tmp/music"));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.job_timeout, Duration::from_secs(30));
        assert_eq!(config.ytdlp_program, PathBuf::from("/usr/local/bin/yt-dlp"));
    }

    #[test]
    fn test_cli_job_timeout_zero_rejected() {
        let err = Args::try_parse_from(["audio-downloader", "-t", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_invalid_bind_rejected() {
        let err = Args::try_parse_from(["audio-downloader", "--bind", "nope"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
