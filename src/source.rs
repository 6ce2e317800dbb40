//! Source classification for submitted URLs.
//!
//! A URL is routed to a downloader purely by its host. Anything that is not a
//! recognized Spotify or YouTube host is "unknown" and never enters the queue.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

/// Origin platform of a queued URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `open.spotify.com` track, album or playlist links (handled by spotdl).
    Spotify,
    /// `youtube.com`, `music.youtube.com` and `youtu.be` links (handled by yt-dlp).
    #[serde(rename = "youtube")]
    YouTube,
}

impl SourceKind {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::YouTube => "youtube",
        }
    }

    /// Display name shown for a freshly added job before any metadata is known.
    #[must_use]
    pub fn placeholder_track_name(&self) -> &'static str {
        match self {
            Self::Spotify => "Spotify Track",
            Self::YouTube => "YouTube Video",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const SPOTIFY_HOST: &str = "open.spotify.com";
const YOUTUBE_DOMAIN: &str = "youtube.com";
const YOUTUBE_SHORT_HOST: &str = "youtu.be";

/// Maps a URL to its [`SourceKind`], or `None` when the host is not supported.
///
/// Input without a scheme (`youtu.be/abc`) is treated as `https://`.
///
/// # Examples
///
/// ```
/// use audio_downloader_core::{SourceKind, classify_url};
///
/// assert_eq!(classify_url("https://youtu.be/xyz"), Some(SourceKind::YouTube));
/// assert_eq!(classify_url("not-a-url"), None);
/// ```
#[must_use]
pub fn classify_url(input: &str) -> Option<SourceKind> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let parsed = Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .or_else(|| {
            if input.contains("://") {
                None
            } else {
                Url::parse(&format!("https://{input}")).ok()
            }
        })?;

    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    trace!(host, "classifying url host");

    if host == SPOTIFY_HOST {
        Some(SourceKind::Spotify)
    } else if host == YOUTUBE_SHORT_HOST
        || host == YOUTUBE_DOMAIN
        || host.ends_with(&format!(".{YOUTUBE_DOMAIN}"))
    {
        Some(SourceKind::YouTube)
    } else {
        None
    }
}
