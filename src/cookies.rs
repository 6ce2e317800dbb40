//! Cookie file upload and status.
//!
//! The downloaders only check whether the file exists; its contents are passed
//! through to the external tools untouched.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors produced while storing or inspecting the cookie file.
#[derive(Debug, Error)]
pub enum CookieError {
    /// I/O error reading or writing the cookie file.
    #[error("I/O error on cookie file {path}: {source}")]
    Io {
        /// Cookie file path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl CookieError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Presence, size and modification time of the cookie file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieStatus {
    /// Whether the file exists.
    pub exists: bool,
    /// Size in bytes (0 when missing).
    pub size: u64,
    /// Last modification time, when known.
    pub modified: Option<DateTime<Utc>>,
}

/// Reports on the cookie file at `path`. A missing file is not an error.
///
/// # Errors
///
/// Returns [`CookieError::Io`] if the file exists but its metadata cannot be read.
pub fn cookie_status(path: &Path) -> Result<CookieStatus, CookieError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(CookieStatus {
            exists: true,
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(CookieStatus {
            exists: false,
            size: 0,
            modified: None,
        }),
        Err(err) => Err(CookieError::io(path, err)),
    }
}

/// Writes `contents` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`CookieError::Io`] if the directory or file cannot be written.
#[instrument(skip(contents), fields(path = %path.display(), bytes = contents.len()))]
pub fn save_cookie_file(path: &Path, contents: &[u8]) -> Result<(), CookieError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| CookieError::io(parent, err))?;
    }
    std::fs::write(path, contents).map_err(|err| CookieError::io(path, err))?;
    info!("Cookie file saved");
    Ok(())
}
