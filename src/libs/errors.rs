//! Errors raised by the resolve / fetch / install / launch pipeline.
//!
//! Every variant is fatal for the build step. Nothing in the pipeline
//! retries; the caller logs the error and fails the build. A Katalon run
//! that exits nonzero is not an error: it is reported as `Ok(false)`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    /// The manifest has no entry for this version on this OS.
    #[error("Katalon Studio {version} is not published for OS '{os}'")]
    ReleaseNotFound { version: String, os: String },

    /// The manifest or the package could not be fetched.
    #[error("failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The manifest was fetched but is not a valid release list.
    #[error("invalid release manifest at {url}: {source}")]
    Manifest {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The package URL mentions neither `.zip` nor `.tar.gz`.
    #[error("unsupported archive format for {url} (expected .zip or .tar.gz)")]
    UnsupportedArchive { url: String },

    #[error("failed to {action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to extract {}: {reason}", .archive.display())]
    Extraction { archive: PathBuf, reason: String },

    /// Extraction finished but produced no `Katalon*` directory.
    #[error("no directory containing '{needle}' found in {}", .dir.display())]
    PackageLayout { dir: PathBuf, needle: String },

    /// The OS refused to start the process (missing executable, bad permissions).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid version '{0}': must be a plain directory name")]
    InvalidVersion(String),

    #[error("could not determine the user's home directory")]
    HomeDirectory,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LauncherError {
    /// Shorthand for wrapping an `io::Error` that happened on `path`.
    pub fn filesystem(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        LauncherError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
