//! # Package Cache
//!
//! Keeps one unpacked Katalon Studio package per version under
//! `~/.katalon/<version>/`. A zero-trust rule applies to everything in a
//! version directory except the `.katalon.done` marker: when the marker
//! exists the directory is used as-is, when it does not the whole directory
//! is wiped and installed again.
//!
//! ```text
//! ~/.katalon/
//! ├── 7.0.0/
//! │   ├── .katalon.done
//! │   └── Katalon_Studio_Linux_64-7.0.0/
//! └── 7.2.1/                      <- no marker: wiped on next use
//!     └── Katalon_Studio_Lin...
//! ```
//!
//! Two processes installing the same version at the same time are not
//! coordinated; the build executor is expected to run one step at a time.

use crate::libs::errors::{LauncherError, Result};
use crate::libs::host::BuildListener;
use crate::log_debug;
use chrono::Local;
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory under the user's home holding all cached versions.
pub const CACHE_DIR_NAME: &str = ".katalon";
/// Marker whose presence means a version directory is completely installed.
pub const MARKER_FILE_NAME: &str = ".katalon.done";
/// Substring identifying the package root among a version directory's children.
pub const PACKAGE_DIR_NEEDLE: &str = "Katalon";

/// One version directory found in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedVersion {
    pub version: String,
    pub path: PathBuf,
    /// Whether the completion marker is present.
    pub complete: bool,
    /// Install time recorded in the marker, when it has one.
    pub installed_at: Option<String>,
}

/// The on-disk cache of unpacked packages.
#[derive(Debug, Clone)]
pub struct PackageCache {
    root: PathBuf,
}

impl PackageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageCache { root: root.into() }
    }

    /// The default cache, `~/.katalon`.
    pub fn in_home_dir() -> Result<Self> {
        let home = dirs::home_dir().ok_or(LauncherError::HomeDirectory)?;
        Ok(Self::new(home.join(CACHE_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<version>`, after checking `version` is a plain directory name.
    pub fn version_dir(&self, version: &str) -> Result<PathBuf> {
        validate_version(version)?;
        Ok(self.root.join(version))
    }

    fn marker_path(version_dir: &Path) -> PathBuf {
        version_dir.join(MARKER_FILE_NAME)
    }

    /// Makes sure `version` is completely installed and returns its version directory.
    ///
    /// * Marker present: returns at once, `install` is not called.
    /// * Marker absent: deletes the version directory (if any), recreates it
    ///   empty, calls `install` with it, then writes the marker.
    ///
    /// When `install` fails the error is returned as-is and the partial
    /// directory is left behind for inspection; it is wiped on the next call.
    pub fn ensure_installed<F>(&self, listener: &dyn BuildListener, version: &str, install: F) -> Result<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let version_dir = self.version_dir(version)?;
        let marker = Self::marker_path(&version_dir);

        if marker.exists() {
            listener.log("Katalon Studio package has been downloaded already.");
            return Ok(version_dir);
        }

        log_debug!(
            "[Cache] No marker in {}, starting a clean install",
            version_dir.display().to_string().yellow()
        );
        remove_dir_if_present(&version_dir)?;
        fs::create_dir_all(&version_dir).map_err(|e| {
            LauncherError::filesystem("create directory to store Katalon Studio package", &version_dir, e)
        })?;

        install(&version_dir)?;

        fs::write(&marker, Local::now().to_rfc3339())
            .map_err(|e| LauncherError::filesystem("write install marker", &marker, e))?;
        listener.log("Katalon Studio has been installed successfully.");
        Ok(version_dir)
    }

    /// Deletes one version directory. Returns whether there was anything to delete.
    pub fn remove(&self, version: &str) -> Result<bool> {
        let version_dir = self.version_dir(version)?;
        let existed = version_dir.exists();
        remove_dir_if_present(&version_dir)?;
        Ok(existed)
    }

    /// Every version directory in the cache, in directory-listing order.
    pub fn cached_versions(&self) -> Result<Vec<CachedVersion>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(LauncherError::filesystem("read", &self.root, e)),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LauncherError::filesystem("read", &self.root, e))?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let marker = Self::marker_path(&path);
            let installed_at = fs::read_to_string(&marker)
                .ok()
                .map(|stamp| stamp.trim().to_string())
                .filter(|stamp| !stamp.is_empty());
            versions.push(CachedVersion {
                version: entry.file_name().to_string_lossy().into_owned(),
                complete: marker.exists(),
                installed_at,
                path,
            });
        }
        Ok(versions)
    }
}

/// Finds the package root inside a version directory: the child directory
/// whose name contains `Katalon`.
///
/// Archives are expected to hold exactly one such directory. If several
/// exist the first in name order is used.
pub fn locate_package_root(version_dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(version_dir).map_err(|e| LauncherError::filesystem("read", version_dir, e))?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(PACKAGE_DIR_NEEDLE))
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| LauncherError::PackageLayout {
            dir: version_dir.to_path_buf(),
            needle: PACKAGE_DIR_NEEDLE.to_string(),
        })
}

/// Rejects versions that would escape or alias the cache root.
fn validate_version(version: &str) -> Result<()> {
    let trimmed = version.trim();
    if trimmed.is_empty()
        || trimmed != version
        || version == "."
        || version == ".."
        || version.contains(['/', '\\'])
    {
        return Err(LauncherError::InvalidVersion(version.to_string()));
    }
    Ok(())
}

fn remove_dir_if_present(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LauncherError::filesystem("delete", dir, e)),
    }
}
