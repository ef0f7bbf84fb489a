//! # Archive Installer
//!
//! Resolves the package for a version, downloads it to a temporary file
//! and unpacks it into a target directory.
//!
//! ## Workflow
//!
//! 1. **Resolve** the manifest entry for (version, detected OS)
//! 2. **Pick** the extraction strategy from the package URL
//! 3. **Download** into a temp file named after the version
//! 4. **Extract** into the target directory
//! 5. **Cleanup**: the temp file is deleted when it goes out of scope,
//!    whether extraction succeeded or not

use crate::libs::errors::{LauncherError, Result};
use crate::libs::host::BuildListener;
use crate::libs::manifest::resolve_release;
use crate::libs::utilities::compression::{ArchiveKind, extract_archive};
use crate::libs::utilities::download::{Transport, download_to};
use crate::libs::utilities::platform::detect_os;
use crate::log_debug;
use crate::schemas::release::ResolvedRelease;
use colored::Colorize;
use std::path::Path;

/// Downloads and unpacks Katalon Studio packages.
pub struct ArchiveInstaller<'a> {
    listener: &'a dyn BuildListener,
    transport: &'a dyn Transport,
    manifest_url: String,
}

impl<'a> ArchiveInstaller<'a> {
    pub fn new(listener: &'a dyn BuildListener, transport: &'a dyn Transport, manifest_url: impl Into<String>) -> Self {
        ArchiveInstaller {
            listener,
            transport,
            manifest_url: manifest_url.into(),
        }
    }

    /// The manifest entry for `version` on `os`, or `ReleaseNotFound`.
    pub fn resolve(&self, version: &str, os: &str) -> Result<ResolvedRelease> {
        resolve_release(self.transport, self.listener, &self.manifest_url, version, os)?.ok_or_else(|| {
            LauncherError::ReleaseNotFound {
                version: version.to_string(),
                os: os.to_string(),
            }
        })
    }

    /// Installs `version` for the running OS into `target_dir`.
    pub fn install(&self, version: &str, target_dir: &Path) -> Result<()> {
        let os = detect_os(self.listener);
        self.install_for_os(version, &os, target_dir)
    }

    /// Installs the `os` package of `version` into `target_dir`, which must exist.
    pub fn install_for_os(&self, version: &str, os: &str, target_dir: &Path) -> Result<()> {
        let release = self.resolve(version, os)?;

        // Checked before downloading: an unknown format would only be thrown away.
        let kind = ArchiveKind::from_url(&release.url).ok_or_else(|| LauncherError::UnsupportedArchive {
            url: release.url.clone(),
        })?;

        self.listener.log(&format!(
            "Downloading Katalon Studio from {}. It may take a few minutes.",
            release.url
        ));

        let mut download = tempfile::Builder::new()
            .prefix(&format!("Katalon-{version}"))
            .tempfile()
            .map_err(|e| LauncherError::filesystem("create temporary file for", std::env::temp_dir(), e))?;
        log_debug!(
            "[Installer] Downloading into {}",
            download.path().display().to_string().dimmed()
        );

        download_to(self.transport, &release.url, download.as_file_mut())?;
        extract_archive(download.path(), target_dir, kind)?;

        log_debug!(
            "[Installer] Unpacked {} into {}",
            release.filename.green(),
            target_dir.display().to_string().cyan()
        );
        Ok(())
    }
}
