//! # Manifest Resolver
//!
//! Fetches the published list of Katalon Studio releases and picks the
//! package for a (version, OS) pair. The manifest is fetched fresh on
//! every call; nothing is cached between resolutions.

use crate::libs::errors::{LauncherError, Result};
use crate::libs::host::BuildListener;
use crate::libs::utilities::download::Transport;
use crate::log_debug;
use crate::schemas::release::{ReleaseEntry, ResolvedRelease};
use colored::Colorize;

/// Where Katalon publishes its release list.
pub const RELEASES_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/katalon-studio/katalon-studio/master/releases.json";

/// Downloads and parses the release list at `url`.
pub fn fetch_manifest(transport: &dyn Transport, url: &str) -> Result<Vec<ReleaseEntry>> {
    let reader = transport.open(url)?;
    serde_json::from_reader(reader).map_err(|source| {
        if source.is_io() {
            LauncherError::Transport {
                url: url.to_string(),
                reason: source.to_string(),
            }
        } else {
            LauncherError::Manifest {
                url: url.to_string(),
                source,
            }
        }
    })
}

/// The first entry, in manifest order, published for `version` on `os`.
/// Later duplicates are ignored.
pub fn select_release(entries: &[ReleaseEntry], version: &str, os: &str) -> Option<ResolvedRelease> {
    entries
        .iter()
        .find(|entry| entry.matches(version, os))
        .map(ResolvedRelease::from)
}

/// Fetches the manifest and selects the package for `version` on `os`.
///
/// # Returns
/// * `Ok(None)` when the manifest has no such package. Callers treat that
///   as final: the same manifest will not grow the entry on a retry.
pub fn resolve_release(
    transport: &dyn Transport,
    listener: &dyn BuildListener,
    manifest_url: &str,
    version: &str,
    os: &str,
) -> Result<Option<ResolvedRelease>> {
    listener.log(&format!(
        "Retrieve Katalon Studio version: {version}, OS: {os}"
    ));

    let entries = fetch_manifest(transport, manifest_url)?;
    listener.log(&format!("Number of releases: {}", entries.len()));

    let release = select_release(&entries, version, os);
    match &release {
        Some(release) => {
            log_debug!(
                "[Manifest] Matched {} (containing folder '{}')",
                release.filename.green(),
                release.containing_folder
            );
            listener.log(&format!("Katalon Studio is hosted at {}.", release.url));
        }
        None => log_debug!(
            "[Manifest] No entry for version '{}' on OS '{}'",
            version.yellow(),
            os.yellow()
        ),
    }
    Ok(release)
}
