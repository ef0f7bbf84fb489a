//! # Release Manifest Schema
//!
//! Types for the remote `releases.json` manifest. Each manifest entry
//! names one downloadable Katalon Studio package for one OS:
//!
//! ```json
//! [
//!   {
//!     "version": "7.0.0",
//!     "os": "linux",
//!     "url": "https://download.katalon.com/7.0.0/Katalon_Studio_Linux_64-7.0.0.tar.gz",
//!     "filename": "Katalon_Studio_Linux_64-7.0.0.tar.gz"
//!   }
//! ]
//! ```
//!
//! Unknown fields are ignored. A missing required field fails the whole
//! manifest parse.

use serde::{Deserialize, Serialize};

/// Archive suffixes a package filename may carry, checked in this order.
const ARCHIVE_SUFFIXES: [&str; 2] = [".zip", ".tar.gz"];

/// One entry of the release manifest, exactly as published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    pub version: String,
    /// OS label, matched case-insensitively (e.g. "linux", "windows 64", "macos (app)").
    pub os: String,
    pub url: String,
    pub filename: String,
    /// Top-level folder the archive expands into, when the manifest states it.
    #[serde(rename = "containingFolder", default, skip_serializing_if = "Option::is_none")]
    pub containing_folder: Option<String>,
}

impl ReleaseEntry {
    /// Whether this entry is the package for `version` on `os`.
    pub fn matches(&self, version: &str, os: &str) -> bool {
        self.version == version && self.os.eq_ignore_ascii_case(os)
    }
}

/// A manifest entry selected for this run, with its containing folder settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRelease {
    pub version: String,
    pub os: String,
    pub url: String,
    pub filename: String,
    #[serde(rename = "containingFolder")]
    pub containing_folder: String,
}

impl From<&ReleaseEntry> for ResolvedRelease {
    fn from(entry: &ReleaseEntry) -> Self {
        let containing_folder = entry
            .containing_folder
            .clone()
            .unwrap_or_else(|| derive_folder_name(&entry.filename));

        ResolvedRelease {
            version: entry.version.clone(),
            os: entry.os.clone(),
            url: entry.url.clone(),
            filename: entry.filename.clone(),
            containing_folder,
        }
    }
}

/// Folder name an archive is expected to expand into: the filename with a
/// `.zip` or `.tar.gz` suffix removed. Other filenames come back unchanged.
pub fn derive_folder_name(filename: &str) -> String {
    ARCHIVE_SUFFIXES
        .iter()
        .find_map(|suffix| filename.strip_suffix(suffix))
        .unwrap_or(filename)
        .to_string()
}
