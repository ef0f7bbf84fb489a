// The resolve / fetch / install / launch pipeline.

// Downloads and unpacks a package into a directory.
pub mod archive_installer;
// Error type shared by the whole pipeline.
pub mod errors;
// The build host interface (log sink and step parameters).
pub mod host;
// Spawns Katalon Studio and streams its output.
pub mod launcher;
// Fetches the release manifest and picks an entry.
pub mod manifest;
// The build step entry point.
pub mod orchestrator;
// The per-version install cache under `~/.katalon`.
pub mod package_cache;
// Platform, compression, download and command-line helpers.
pub mod utilities;
