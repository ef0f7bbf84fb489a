// Register application subcommands.
// Each module corresponds to a specific `katalon-launcher` command-line action.

use crate::cli::cmd_enums::SourceOptions;
use crate::libs::package_cache::PackageCache;
use anyhow::Context;

// Runs Katalon Studio as a build step.
pub mod execute;
// Installs a version into the package cache.
pub mod install;
// Lists cached versions.
pub mod list;
// Deletes a cached version.
pub mod remove;
// Shows which manifest entry a version resolves to.
pub mod resolve;
// Displays the launcher version.
pub mod version;

/// The package cache selected by `--cache-dir`, or `~/.katalon`.
pub(crate) fn open_cache(sources: &SourceOptions) -> anyhow::Result<PackageCache> {
    match &sources.cache_dir {
        Some(dir) => Ok(PackageCache::new(dir)),
        None => PackageCache::in_home_dir().context("Cannot locate the Katalon Studio package cache"),
    }
}
