// `katalon-launcher list`: show what the package cache holds.

use crate::cli::cmd_enums::SourceOptions;
use crate::commands::open_cache;
use crate::libs::package_cache::CachedVersion;
use crate::log_info;
use colored::Colorize;
use std::cmp::Ordering;

/// Prints one line per cached version, oldest first.
pub fn run(sources: &SourceOptions) -> anyhow::Result<()> {
    let cache = open_cache(sources)?;
    let mut versions = cache.cached_versions()?;

    if versions.is_empty() {
        log_info!("No Katalon Studio versions cached in {}", cache.root().display());
        return Ok(());
    }

    versions.sort_by(compare_versions);
    for cached in &versions {
        let state = if cached.complete {
            "complete".green()
        } else {
            "incomplete".yellow()
        };
        let installed_at = cached.installed_at.as_deref().unwrap_or("-");
        println!(
            "{:<12} {:<10} {:<32} {}",
            cached.version.bold(),
            state,
            installed_at.dimmed(),
            cached.path.display()
        );
    }
    Ok(())
}

/// Semantic versions sort numerically and before anything else, which sorts by name.
fn compare_versions(a: &CachedVersion, b: &CachedVersion) -> Ordering {
    match (semver::Version::parse(&a.version), semver::Version::parse(&b.version)) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.version.cmp(&b.version),
    }
}
