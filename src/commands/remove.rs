// `katalon-launcher remove`: drop one version from the package cache.

use crate::cli::cmd_enums::SourceOptions;
use crate::commands::open_cache;
use crate::{log_info, log_warn};
use colored::Colorize;

pub fn run(version: &str, sources: &SourceOptions) -> anyhow::Result<()> {
    let cache = open_cache(sources)?;
    if cache.remove(version)? {
        log_info!("Removed Katalon Studio {} from {}", version.green(), cache.root().display());
    } else {
        log_warn!("Katalon Studio {} is not in {}", version.yellow(), cache.root().display());
    }
    Ok(())
}
