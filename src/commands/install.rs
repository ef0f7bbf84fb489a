// `katalon-launcher install`: warm the package cache ahead of a build,
// e.g. while baking a CI agent image.

use crate::cli::cmd_enums::SourceOptions;
use crate::commands::open_cache;
use crate::libs::host::ConsoleListener;
use crate::libs::orchestrator::KatalonRunner;
use crate::libs::utilities::download::HttpTransport;
use anyhow::Context;

/// Installs `version` if needed and prints its package root on stdout.
pub fn run(version: &str, sources: &SourceOptions) -> anyhow::Result<()> {
    let listener = ConsoleListener;
    let transport = HttpTransport::new();
    let runner = KatalonRunner::new(&listener, &transport, open_cache(sources)?, &sources.manifest_url);

    let package_root = runner
        .ensure_package(version)
        .with_context(|| format!("Cannot install Katalon Studio {version}"))?;

    println!("{}", package_root.display());
    Ok(())
}
