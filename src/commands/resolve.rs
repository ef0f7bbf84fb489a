// `katalon-launcher resolve`: show which package a version maps to
// without downloading it.

use crate::cli::cmd_enums::SourceOptions;
use crate::libs::archive_installer::ArchiveInstaller;
use crate::libs::host::ConsoleListener;
use crate::libs::utilities::download::HttpTransport;
use crate::libs::utilities::platform::detect_os;
use anyhow::Context;

/// Prints the manifest entry for `version` on `os` (default: this machine) as JSON.
pub fn run(version: &str, os: Option<&str>, sources: &SourceOptions) -> anyhow::Result<()> {
    let listener = ConsoleListener;
    let transport = HttpTransport::new();
    let os = match os {
        Some(os) => os.to_string(),
        None => detect_os(&listener),
    };

    let release = ArchiveInstaller::new(&listener, &transport, sources.manifest_url.as_str())
        .resolve(version, &os)
        .with_context(|| format!("Cannot resolve Katalon Studio {version}"))?;

    println!("{}", serde_json::to_string_pretty(&release)?);
    Ok(())
}
