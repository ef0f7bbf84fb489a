// This file contains the logic for `katalon-launcher execute`, the build step:
// it resolves Katalon Studio (cache, download, or a given location) and runs it.

use crate::cli::cmd_enums::SourceOptions;
use crate::commands::open_cache;
use crate::libs::host::ConsoleHost;
use crate::libs::orchestrator::execute_build_step;
use crate::libs::utilities::download::HttpTransport;
use crate::schemas::step_config::StepConfig;
use crate::{log_debug, log_error, log_info};
use anyhow::Context;
use colored::Colorize;

/// Runs the build step. `Ok(false)` means Katalon Studio ran and failed.
pub fn run(config: StepConfig, sources: &SourceOptions) -> anyhow::Result<bool> {
    log_debug!("Entered execute::run() with {:?}", config);

    let version = config.version.clone();
    let host = ConsoleHost::new(config);
    let transport = HttpTransport::new();
    let cache = open_cache(sources)?;

    let passed = execute_build_step(&host, &transport, cache, &sources.manifest_url)
        .with_context(|| format!("Cannot run Katalon Studio {version}"))?;

    if passed {
        log_info!("{}", "Katalon Studio execution succeeded".green());
    } else {
        log_error!("Katalon Studio execution failed");
    }
    Ok(passed)
}
