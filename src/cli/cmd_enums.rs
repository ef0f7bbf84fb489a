use crate::libs::manifest::RELEASES_MANIFEST_URL;
use crate::schemas::step_config::StepConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Defines the command-line interface (CLI) for 'katalon-launcher'.
/// `#[derive(Parser)]` automatically generates argument parsing code via `clap`.
#[derive(Parser)]
#[command(name = "katalon-launcher")]
#[command(about = "Fetch, cache and run Katalon Studio from a build step", long_about = None)]
pub struct Cli {
    /// Enables detailed debug output for troubleshooting.
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    #[command(flatten)]
    pub(crate) sources: SourceOptions,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Where releases are looked up and where packages are cached.
#[derive(Args, Debug, Clone)]
pub struct SourceOptions {
    /// URL of the Katalon Studio release manifest.
    #[arg(long, global = true, env = "KATALON_RELEASES_URL", default_value = RELEASES_MANIFEST_URL)]
    pub(crate) manifest_url: String,

    /// Package cache directory (defaults to ~/.katalon).
    #[arg(long, global = true, env = "KATALON_CACHE_DIR")]
    pub(crate) cache_dir: Option<PathBuf>,
}

/// Enumerates all supported subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Runs Katalon Studio in console mode, downloading it first if needed.
    /// Exits 0 only when Katalon Studio itself exits 0.
    Execute(ExecuteArgs),
    /// Downloads and unpacks a version into the cache, then prints its package root.
    Install {
        /// Katalon Studio version (e.g. "7.0.0").
        #[arg(long = "version", env = "KATALON_VERSION")]
        version: String,
    },
    /// Prints the manifest entry a version resolves to, as JSON.
    Resolve {
        /// Katalon Studio version (e.g. "7.0.0").
        #[arg(long = "version", env = "KATALON_VERSION")]
        version: String,
        /// OS label to resolve for (e.g. "linux", "windows 64", "macos (app)").
        /// Defaults to the running machine.
        #[arg(long)]
        os: Option<String>,
    },
    /// Lists the versions in the package cache.
    List,
    /// Deletes one version from the package cache.
    Remove {
        /// Katalon Studio version to delete.
        #[arg(long = "version")]
        version: String,
    },
    /// Shows the launcher's own version.
    Version,
}

/// Parameters of the `execute` build step.
#[derive(Args, Debug, Clone)]
pub struct ExecuteArgs {
    /// Katalon Studio version to use (e.g. "7.0.0").
    #[arg(long = "version", env = "KATALON_VERSION")]
    pub(crate) version: String,

    /// Pre-installed Katalon Studio package root. Skips the download when set.
    #[arg(long, env = "KATALON_LOCATION")]
    pub(crate) location: Option<String>,

    /// Katalon project (.prj file or its folder).
    #[arg(long, env = "KATALON_PROJECT_PATH")]
    pub(crate) project_path: String,

    /// Extra Katalon Studio arguments, e.g. '-retry=0 -testSuitePath="Test Suites/Smoke"'.
    /// On Unix they are passed without a shell, so `$VAR` references are not expanded.
    #[arg(long = "args", env = "KATALON_EXECUTE_ARGS", default_value = "", allow_hyphen_values = true)]
    pub(crate) execute_args: String,

    /// X display for headless Unix agents (e.g. ":99").
    #[arg(long, env = "KATALON_X11_DISPLAY")]
    pub(crate) x11_display: Option<String>,

    /// Options for xvfb-run (e.g. '-a -s "-screen 0 1024x768x24"').
    #[arg(long, env = "KATALON_XVFB_CONFIGURATION", allow_hyphen_values = true)]
    pub(crate) xvfb_configuration: Option<String>,
}

impl From<ExecuteArgs> for StepConfig {
    fn from(args: ExecuteArgs) -> Self {
        StepConfig {
            version: args.version,
            location: args.location,
            project_path: args.project_path,
            execute_args: args.execute_args,
            x11_display: args.x11_display,
            xvfb_configuration: args.xvfb_configuration,
        }
    }
}
