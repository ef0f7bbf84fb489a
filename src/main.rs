mod cli;
mod commands;
mod libs;
mod logger;
mod schemas;

use clap::Parser;
use cli::cmd_enums::{Cli, Commands};
use commands::{execute, install, list, remove, resolve, version};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.debug);

    let outcome = match cli.command {
        Commands::Execute(args) => execute::run(args.into(), &cli.sources),
        Commands::Install { version } => install::run(&version, &cli.sources).map(|_| true),
        Commands::Resolve { version, os } => resolve::run(&version, os.as_deref(), &cli.sources).map(|_| true),
        Commands::List => list::run(&cli.sources).map(|_| true),
        Commands::Remove { version } => remove::run(&version, &cli.sources).map(|_| true),
        Commands::Version => {
            version::run();
            Ok(true)
        }
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log_error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
