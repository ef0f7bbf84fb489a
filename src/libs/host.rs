// The narrow interface between the launcher and whatever hosts the build step.
// The pipeline only ever needs a place to send log lines; the entry point
// additionally reads the step parameters. Both are injected, never global.

use crate::log_info;
use crate::schemas::step_config::StepConfig;

/// The build log. Every significant pipeline step, and every line the
/// Katalon process prints, becomes one `log` call.
pub trait BuildListener {
    fn log(&self, line: &str);
}

/// A build host: a log sink plus the parameters of the step being run.
pub trait BuildHost: BuildListener {
    fn config(&self) -> &StepConfig;
}

/// Host used by the CLI: log lines go to the console through `log_info!`.
pub struct ConsoleHost {
    config: StepConfig,
}

impl ConsoleHost {
    pub fn new(config: StepConfig) -> Self {
        ConsoleHost { config }
    }
}

impl BuildListener for ConsoleHost {
    fn log(&self, line: &str) {
        log_info!("{}", line);
    }
}

impl BuildHost for ConsoleHost {
    fn config(&self) -> &StepConfig {
        &self.config
    }
}

/// A listener for commands that have no step parameters (`install`, `resolve`).
pub struct ConsoleListener;

impl BuildListener for ConsoleListener {
    fn log(&self, line: &str) {
        log_info!("{}", line);
    }
}
