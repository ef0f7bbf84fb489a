// This file implements the launcher's console logging.
// It provides leveled macros (INFO, WARN, ERROR, DEBUG) with colored tags,
// and a process-wide switch that decides whether DEBUG lines are printed.
// Everything goes to stderr so stdout stays free for command results
// (`install` prints the package root, `resolve` prints JSON).

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

// `log_info!` for build-step progress and subprocess output.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        use colored::Colorize as _;
        eprintln!("{} {}", "[INFO]".bright_green(), format!($($arg)*))
    }};
}

// `log_warn!` for recoverable conditions, like a failed chmod.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        use colored::Colorize as _;
        eprintln!("{} {}", "[WARN]".bright_yellow(), format!($($arg)*))
    }};
}

// `log_error!` for failures that end the build step.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        use colored::Colorize as _;
        eprintln!("{} {}", "[ERROR]".bright_red(), format!($($arg)*))
    }};
}

// `log_debug!` for internal tracing. Only printed after `init(true)`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
            use colored::Colorize as _;
            eprintln!("{} {}", "[DEBUG]".dimmed(), format!($($arg)*));
        }
    };
}

static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Sets the global debug switch. Called once from `main` with the `--debug` flag.
pub fn init(debug: bool) {
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug))
        .store(debug, Ordering::Relaxed);

    log_debug!("Logger initialized in DEBUG mode");
}

/// Whether `log_debug!` lines are printed. `false` until `init` runs.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}
