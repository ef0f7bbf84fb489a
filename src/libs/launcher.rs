//! # Process Launcher
//!
//! Spawns the Katalon process the way each OS family needs it and feeds
//! everything it prints into the build log.
//!
//! * **Windows**: `cmd /c <rendered command line>`. Display settings do not
//!   apply and are ignored.
//! * **Unix**: the command line is spawned directly, no shell involved.
//!   A virtual framebuffer configuration prefixes the argv with
//!   `xvfb-run <options>`; an X display becomes the child's `DISPLAY`.
//!
//! Each run gets a fresh `katalon-*` working directory under the system
//! temp dir. It is kept after the run.

use crate::libs::errors::{LauncherError, Result};
use crate::libs::host::BuildListener;
use crate::libs::utilities::command_line::{CommandLine, split_arguments};
use crate::libs::utilities::platform::Platform;
use crate::log_debug;
use crate::schemas::step_config::non_blank;
use colored::Colorize;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

/// Runner used for headless Unix agents.
pub const XVFB_RUN: &str = "xvfb-run";

/// Exactly what will be spawned: argv plus extra environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// Wraps `command` for `platform`.
pub fn build_invocation(
    platform: Platform,
    command: &CommandLine,
    x11_display: Option<&str>,
    xvfb_configuration: Option<&str>,
) -> Invocation {
    if platform == Platform::Windows {
        return Invocation {
            argv: vec!["cmd".to_string(), "/c".to_string(), command.render()],
            env: Vec::new(),
        };
    }

    let mut argv = Vec::new();
    if let Some(options) = non_blank(xvfb_configuration) {
        argv.push(XVFB_RUN.to_string());
        argv.extend(split_arguments(options));
    }
    argv.extend(command.to_argv());

    let env = non_blank(x11_display)
        .map(|display| vec![("DISPLAY".to_string(), display.trim().to_string())])
        .unwrap_or_default();

    Invocation { argv, env }
}

/// Runs `command` on the current platform and waits for it.
///
/// # Returns
/// * `Ok(true)` when the process exits with code 0, `Ok(false)` for any
///   other exit (including death by signal).
/// * `Err` when the working directory cannot be created or the process
///   cannot be started.
pub fn run(
    listener: &dyn BuildListener,
    command: &CommandLine,
    x11_display: Option<&str>,
    xvfb_configuration: Option<&str>,
) -> Result<bool> {
    let invocation = build_invocation(Platform::current(), command, x11_display, xvfb_configuration);
    let working_dir = create_working_dir()?;
    run_invocation(listener, &invocation, &working_dir)
}

/// Spawns `invocation` in `working_dir`, logging its output line by line.
pub fn run_invocation(listener: &dyn BuildListener, invocation: &Invocation, working_dir: &Path) -> Result<bool> {
    let Some((program, args)) = invocation.argv.split_first() else {
        return Err(LauncherError::Spawn {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
        });
    };

    listener.log(&format!(
        "Execute {:?} in {}",
        invocation.argv,
        working_dir.display()
    ));
    for (key, value) in &invocation.env {
        log_debug!("[Launcher] with {}={}", key.cyan(), value);
    }

    let mut child = command_for(program, args)
        .envs(invocation.env.iter().map(|(k, v)| (k, v)))
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| LauncherError::Spawn {
            program: program.clone(),
            source,
        })?;

    // Both pipes are drained on their own thread into one channel, so lines
    // reach the log in the order they arrive and neither pipe can fill up.
    let (sender, receiver) = mpsc::channel::<String>();
    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(forward_lines(stdout, sender.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(forward_lines(stderr, sender.clone()));
    }
    drop(sender);

    for line in receiver {
        listener.log(&line);
    }
    for reader in readers {
        if reader.join().is_err() {
            log_debug!("[Launcher] An output reader thread panicked");
        }
    }

    let status = child.wait()?;
    log_debug!("[Launcher] {} finished with {}", program.bold(), status);
    Ok(status.code() == Some(0))
}

/// `cmd /c <line>` must reach `cmd.exe` untouched: the default Windows
/// argument quoting escapes inner quotes as `\"`, which `cmd` does not
/// understand. `/s` makes `cmd` strip exactly the outer pair added here.
#[cfg(windows)]
fn command_for(program: &str, args: &[String]) -> Command {
    use std::os::windows::process::CommandExt;

    let mut command = Command::new(program);
    match args {
        [flag, line] if program.eq_ignore_ascii_case("cmd") && flag.eq_ignore_ascii_case("/c") => {
            command.arg("/s").arg("/c").raw_arg(format!("\"{line}\""));
        }
        _ => {
            command.args(args);
        }
    }
    command
}

#[cfg(not(windows))]
fn command_for(program: &str, args: &[String]) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    command
}

/// Sends every line of `stream` to `sender` until EOF or a read error.
fn forward_lines<R>(stream: R, sender: mpsc::Sender<String>) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.split(b'\n') {
            let Ok(bytes) = line else { break };
            let text = String::from_utf8_lossy(&bytes);
            if sender.send(text.trim_end_matches('\r').to_string()).is_err() {
                break;
            }
        }
    })
}

/// A new, uniquely named `katalon-*` directory that outlives this process.
fn create_working_dir() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix("katalon-")
        .tempdir()
        .map_err(|e| LauncherError::filesystem("create working directory in", std::env::temp_dir(), e))?;
    Ok(dir.keep())
}
