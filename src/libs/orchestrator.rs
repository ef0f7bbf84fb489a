//! # Orchestrator
//!
//! The build step itself: find (or fetch) Katalon Studio, build its
//! command line, run it, and report whether it passed.
//!
//! ## Execution Workflow
//!
//! 1. **Package root**: the override location when one is given, otherwise
//!    the package cache entry for the requested version
//! 2. **Executable**: `<root>/Contents/MacOS/katalon` on macOS,
//!    `<root>/katalon` elsewhere, `.exe` appended when only that exists
//! 3. **Command line**: executable, `-noSplash`, `-runMode=console`,
//!    `-projectPath=<project>` unless the extra arguments carry their own,
//!    then the extra arguments
//! 4. **Launch** through the process launcher

use crate::libs::archive_installer::ArchiveInstaller;
use crate::libs::errors::Result;
use crate::libs::host::{BuildHost, BuildListener};
use crate::libs::launcher;
use crate::libs::package_cache::{PackageCache, locate_package_root};
use crate::libs::utilities::command_line::{CommandLine, split_arguments};
use crate::libs::utilities::download::Transport;
use crate::libs::utilities::platform::detect_os;
use crate::schemas::step_config::StepConfig;
use crate::{log_debug, log_warn};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// File name of the Katalon Studio executable.
pub const EXECUTABLE_NAME: &str = "katalon";
/// Flags every console run gets.
pub const CONSOLE_FLAGS: [&str; 2] = ["-noSplash", "-runMode=console"];
const PROJECT_PATH_FLAG: &str = "-projectPath";

/// Wires the pipeline stages together for one build host.
pub struct KatalonRunner<'a> {
    listener: &'a dyn BuildListener,
    installer: ArchiveInstaller<'a>,
    cache: PackageCache,
}

impl<'a> KatalonRunner<'a> {
    pub fn new(
        listener: &'a dyn BuildListener,
        transport: &'a dyn Transport,
        cache: PackageCache,
        manifest_url: &str,
    ) -> Self {
        KatalonRunner {
            listener,
            installer: ArchiveInstaller::new(listener, transport, manifest_url),
            cache,
        }
    }

    /// Installs `version` if needed and returns its package root.
    pub fn ensure_package(&self, version: &str) -> Result<PathBuf> {
        let version_dir = self
            .cache
            .ensure_installed(self.listener, version, |dir| self.installer.install(version, dir))?;
        locate_package_root(&version_dir)
    }

    /// Runs the build step described by `config`.
    ///
    /// # Returns
    /// * `Ok(true)` when Katalon Studio exited with code 0, `Ok(false)` otherwise.
    /// * `Err` when it could not be resolved, fetched, installed or started.
    pub fn execute(&self, config: &StepConfig) -> Result<bool> {
        let package_root = match config.override_location() {
            Some(location) => PathBuf::from(location),
            None => {
                let root = self.ensure_package(&config.version)?;
                std::path::absolute(&root).unwrap_or(root)
            }
        };
        self.listener
            .log(&format!("Using Katalon Studio at {}", package_root.display()));

        let os = detect_os(self.listener);
        let executable = prepare_executable(executable_path(&package_root, &os));

        let command = build_command_line(&executable, &config.project_path, &config.execute_args);
        launcher::run(
            self.listener,
            &command,
            config.x11_display(),
            config.xvfb_configuration(),
        )
    }
}

/// Runs the build step for `host` with its own configuration.
pub fn execute_build_step<H: BuildHost>(
    host: &H,
    transport: &dyn Transport,
    cache: PackageCache,
    manifest_url: &str,
) -> Result<bool> {
    KatalonRunner::new(host, transport, cache, manifest_url).execute(host.config())
}

/// Where the executable lives inside a package root for the `os` label.
pub fn executable_path(package_root: &Path, os: &str) -> PathBuf {
    let executable = if os.contains("macos") {
        package_root.join("Contents").join("MacOS").join(EXECUTABLE_NAME)
    } else {
        package_root.join(EXECUTABLE_NAME)
    };
    std::path::absolute(&executable).unwrap_or(executable)
}

/// Picks `<path>.exe` when `path` itself does not exist but that does, and
/// marks the result executable. A failed chmod is only logged: if the file
/// really cannot run, the launch reports it.
pub fn prepare_executable(path: PathBuf) -> PathBuf {
    let executable = if path.exists() {
        path
    } else {
        let mut with_exe = path.clone().into_os_string();
        with_exe.push(".exe");
        let with_exe = PathBuf::from(with_exe);
        if with_exe.exists() { with_exe } else { path }
    };

    if executable.exists() {
        if let Err(e) = mark_executable(&executable) {
            log_warn!(
                "[Runner] Could not mark {} as executable: {}",
                executable.display().to_string().yellow(),
                e
            );
        }
    } else {
        log_debug!(
            "[Runner] {} does not exist, launching it anyway",
            executable.display().to_string().yellow()
        );
    }
    executable
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// The Katalon Studio command line for a console run.
///
/// `-projectPath=<project_path>` is added only when no token of
/// `execute_args` already starts with `-projectPath`; the caller's own
/// flag wins. The extra arguments follow in their original order.
pub fn build_command_line(executable: &Path, project_path: &str, execute_args: &str) -> CommandLine {
    let extra_args = split_arguments(execute_args);
    let has_project_path = extra_args.iter().any(|arg| arg.starts_with(PROJECT_PATH_FLAG));

    let mut command = CommandLine::new(executable.to_string_lossy()).args(CONSOLE_FLAGS);
    if !has_project_path {
        command = command.arg(format!("{PROJECT_PATH_FLAG}={project_path}"));
    }
    command.args(extra_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::archive_installer::tests::{MANIFEST_URL, manifest_for_all_platforms};
    use crate::libs::host::testing::{RecordingHost, RecordingListener};
    use crate::libs::utilities::compression::tests::zip_bytes;
    use crate::libs::utilities::download::tests::FakeTransport;
    use crate::libs::utilities::platform::{LINUX, MACOS_APP, WINDOWS_64};
    use std::fs;

    fn project_path_flags(command: &CommandLine) -> usize {
        command
            .args
            .iter()
            .filter(|arg| arg.starts_with("-projectPath"))
            .count()
    }

    #[test]
    fn adds_project_path_when_missing() {
        let command = build_command_line(
            Path::new("/opt/katalon/katalon"),
            "/work/demo.prj",
            "-retry=0 -testSuitePath=\"Test Suites/Smoke\"",
        );

        assert_eq!(
            command.args,
            vec![
                "-noSplash",
                "-runMode=console",
                "-projectPath=/work/demo.prj",
                "-retry=0",
                "-testSuitePath=Test Suites/Smoke",
            ]
        );
        assert_eq!(project_path_flags(&command), 1);
    }

    #[test]
    fn caller_project_path_wins() {
        let command = build_command_line(
            Path::new("/opt/katalon/katalon"),
            "/work/demo.prj",
            "-projectPath=/foo -retry=0",
        );

        assert_eq!(project_path_flags(&command), 1);
        assert!(command.args.contains(&"-projectPath=/foo".to_string()));
        assert!(!command.args.iter().any(|arg| arg.contains("/work/demo.prj")));
    }

    #[test]
    fn only_a_leading_project_path_flag_counts() {
        let command = build_command_line(
            Path::new("/opt/katalon/katalon"),
            "/work/demo.prj",
            "--projectPath=/x -note=-projectPath=/y",
        );

        assert_eq!(
            command.args,
            vec![
                "-noSplash",
                "-runMode=console",
                "-projectPath=/work/demo.prj",
                "--projectPath=/x",
                "-note=-projectPath=/y",
            ]
        );
    }

    #[test]
    fn empty_extra_args() {
        let command = build_command_line(Path::new("katalon"), "/work/demo.prj", "");
        assert_eq!(command.args.len(), 3);
    }

    #[test]
    fn mac_packages_use_the_app_bundle_layout() {
        let root = Path::new("/Applications/Katalon Studio.app");
        assert_eq!(
            executable_path(root, MACOS_APP),
            root.join("Contents").join("MacOS").join("katalon")
        );
    }

    #[test]
    fn other_packages_keep_the_executable_at_the_root() {
        let root = Path::new("/opt/Katalon_Studio_Linux_64-7.0.0");
        assert_eq!(executable_path(root, LINUX), root.join("katalon"));
        assert!(executable_path(root, WINDOWS_64).ends_with("katalon"));
    }

    #[test]
    fn falls_back_to_exe_sibling() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("katalon.exe"), "MZ").unwrap();

        assert_eq!(
            prepare_executable(dir.path().join("katalon")),
            dir.path().join("katalon.exe")
        );
    }

    #[test]
    fn prefers_plain_executable_over_exe() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("katalon"), "#!/bin/sh\n").unwrap();
        fs::write(dir.path().join("katalon.exe"), "MZ").unwrap();

        assert_eq!(prepare_executable(dir.path().join("katalon")), dir.path().join("katalon"));
    }

    #[test]
    fn keeps_missing_path_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(prepare_executable(dir.path().join("katalon")), dir.path().join("katalon"));
    }

    #[cfg(unix)]
    #[test]
    fn marks_existing_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("katalon");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        prepare_executable(path.clone());

        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o111, 0o111);
    }

    /// A fake Katalon Studio that prints its arguments and exits with `code`.
    #[cfg(unix)]
    fn fake_katalon_script(code: i32) -> String {
        format!("#!/bin/sh\nfor arg in \"$@\"; do echo \"arg:$arg\"; done\nexit {code}\n")
    }

    #[cfg(unix)]
    fn package_with_executable(root: &Path, code: i32) {
        let bin_dir = if cfg!(target_os = "macos") {
            root.join("Contents/MacOS")
        } else {
            root.to_path_buf()
        };
        fs::create_dir_all(&bin_dir).unwrap();
        fs::write(bin_dir.join("katalon"), fake_katalon_script(code)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn execute_with_override_location_runs_katalon() {
        let package = tempfile::tempdir().unwrap();
        package_with_executable(package.path(), 0);
        let host = RecordingHost::new(StepConfig {
            version: "7.0.0".to_string(),
            location: Some(package.path().to_string_lossy().into_owned()),
            project_path: "/work/my project/demo.prj".to_string(),
            execute_args: "-retry=0 -testSuitePath=\"Test Suites/Smoke\"".to_string(),
            ..StepConfig::default()
        });
        let transport = FakeTransport::default();
        let cache_home = tempfile::tempdir().unwrap();

        let passed = execute_build_step(&host, &transport, PackageCache::new(cache_home.path()), MANIFEST_URL).unwrap();

        assert!(passed);
        assert_eq!(transport.request_count(), 0, "override location must not download");
        let log = host.listener.lines();
        for expected in [
            "arg:-noSplash",
            "arg:-runMode=console",
            "arg:-projectPath=/work/my project/demo.prj",
            "arg:-retry=0",
            "arg:-testSuitePath=Test Suites/Smoke",
        ] {
            assert!(log.iter().any(|l| l == expected), "missing {expected:?} in {log:?}");
        }
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_katalon_exit_fails_the_step() {
        for code in [1, 2, 127] {
            let package = tempfile::tempdir().unwrap();
            package_with_executable(package.path(), code);
            let host = RecordingHost::new(StepConfig {
                version: "7.0.0".to_string(),
                location: Some(package.path().to_string_lossy().into_owned()),
                project_path: "/work/demo.prj".to_string(),
                ..StepConfig::default()
            });
            let transport = FakeTransport::default();
            let cache_home = tempfile::tempdir().unwrap();

            let passed = execute_build_step(&host, &transport, PackageCache::new(cache_home.path()), MANIFEST_URL).unwrap();
            assert!(!passed, "exit code {code} must fail the step");
        }
    }

    #[cfg(unix)]
    #[test]
    fn execute_downloads_once_then_reuses_the_cache() {
        let url = "https://downloads.test/Katalon_Studio_7.0.0.zip";
        let root = "Katalon_Studio_7.0.0";
        let executable = if cfg!(target_os = "macos") {
            format!("{root}/Contents/MacOS/katalon")
        } else {
            format!("{root}/katalon")
        };
        let transport = FakeTransport::default()
            .with(MANIFEST_URL, manifest_for_all_platforms("7.0.0", url))
            .with(url, zip_bytes(&[(executable.as_str(), fake_katalon_script(0).as_str())]));
        let listener = RecordingListener::default();
        let cache_home = tempfile::tempdir().unwrap();
        let runner = KatalonRunner::new(
            &listener,
            &transport,
            PackageCache::new(cache_home.path()),
            MANIFEST_URL,
        );
        let config = StepConfig {
            version: "7.0.0".to_string(),
            project_path: "/work/demo.prj".to_string(),
            ..StepConfig::default()
        };

        assert!(runner.execute(&config).unwrap());
        assert!(runner.execute(&config).unwrap());

        assert_eq!(transport.request_count(), 2);
        assert!(listener.contains("downloaded already"));
        let package_root = cache_home.path().join("7.0.0").join(root);
        assert!(listener.contains(&format!("Using Katalon Studio at {}", package_root.display())));
    }

    #[test]
    fn unknown_version_fails_before_launch() {
        let transport = FakeTransport::default().with(
            MANIFEST_URL,
            manifest_for_all_platforms("7.0.0", "https://downloads.test/k.zip"),
        );
        let listener = RecordingListener::default();
        let cache_home = tempfile::tempdir().unwrap();
        let runner = KatalonRunner::new(
            &listener,
            &transport,
            PackageCache::new(cache_home.path()),
            MANIFEST_URL,
        );
        let config = StepConfig {
            version: "9.9.9".to_string(),
            ..StepConfig::default()
        };

        assert!(runner.execute(&config).is_err());
        assert!(!listener.contains("Execute "));
    }
}
