// OS detection and the OS labels used by the release manifest.

use crate::libs::host::BuildListener;
use crate::log_debug;
use colored::Colorize;
use std::io;
use std::process::Command;

/// Manifest OS label for 64-bit Windows. Also the fallback when the architecture is unknown.
pub const WINDOWS_64: &str = "windows 64";
/// Manifest OS label for 32-bit Windows.
pub const WINDOWS_32: &str = "windows 32";
/// Manifest OS label for macOS. Packages for it are `.app` bundles.
pub const MACOS_APP: &str = "macos (app)";
/// Manifest OS label for Linux.
pub const LINUX: &str = "linux";

/// The OS family the launcher is running on. Decides the manifest label,
/// the executable layout and how the Katalon process is spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` style name to a platform.
    pub fn from_os_name(os: &str) -> Self {
        match os.to_lowercase().as_str() {
            "windows" => Platform::Windows,
            "macos" | "darwin" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }
}

/// Detects the manifest OS label of the running machine.
///
/// On Windows this asks the OS for its architecture with
/// `wmic os get osarchitecture`. Any trouble with that query falls back to
/// `windows 64` and says so in the build log.
///
/// # Returns
/// * `String`: one of `windows 64`, `windows 32`, `macos (app)`, `linux`,
///   or an empty string on any other OS. The empty label matches no
///   manifest entry, so it surfaces later as "release not found".
pub fn detect_os(listener: &dyn BuildListener) -> String {
    os_label(Platform::current(), listener, probe_windows_architecture)
}

/// Label for `platform`, running `probe` only when the platform is Windows.
pub fn os_label<P>(platform: Platform, listener: &dyn BuildListener, probe: P) -> String
where
    P: FnOnce() -> io::Result<String>,
{
    let label = match platform {
        Platform::Windows => windows_label(probe(), listener),
        Platform::MacOs => MACOS_APP.to_string(),
        Platform::Linux => LINUX.to_string(),
        Platform::Other => String::new(),
    };
    log_debug!("[Platform] Detected OS label: '{}'", label.cyan());
    label
}

/// Turns the output of the architecture query into a Windows label.
fn windows_label(probe_result: io::Result<String>, listener: &dyn BuildListener) -> String {
    let reason = match probe_result {
        Ok(output) if output.contains("64") => return WINDOWS_64.to_string(),
        Ok(output) if output.contains("32") => return WINDOWS_32.to_string(),
        Ok(output) => format!("unrecognized architecture '{}'", output.trim()),
        Err(e) => e.to_string(),
    };

    listener.log("Cannot detect the OS architecture. Assume it is x64.");
    listener.log(&format!("Reason: {reason}."));
    WINDOWS_64.to_string()
}

/// Runs `wmic os get osarchitecture` and returns its stdout.
fn probe_windows_architecture() -> io::Result<String> {
    let output = Command::new("wmic")
        .args(["os", "get", "osarchitecture"])
        .output()?;

    if !output.status.success() {
        return Err(io::Error::other(format!(
            "wmic exited with {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::host::testing::RecordingListener;

    fn never_probed() -> io::Result<String> {
        panic!("architecture probe must only run on Windows");
    }

    #[test]
    fn maps_os_names() {
        assert_eq!(Platform::from_os_name("windows"), Platform::Windows);
        assert_eq!(Platform::from_os_name("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os_name("linux"), Platform::Linux);
        assert_eq!(Platform::from_os_name("freebsd"), Platform::Other);
    }

    #[test]
    fn fixed_labels_skip_the_probe() {
        let listener = RecordingListener::default();
        assert_eq!(os_label(Platform::Linux, &listener, never_probed), LINUX);
        assert_eq!(os_label(Platform::MacOs, &listener, never_probed), MACOS_APP);
        assert_eq!(os_label(Platform::Other, &listener, never_probed), "");
        assert!(listener.lines().is_empty());
    }

    #[test]
    fn windows_64_bit() {
        let listener = RecordingListener::default();
        let label = os_label(Platform::Windows, &listener, || {
            Ok("OSArchitecture\r\n64-bit\r\n".to_string())
        });
        assert_eq!(label, WINDOWS_64);
        assert!(listener.lines().is_empty());
    }

    #[test]
    fn windows_32_bit() {
        let listener = RecordingListener::default();
        let label = os_label(Platform::Windows, &listener, || {
            Ok("OSArchitecture\r\n32-bit\r\n".to_string())
        });
        assert_eq!(label, WINDOWS_32);
    }

    #[test]
    fn probe_failure_falls_back_to_64_bit_and_logs() {
        let listener = RecordingListener::default();
        let label = os_label(Platform::Windows, &listener, || {
            Err(io::Error::new(io::ErrorKind::NotFound, "wmic not found"))
        });
        assert_eq!(label, WINDOWS_64);
        assert!(listener.contains("Assume it is x64"));
        assert!(listener.contains("wmic not found"));
    }

    #[test]
    fn unreadable_probe_output_falls_back_to_64_bit() {
        let listener = RecordingListener::default();
        let label = os_label(Platform::Windows, &listener, || Ok("\r\n".to_string()));
        assert_eq!(label, WINDOWS_64);
        assert!(listener.contains("unrecognized architecture"));
    }
}
