// Fetching URLs: the release manifest and the package archives.
// The pipeline only sees the `Transport` trait, so tests can serve bytes
// from memory and count requests.

use crate::libs::errors::{LauncherError, Result};
use crate::log_debug;
use colored::Colorize;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::time::Duration;

/// Opens a URL as a byte stream.
pub trait Transport {
    /// Starts a GET for `url`. A network failure or an HTTP error status is a
    /// `LauncherError::Transport`.
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send + Sync + 'static>>;
}

/// The production transport, a blocking `ureq` agent.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(concat!("katalon-launcher/", env!("CARGO_PKG_VERSION")))
            .timeout_connect(Duration::from_secs(30))
            .build();
        HttpTransport { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn open(&self, url: &str) -> Result<Box<dyn Read + Send + Sync + 'static>> {
        log_debug!("[Download] GET {}", url.blue());
        match self.agent.get(url).call() {
            Ok(response) => Ok(response.into_reader()),
            Err(ureq::Error::Status(code, response)) => Err(LauncherError::Transport {
                url: url.to_string(),
                reason: format!("HTTP {} {}", code, response.status_text()),
            }),
            Err(e) => Err(LauncherError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// What a finished download wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the downloaded bytes.
    pub sha256: String,
}

/// Streams `url` into `dest`, hashing as it goes.
///
/// Read errors mid-stream are reported as transport failures for `url`;
/// write errors are plain I/O errors.
pub fn download_to<W: Write>(transport: &dyn Transport, url: &str, dest: &mut W) -> Result<DownloadSummary> {
    let mut reader = transport.open(url)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    let mut bytes = 0u64;

    loop {
        let read = reader.read(&mut buffer).map_err(|e| LauncherError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        dest.write_all(&buffer[..read])?;
        bytes += read as u64;
    }
    dest.flush()?;

    let summary = DownloadSummary {
        bytes,
        sha256: format!("{:x}", hasher.finalize()),
    };
    log_debug!(
        "[Download] Fetched {} bytes from {} (sha256 {})",
        summary.bytes,
        url.blue(),
        summary.sha256.dimmed()
    );
    Ok(summary)
}
