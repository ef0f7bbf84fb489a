// This module unpacks downloaded Katalon Studio packages.
// Katalon ships `.zip` packages (Windows, macOS) and `.tar.gz` packages (Linux).

use crate::libs::errors::{LauncherError, Result};
use crate::log_debug;
use colored::Colorize;
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use tar::Archive;
use zip::ZipArchive;

/// The archive formats a package can come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    /// Picks the extraction strategy from the download URL.
    ///
    /// Matches on substrings, `.zip` first, so URLs with query strings
    /// (`.../Katalon.zip?token=...`) still resolve.
    ///
    /// # Returns
    /// * `Option<ArchiveKind>`: `None` when the URL mentions neither format.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.contains(".zip") {
            Some(ArchiveKind::Zip)
        } else if url.contains(".tar.gz") {
            Some(ArchiveKind::TarGz)
        } else {
            None
        }
    }
}

/// Extracts the archive at `src` directly into `dest`.
///
/// # Arguments
/// * `src`: The downloaded archive file.
/// * `dest`: The version directory of the package cache. Must exist.
/// * `kind`: Which decoder to use.
///
/// # Returns
/// * `Result<()>`: an `Extraction` error when the archive is corrupt or
///   cannot be written out, a `Filesystem` error when `src` cannot be opened.
pub fn extract_archive(src: &Path, dest: &Path, kind: ArchiveKind) -> Result<()> {
    log_debug!(
        "[Compression] Extracting {:?} archive {} into {}",
        kind,
        src.display().to_string().blue(),
        dest.display().to_string().cyan()
    );

    let file = File::open(src).map_err(|e| LauncherError::filesystem("open", src, e))?;
    let extraction_error = |reason: String| LauncherError::Extraction {
        archive: src.to_path_buf(),
        reason,
    };

    match kind {
        ArchiveKind::Zip => {
            let mut archive = ZipArchive::new(file).map_err(|e| extraction_error(e.to_string()))?;
            archive
                .extract(dest)
                .map_err(|e| extraction_error(e.to_string()))?;
        }
        ArchiveKind::TarGz => {
            let mut archive = Archive::new(GzDecoder::new(file));
            archive
                .unpack(dest)
                .map_err(|e| extraction_error(e.to_string()))?;
        }
    }

    log_debug!("[Compression] Archive contents available at {}", dest.display().to_string().green());
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::FileOptions;

    /// Builds an in-memory zip with the given `(path, contents)` files.
    pub(crate) fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (path, contents) in files {
            writer
                .start_file(*path, FileOptions::default().unix_permissions(0o755))
                .expect("start zip entry");
            writer.write_all(contents.as_bytes()).expect("write zip entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    /// Builds an in-memory `.tar.gz` with the given `(path, contents)` files.
    pub(crate) fn tar_gz_bytes(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .expect("append tar entry");
        }
        builder
            .into_inner()
            .expect("finish tar")
            .finish()
            .expect("finish gzip")
    }

    #[test]
    fn kind_from_url() {
        assert_eq!(
            ArchiveKind::from_url("https://downloads.test/Katalon_Studio_Windows_64-7.0.0.zip"),
            Some(ArchiveKind::Zip)
        );
        assert_eq!(
            ArchiveKind::from_url("https://downloads.test/Katalon_Studio_Linux_64-7.0.0.tar.gz"),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(
            ArchiveKind::from_url("https://downloads.test/Katalon.zip?sig=abc"),
            Some(ArchiveKind::Zip)
        );
        assert_eq!(ArchiveKind::from_url("https://downloads.test/Katalon.dmg"), None);
    }

    #[test]
    fn extracts_zip_into_destination() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("package.zip");
        std::fs::write(&archive, zip_bytes(&[("Katalon_Studio/katalon", "#!/bin/sh\n")])).unwrap();
        let dest = scratch.path().join("out");
        std::fs::create_dir(&dest).unwrap();

        extract_archive(&archive, &dest, ArchiveKind::Zip).unwrap();

        assert!(dest.join("Katalon_Studio/katalon").is_file());
    }

    #[test]
    fn extracts_tar_gz_into_destination() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("package.tar.gz");
        std::fs::write(&archive, tar_gz_bytes(&[("Katalon_Studio/katalon", "#!/bin/sh\n")])).unwrap();
        let dest = scratch.path().join("out");
        std::fs::create_dir(&dest).unwrap();

        extract_archive(&archive, &dest, ArchiveKind::TarGz).unwrap();

        assert!(dest.join("Katalon_Studio/katalon").is_file());
    }

    #[test]
    fn corrupt_zip_is_an_extraction_error() {
        let scratch = tempfile::tempdir().unwrap();
        let archive = scratch.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let err = extract_archive(&archive, scratch.path(), ArchiveKind::Zip).unwrap_err();
        assert!(matches!(err, LauncherError::Extraction { .. }));
    }
}
