//! Fetch, verify, and extract a resolved release file.
//!
//! The pipeline is a short state machine:
//!
//! ```text
//! CHECK_EXISTING ──match──────────────────────────────► EXTRACT? ─► done
//!       │
//!       └─absent/mismatch─► DOWNLOAD ─► VERIFY ─match─► EXTRACT? ─► done
//!                                          └─mismatch─► delete, fail
//! ```
//!
//! A file already on disk with the expected digest is never fetched again,
//! so repeated runs are cheap. A download that fails verification is
//! removed before the error is returned.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::artefact::download::{ArtefactDownloader, HttpDownloader};
use crate::artefact::extraction::{ArchiveExtractor, ArchiveFormat, ArtefactExtractor};
use crate::artefact::sha256_digest::compute_sha256;
use crate::config::Config;
use crate::error::{InstallerError, Result};
use crate::output::write_stderr_line;

/// Where to place the download and whether to unpack it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Directory receiving the file; the working directory when `None`.
    pub dest_dir: Option<PathBuf>,
    /// Directory to unpack archives into; no extraction when `None` or
    /// empty.
    pub extract_dir: Option<PathBuf>,
    /// When true, suppress progress output.
    pub quiet: bool,
}

impl FetchRequest {
    fn dest_dir(&self) -> &Path {
        self.dest_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    fn extract_dir(&self) -> Option<&Path> {
        self.extract_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

/// Fetch, verify, and optionally extract `filename` using production HTTP
/// and extraction implementations.
///
/// Returns the path of the verified file.
///
/// # Errors
///
/// See [`fetch_verify_extract_with`].
pub fn fetch_verify_extract(
    config: &Config,
    request: &FetchRequest,
    filename: &str,
    checksum: &str,
    stderr: &mut dyn Write,
) -> Result<PathBuf> {
    fetch_verify_extract_with(
        &HttpDownloader::new(config),
        &ArchiveExtractor,
        request,
        filename,
        checksum,
        stderr,
    )
}

/// Testable inner function with injected dependencies.
///
/// # Errors
///
/// - [`InstallerError::PathTraversal`] if `filename` is not a plain file
///   name.
/// - [`InstallerError::Network`], [`InstallerError::NotFound`], or
///   [`InstallerError::Io`] if the download fails.
/// - [`InstallerError::ChecksumMismatch`] if the downloaded bytes do not
///   hash to `checksum`; the file is deleted first.
/// - [`InstallerError::DestinationConflict`] if extraction would overwrite
///   an existing file.
pub fn fetch_verify_extract_with(
    downloader: &dyn ArtefactDownloader,
    extractor: &dyn ArtefactExtractor,
    request: &FetchRequest,
    filename: &str,
    checksum: &str,
    stderr: &mut dyn Write,
) -> Result<PathBuf> {
    validate_filename(filename)?;
    let dest_dir = request.dest_dir();
    let path = dest_dir.join(filename);

    if existing_matches(&path, checksum) {
        log::info!("{} already present and verified", path.display());
        if !request.quiet {
            write_stderr_line(stderr, format!("Using existing {}", path.display()));
        }
    } else {
        download(downloader, dest_dir, filename, &path, request.quiet, stderr)?;
        verify(&path, checksum)?;
    }

    if let Some(extract_dir) = request.extract_dir() {
        extract(extractor, &path, extract_dir, request.quiet, stderr)?;
    }
    Ok(path)
}

/// Whether `path` exists and hashes to `checksum`. An unreadable file is
/// treated like a missing one.
fn existing_matches(path: &Path, checksum: &str) -> bool {
    if !path.exists() {
        return false;
    }
    match compute_sha256(path) {
        Ok(digest) if digest.matches(checksum) => true,
        Ok(digest) => {
            log::info!(
                "{} has digest {digest}, expected {checksum}; downloading again",
                path.display()
            );
            false
        }
        Err(e) => {
            log::warn!("cannot hash existing {}: {e}; downloading again", path.display());
            false
        }
    }
}

fn download(
    downloader: &dyn ArtefactDownloader,
    dest_dir: &Path,
    filename: &str,
    path: &Path,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    fs::create_dir_all(dest_dir).map_err(|source| InstallerError::Io {
        path: dest_dir.to_path_buf(),
        source,
    })?;
    log::info!("downloading {filename} to {}", path.display());
    if !quiet {
        write_stderr_line(stderr, format!("Downloading {filename}..."));
    }
    downloader.download_artefact(filename, path)?;
    Ok(())
}

/// Hash the downloaded file and delete it when the digest differs.
fn verify(path: &Path, checksum: &str) -> Result<()> {
    let actual = compute_sha256(path).map_err(|source| InstallerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if actual.matches(checksum) {
        log::debug!("{} verified (sha256 {actual})", path.display());
        return Ok(());
    }

    log::warn!(
        "checksum mismatch for {}: expected {checksum}, got {actual}; removing it",
        path.display()
    );
    if let Err(e) = fs::remove_file(path) {
        log::warn!("failed to remove {}: {e}", path.display());
    }
    Err(InstallerError::ChecksumMismatch {
        path: path.to_path_buf(),
        expected: checksum.to_owned(),
        actual: actual.into_inner(),
    })
}

fn extract(
    extractor: &dyn ArtefactExtractor,
    path: &Path,
    extract_dir: &Path,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    let Some(format) = ArchiveFormat::sniff(path) else {
        log::info!(
            "{} is not a tar.gz or zip archive; skipping extraction",
            path.display()
        );
        return Ok(());
    };
    if !quiet {
        write_stderr_line(
            stderr,
            format!("Extracting {} into {}...", path.display(), extract_dir.display()),
        );
    }
    let written = extractor.extract(format, path, extract_dir)?;
    log::info!("extracted {} file(s) into {}", written.len(), extract_dir.display());
    Ok(())
}

/// Reject index file names that would place the download outside the
/// destination directory.
fn validate_filename(filename: &str) -> Result<()> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(InstallerError::PathTraversal {
            path: filename.to_owned(),
        }),
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
