//! Archive extraction for downloaded releases.
//!
//! Expands `.tar.gz` and `.zip` archives into a directory without ever
//! overwriting an existing file, and with path traversal protection to
//! prevent zip-slip attacks. Extraction stops at the first conflict; files
//! written before it stay on disk.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;

/// Archive formats the installer can expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// A gzip-compressed tarball (`.tar.gz`).
    TarGz,
    /// A zip archive (`.zip`).
    Zip,
}

impl ArchiveFormat {
    /// Pick a format from the file extension, or `None` if the file is not
    /// an archive the installer can expand (`.pkg`, `.msi`, ...).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use getgo::artefact::extraction::ArchiveFormat;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::sniff(Path::new("go1.22.3.linux-amd64.tar.gz")),
    ///     Some(ArchiveFormat::TarGz)
    /// );
    /// assert_eq!(ArchiveFormat::sniff(Path::new("go1.22.3.darwin-arm64.pkg")), None);
    /// ```
    #[must_use]
    pub fn sniff(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "gz" => Some(Self::TarGz),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }
}

/// Trait for extracting archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use getgo::artefact::extraction::ArchiveExtractor;
///
/// let extractor = ArchiveExtractor;
/// // Use extractor.extract(format, archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the paths, relative to `dest_dir`, of the files written.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::DestinationConflict`] if a file entry's
    /// destination already exists, [`ExtractionError::PathTraversal`] if an
    /// entry attempts to escape `dest_dir`, and [`ExtractionError::Io`] or
    /// [`ExtractionError::Zip`] on read or write failures.
    fn extract(
        &self,
        format: ArchiveFormat,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error reading the archive or writing an entry.
    #[error("extraction I/O error at {path}: {source}")]
    Io {
        /// The archive or destination path involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file entry's destination already exists.
    #[error("refusing to overwrite existing file {path}")]
    DestinationConflict {
        /// The pre-existing destination path.
        path: PathBuf,
    },

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The zip central directory or an entry header is malformed.
    #[error("invalid zip archive {path}: {source}")]
    Zip {
        /// The archive path.
        path: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },
}

/// Default extractor using the `tar`, `flate2`, and `zip` crates.
///
/// Validates each entry path before extraction to guard against path
/// traversal attacks (zip-slip).
pub struct ArchiveExtractor;

impl ArtefactExtractor for ArchiveExtractor {
    fn extract(
        &self,
        format: ArchiveFormat,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError> {
        fs::create_dir_all(dest_dir).map_err(|source| io_error(dest_dir, source))?;
        let file = File::open(archive_path).map_err(|source| io_error(archive_path, source))?;
        let mut sink = EntrySink::new(dest_dir);
        match format {
            ArchiveFormat::TarGz => extract_tar_gz(file, archive_path, &mut sink)?,
            ArchiveFormat::Zip => extract_zip(file, archive_path, &mut sink)?,
        }
        log::debug!(
            "extracted {} file(s) from {} into {}",
            sink.written.len(),
            archive_path.display(),
            dest_dir.display()
        );
        Ok(sink.written)
    }
}

fn extract_tar_gz(
    file: File,
    archive_path: &Path,
    sink: &mut EntrySink<'_>,
) -> Result<(), ExtractionError> {
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    let entries = archive
        .entries()
        .map_err(|source| io_error(archive_path, source))?;

    for entry_result in entries {
        let mut entry = entry_result.map_err(|source| io_error(archive_path, source))?;
        let entry_path = entry
            .path()
            .map_err(|source| io_error(archive_path, source))?
            .into_owned();
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            sink.create_dir(&entry_path)?;
        } else if entry_type.is_file() {
            let mode = entry.header().mode().ok();
            sink.write_file(&entry_path, &mut entry, mode)?;
        } else {
            log::debug!(
                "skipping {:?} entry {}",
                entry_type,
                entry_path.display()
            );
        }
    }
    Ok(())
}

fn extract_zip(
    file: File,
    archive_path: &Path,
    sink: &mut EntrySink<'_>,
) -> Result<(), ExtractionError> {
    let zip_error = |source: zip::result::ZipError| ExtractionError::Zip {
        path: archive_path.to_path_buf(),
        source,
    };
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(zip_error)?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(zip_error)?;
        let entry_path =
            entry
                .enclosed_name()
                .ok_or_else(|| ExtractionError::PathTraversal {
                    path: entry.name().to_owned(),
                })?;

        if entry.is_dir() {
            sink.create_dir(&entry_path)?;
        } else {
            let mode = entry.unix_mode();
            sink.write_file(&entry_path, &mut entry, mode)?;
        }
    }
    Ok(())
}

/// Writes validated entries beneath a destination directory.
struct EntrySink<'a> {
    dest_dir: &'a Path,
    written: Vec<PathBuf>,
}

impl<'a> EntrySink<'a> {
    fn new(dest_dir: &'a Path) -> Self {
        Self {
            dest_dir,
            written: Vec::new(),
        }
    }

    fn create_dir(&self, entry_path: &Path) -> Result<(), ExtractionError> {
        validate_entry_path(entry_path)?;
        let target = self.dest_dir.join(entry_path);
        fs::create_dir_all(&target).map_err(|source| io_error(&target, source))
    }

    fn write_file(
        &mut self,
        entry_path: &Path,
        contents: &mut dyn Read,
        mode: Option<u32>,
    ) -> Result<(), ExtractionError> {
        validate_entry_path(entry_path)?;
        let target = self.dest_dir.join(entry_path);
        if target.symlink_metadata().is_ok() {
            return Err(ExtractionError::DestinationConflict { path: target });
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        // `create_new` closes the gap between the existence check and the
        // open.
        let mut out = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|source| match source.kind() {
                io::ErrorKind::AlreadyExists => ExtractionError::DestinationConflict {
                    path: target.clone(),
                },
                _ => io_error(&target, source),
            })?;
        io::copy(contents, &mut out).map_err(|source| io_error(&target, source))?;
        drop(out);
        apply_mode(&target, mode)?;

        self.written.push(entry_path.to_path_buf());
        Ok(())
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<(), ExtractionError> {
    use std::os::unix::fs::PermissionsExt;

    let Some(bits) = mode else {
        return Ok(());
    };
    fs::set_permissions(path, fs::Permissions::from_mode(bits & 0o7777))
        .map_err(|source| io_error(path, source))
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<(), ExtractionError> {
    Ok(())
}

fn io_error(path: &Path, source: io::Error) -> ExtractionError {
    ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
