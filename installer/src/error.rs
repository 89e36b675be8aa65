//! Error types for the getgo installer.
//!
//! Layer errors are defined next to the code that raises them and fold into
//! [`InstallerError`] through `From`, so callers handle one taxonomy.

use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::index::IndexParseError;
use crate::artefact::platform::{Arch, Kind, Os};
use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving or installing a release.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// The index or a release file could not be fetched.
    #[error("network error fetching {url}: {reason}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// The server answered 404.
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The index body is not a valid release list.
    #[error("failed to parse release index: {reason}")]
    Parse {
        /// Description of the parse error.
        reason: String,
    },

    /// The index lists no stable release.
    #[error("no stable version found in release index")]
    NoStableVersion,

    /// A pinned version is absent from the index.
    #[error("version {version} not found in release index")]
    VersionNotFound {
        /// The requested version, with its `go` prefix.
        version: String,
    },

    /// The chosen release has no file for the requested triple.
    #[error("no {kind} for {os}/{arch} in {version}")]
    NoMatchingArtifact {
        /// Requested operating system.
        os: Os,
        /// Requested architecture, after alias normalization.
        arch: Arch,
        /// Requested packaging form.
        kind: Kind,
        /// The release that was searched.
        version: String,
    },

    /// A local file operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A downloaded file did not hash to the expected digest. The file has
    /// been removed.
    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The (now deleted) download path.
        path: PathBuf,
        /// Digest listed in the index.
        expected: String,
        /// Digest of the downloaded bytes.
        actual: String,
    },

    /// Extraction would overwrite an existing file.
    #[error("refusing to overwrite existing file {path}")]
    DestinationConflict {
        /// The pre-existing destination path.
        path: PathBuf,
    },

    /// An archive entry attempts to escape the extraction directory.
    #[error("archive entry escapes extraction directory: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: String,
    },

    /// The requested or host platform is not one the index uses.
    #[error("unsupported {kind} \"{value}\"; expected one of: {expected}")]
    UnsupportedPlatform {
        /// Which identifier was rejected.
        kind: &'static str,
        /// The rejected identifier.
        value: String,
        /// Comma-separated list of accepted identifiers.
        expected: String,
    },

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<DownloadError> for InstallerError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::HttpError { url, reason } => Self::Network { url, reason },
            DownloadError::NotFound { url } => Self::NotFound { url },
            DownloadError::Io { path, source } => Self::Io {
                path: PathBuf::from(path),
                source,
            },
        }
    }
}

impl From<ArtefactError> for InstallerError {
    fn from(err: ArtefactError) -> Self {
        match err {
            ArtefactError::UnsupportedPlatform {
                kind,
                value,
                expected,
            } => Self::UnsupportedPlatform {
                kind,
                value,
                expected,
            },
            ArtefactError::InvalidSha256Digest { .. } => Self::Parse {
                reason: err.to_string(),
            },
        }
    }
}

impl From<IndexParseError> for InstallerError {
    fn from(err: IndexParseError) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<ExtractionError> for InstallerError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Io { path, source } => Self::Io { path, source },
            ExtractionError::DestinationConflict { path } => Self::DestinationConflict { path },
            ExtractionError::PathTraversal { path } => Self::PathTraversal { path },
            ExtractionError::Zip { path, source } => Self::Io {
                path,
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, source),
            },
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
