//! Release index and artefact download.
//!
//! Provides a trait-based abstraction over the two network reads the
//! installer performs, enabling dependency injection for testing.

use crate::config::Config;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// The full release history is a few MB of JSON; ureq's default 10 MB
/// string limit leaves too little headroom.
const INDEX_BODY_LIMIT: u64 = 64 * 1024 * 1024;

/// Chunk size for streaming release files to disk.
const COPY_BUFFER_LEN: usize = 64 * 1024;

/// Trait for fetching the release index and release files.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
///
/// # Examples
///
/// ```
/// use getgo::artefact::download::HttpDownloader;
/// use getgo::config::Config;
///
/// let downloader = HttpDownloader::new(&Config::default());
/// // Use downloader.fetch_index(false) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArtefactDownloader {
    /// Fetch the release index body.
    ///
    /// When `include_all` is set the full release history is requested
    /// rather than only the current release lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be read.
    fn fetch_index(&self, include_all: bool) -> Result<String, DownloadError>;

    /// Stream the release file `filename` into `dest`, creating or
    /// truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request, file creation, or write fails. A
    /// partially written `dest` may remain.
    fn download_artefact(&self, filename: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The destination file could not be created or written.
    #[error("failed to write {path}: {source}")]
    Io {
        /// The destination path.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// HTTP-based downloader using `ureq`.
pub struct HttpDownloader {
    config: Config,
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Build a downloader for the endpoints and timeout in `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .build();
        Self {
            config: config.clone(),
            agent: ureq::Agent::new_with_config(agent_config),
        }
    }
}

impl ArtefactDownloader for HttpDownloader {
    fn fetch_index(&self, include_all: bool) -> Result<String, DownloadError> {
        let url = self.config.index_url_for(include_all);
        log::debug!("fetching release index from {url}");
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| map_ureq_error(&url, &e))?;
        let mut body = response.into_body();
        body.with_config()
            .limit(INDEX_BODY_LIMIT)
            .read_to_string()
            .map_err(|e| DownloadError::HttpError {
                url,
                reason: e.to_string(),
            })
    }

    fn download_artefact(&self, filename: &str, dest: &Path) -> Result<(), DownloadError> {
        let url = self.config.artefact_url(filename);
        log::debug!("downloading {url} to {}", dest.display());
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| map_ureq_error(&url, &e))?;
        let mut file = File::create(dest).map_err(|source| write_error(dest, source))?;
        let mut body = response.into_body();
        copy_body(&mut body.as_reader(), &mut file, &url, dest)
    }
}

/// Stream `reader` into `writer`, attributing read failures to the network
/// and write failures to the local file.
fn copy_body(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    url: &str,
    dest: &Path,
) -> Result<(), DownloadError> {
    let mut buffer = vec![0u8; COPY_BUFFER_LEN];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| DownloadError::HttpError {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;
        if bytes_read == 0 {
            return writer.flush().map_err(|source| write_error(dest, source));
        }
        writer
            .write_all(buffer.get(..bytes_read).unwrap_or_default())
            .map_err(|source| write_error(dest, source))?;
    }
}

fn write_error(dest: &Path, source: io::Error) -> DownloadError {
    DownloadError::Io {
        path: dest.display().to_string(),
        source,
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
