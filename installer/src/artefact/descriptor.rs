//! The resolved download target.

use super::index::{ArtifactFile, ArtifactVersion};
use std::fmt;

/// The file selected for a request: what to download and what it must hash
/// to.
///
/// # Examples
///
/// ```
/// use getgo::artefact::descriptor::ArtifactDescriptor;
///
/// let descriptor = ArtifactDescriptor::new("go1.22.3", "go1.22.3.linux-amd64.tar.gz", "abc");
/// assert_eq!(descriptor.filename(), "go1.22.3.linux-amd64.tar.gz");
/// assert_eq!(descriptor.checksum(), "abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    version: String,
    filename: String,
    checksum: String,
}

impl ArtifactDescriptor {
    /// Build a descriptor from its parts.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        filename: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            filename: filename.into(),
            checksum: checksum.into(),
        }
    }

    /// Build a descriptor from a matched index entry.
    #[must_use]
    pub fn from_index(release: &ArtifactVersion, file: &ArtifactFile) -> Self {
        Self::new(&release.version, &file.filename, &file.sha256)
    }

    /// Release version the file belongs to.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// File name relative to the download base URL.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Expected lower-case hex SHA-256.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (sha256 {})", self.filename, self.checksum)
    }
}
