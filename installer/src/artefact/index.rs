//! Release index schema and parsing.
//!
//! The index is a JSON array of release records, newest first:
//!
//! ```json
//! [
//!   {
//!     "version": "go1.22.3",
//!     "stable": true,
//!     "files": [
//!       {
//!         "filename": "go1.22.3.linux-amd64.tar.gz",
//!         "os": "linux",
//!         "arch": "amd64",
//!         "version": "go1.22.3",
//!         "sha256": "8920ea521bad8f6b7bc377b4824982e011c19af27df88a815e3586ea895f1b36",
//!         "size": 68958945,
//!         "kind": "archive"
//!       }
//!     ]
//!   }
//! ]
//! ```
//!
//! File fields stay as plain strings: the live index also carries `source`
//! entries with empty `os`/`arch`, which must parse but never match a
//! request.

use super::platform::{Arch, Kind, Os};
use serde::Deserialize;

/// One downloadable file within a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactFile {
    /// File name relative to the download base URL.
    pub filename: String,
    /// Operating system identifier (empty for source archives).
    #[serde(default)]
    pub os: String,
    /// Architecture identifier (empty for source archives).
    #[serde(default)]
    pub arch: String,
    /// Lower-case hex SHA-256 of the file.
    pub sha256: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Packaging form (`archive`, `installer`, `source`).
    pub kind: String,
}

impl ArtifactFile {
    /// Whether this file matches the triple exactly.
    ///
    /// `arch` is compared as given; callers apply [`Arch::normalized`]
    /// first.
    #[must_use]
    pub fn matches(&self, os: Os, arch: Arch, kind: Kind) -> bool {
        self.os == os.as_str() && self.arch == arch.as_str() && self.kind == kind.as_str()
    }
}

/// A single release record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactVersion {
    /// Version string such as `go1.22.3`.
    pub version: String,
    /// Whether the release is generally available.
    pub stable: bool,
    /// Files published for this release.
    #[serde(default)]
    pub files: Vec<ArtifactFile>,
}

impl ArtifactVersion {
    /// Find the file matching the triple, if any.
    #[must_use]
    pub fn find_file(&self, os: Os, arch: Arch, kind: Kind) -> Option<&ArtifactFile> {
        self.files.iter().find(|file| file.matches(os, arch, kind))
    }
}

/// The release index, in the order the server listed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ArtifactIndex {
    versions: Vec<ArtifactVersion>,
}

impl ArtifactIndex {
    /// Build an index from release records.
    #[must_use]
    pub fn new(versions: Vec<ArtifactVersion>) -> Self {
        Self { versions }
    }

    /// All release records, in listed order.
    #[must_use]
    pub fn versions(&self) -> &[ArtifactVersion] {
        &self.versions
    }

    /// Iterate over releases marked stable.
    pub fn stable(&self) -> impl Iterator<Item = &ArtifactVersion> {
        self.versions.iter().filter(|v| v.stable)
    }

    /// Find a release by its exact version string.
    #[must_use]
    pub fn find_version(&self, version: &str) -> Option<&ArtifactVersion> {
        self.versions.iter().find(|v| v.version == version)
    }
}

/// Errors arising from index parsing.
#[derive(Debug, thiserror::Error)]
pub enum IndexParseError {
    /// JSON deserialization failed.
    #[error("index parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse the JSON body of the release index.
///
/// # Errors
///
/// Returns [`IndexParseError`] if the body is not a JSON array of release
/// records.
///
/// # Examples
///
/// ```
/// use getgo::artefact::index::parse_index;
///
/// let json = r#"[{"version":"go1.22.3","stable":true,"files":[]}]"#;
/// let index = parse_index(json).expect("valid index");
/// assert_eq!(index.versions().len(), 1);
/// ```
pub fn parse_index(json: &str) -> Result<ArtifactIndex, IndexParseError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE_SHAPE: &str = r#"[
        {
            "version": "go1.22.3",
            "stable": true,
            "files": [
                {
                    "filename": "go1.22.3.src.tar.gz",
                    "os": "",
                    "arch": "",
                    "version": "go1.22.3",
                    "sha256": "80648ef34f903193d72a59c0dff019f5f98ae0c9aa13ade0b0ecbff991a76f68",
                    "size": 27552288,
                    "kind": "source"
                },
                {
                    "filename": "go1.22.3.linux-amd64.tar.gz",
                    "os": "linux",
                    "arch": "amd64",
                    "version": "go1.22.3",
                    "sha256": "8920ea521bad8f6b7bc377b4824982e011c19af27df88a815e3586ea895f1b36",
                    "size": 68958945,
                    "kind": "archive"
                }
            ]
        },
        {
            "version": "go1.23rc1",
            "stable": false,
            "files": []
        }
    ]"#;

    #[test]
    fn parses_live_index_shape() {
        let index = parse_index(LIVE_SHAPE).expect("valid index");
        assert_eq!(index.versions().len(), 2);
        let first = index.versions().first().expect("first release");
        assert_eq!(first.version, "go1.22.3");
        assert!(first.stable);
        assert_eq!(first.files.len(), 2);
    }

    #[test]
    fn source_entries_never_match() {
        let index = parse_index(LIVE_SHAPE).expect("valid index");
        let release = index.find_version("go1.22.3").expect("release");
        let file = release
            .find_file(Os::Linux, Arch::Amd64, Kind::Archive)
            .expect("linux archive");
        assert_eq!(file.filename, "go1.22.3.linux-amd64.tar.gz");
        assert!(
            release
                .files
                .iter()
                .filter(|f| f.kind == "source")
                .all(|f| !f.matches(Os::Linux, Arch::Amd64, Kind::Archive))
        );
    }

    #[test]
    fn stable_filters_unstable_releases() {
        let index = parse_index(LIVE_SHAPE).expect("valid index");
        let stable: Vec<_> = index.stable().map(|v| v.version.as_str()).collect();
        assert_eq!(stable, vec!["go1.22.3"]);
    }

    #[test]
    fn built_index_keeps_listed_order() {
        let release = |version: &str, stable| ArtifactVersion {
            version: version.to_owned(),
            stable,
            files: Vec::new(),
        };
        let index = ArtifactIndex::new(vec![
            release("go1.21.10", true),
            release("go1.23rc1", false),
            release("go1.22.3", true),
        ]);

        let stable: Vec<_> = index.stable().map(|v| v.version.as_str()).collect();
        assert_eq!(stable, vec!["go1.21.10", "go1.22.3"]);
        assert!(index.find_version("go1.23rc1").is_some());
        assert!(index.find_version("1.22.3").is_none());
        assert!(ArtifactIndex::new(Vec::new()).stable().next().is_none());
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"[{"version":"go1.0","stable":true,"files":[
            {"filename":"f","sha256":"x","kind":"source"}]}]"#;
        let index = parse_index(json).expect("valid index");
        let file = index
            .versions()
            .first()
            .and_then(|v| v.files.first())
            .expect("file");
        assert_eq!(file.size, 0);
        assert!(file.os.is_empty());
    }

    #[test]
    fn rejects_invalid_json_syntax() {
        assert!(parse_index("<html>not json</html>").is_err());
    }

    #[test]
    fn rejects_non_array_body() {
        assert!(parse_index(r#"{"version":"go1.22.3"}"#).is_err());
    }
}
