//! Release selection.
//!
//! Fetches the release index and picks the single file matching an
//! `(os, arch, kind)` request: from the greatest stable release by default,
//! or from an exact pinned release.

use crate::artefact::descriptor::ArtifactDescriptor;
use crate::artefact::download::{ArtefactDownloader, HttpDownloader};
use crate::artefact::index::{ArtifactIndex, ArtifactVersion, parse_index};
use crate::artefact::platform::{Arch, Kind, Os};
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::version::{canonical_version, compare_versions};
use crate::config::Config;
use crate::error::{InstallerError, Result};
use std::cmp::Ordering;

/// What to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Target operating system.
    pub os: Os,
    /// Target architecture, before alias normalization.
    pub arch: Arch,
    /// Packaging form.
    pub kind: Kind,
    /// Exact release to use instead of the latest stable one.
    pub version: Option<String>,
}

impl ResolveRequest {
    /// Request the latest stable release for an explicit triple.
    #[must_use]
    pub fn new(os: Os, arch: Arch, kind: Kind) -> Self {
        Self {
            os,
            arch,
            kind,
            version: None,
        }
    }

    /// Request the latest stable archive for the host platform.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::UnsupportedPlatform`] when the host OS or
    /// architecture has no index identifier.
    pub fn for_host() -> Result<Self> {
        Ok(Self::new(Os::host()?, Arch::host()?, Kind::default()))
    }

    /// Pin the request to a release; the `go` prefix is optional.
    #[must_use]
    pub fn with_version(mut self, version: impl AsRef<str>) -> Self {
        self.version = Some(canonical_version(version.as_ref()));
        self
    }
}

/// Resolve `request` against the index served by `config`.
///
/// # Errors
///
/// Returns [`InstallerError::Network`] or [`InstallerError::NotFound`] if
/// the index cannot be fetched, [`InstallerError::Parse`] if it is
/// malformed, and any error from [`select_artifact`].
pub fn resolve(config: &Config, request: &ResolveRequest) -> Result<ArtifactDescriptor> {
    resolve_with(&HttpDownloader::new(config), request)
}

/// Testable inner function with an injected downloader.
///
/// A pinned request asks for the full release history, since the default
/// index only lists the current release lines.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_with(
    downloader: &dyn ArtefactDownloader,
    request: &ResolveRequest,
) -> Result<ArtifactDescriptor> {
    let body = downloader.fetch_index(request.version.is_some())?;
    let index = parse_index(&body)?;
    log::debug!("release index lists {} version(s)", index.versions().len());
    select_artifact(&index, request)
}

/// Pick the file for `request` from an already parsed index.
///
/// # Errors
///
/// - [`InstallerError::NoStableVersion`] if nothing is marked stable and no
///   version is pinned.
/// - [`InstallerError::VersionNotFound`] if the pinned version is absent.
/// - [`InstallerError::NoMatchingArtifact`] if the chosen release has no
///   file for the triple.
///
/// # Examples
///
/// ```
/// use getgo::artefact::index::parse_index;
/// use getgo::artefact::platform::{Arch, Kind, Os};
/// use getgo::resolver::{ResolveRequest, select_artifact};
///
/// let index = parse_index(r#"[{"version":"go1.22.3","stable":true,"files":[
///     {"filename":"go1.22.3.linux-armv6l.tar.gz","os":"linux","arch":"armv6l",
///      "sha256":"abc","kind":"archive"}]}]"#).expect("index");
/// let request = ResolveRequest::new(Os::Linux, Arch::Arm, Kind::Archive);
/// let descriptor = select_artifact(&index, &request).expect("match");
/// assert_eq!(descriptor.filename(), "go1.22.3.linux-armv6l.tar.gz");
/// ```
pub fn select_artifact(
    index: &ArtifactIndex,
    request: &ResolveRequest,
) -> Result<ArtifactDescriptor> {
    let release = match &request.version {
        Some(version) => index
            .find_version(version)
            .ok_or_else(|| InstallerError::VersionNotFound {
                version: version.clone(),
            })?,
        None => latest_stable(index).ok_or(InstallerError::NoStableVersion)?,
    };
    log::info!("selected release {}", release.version);

    let arch = request.arch.normalized();
    if arch != request.arch {
        log::debug!("architecture {} matched as {arch}", request.arch);
    }
    let file = release
        .find_file(request.os, arch, request.kind)
        .ok_or_else(|| InstallerError::NoMatchingArtifact {
            os: request.os,
            arch,
            kind: request.kind,
            version: release.version.clone(),
        })?;
    if let Err(e) = Sha256Digest::try_from(file.sha256.as_str()) {
        log::warn!("index lists a malformed checksum for {}: {e}", file.filename);
    }
    Ok(ArtifactDescriptor::from_index(release, file))
}

/// The greatest stable release; on equal versions the later-listed one wins.
fn latest_stable(index: &ArtifactIndex) -> Option<&ArtifactVersion> {
    index.stable().fold(None, |best, candidate| match best {
        Some(current)
            if compare_versions(&candidate.version, &current.version) == Ordering::Less =>
        {
            Some(current)
        }
        _ => Some(candidate),
    })
}
