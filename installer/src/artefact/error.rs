//! Error types for artefact-related value validation.
//!
//! Each variant provides a descriptive message identifying the invalid input
//! and the constraint that was violated.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// An OS, architecture, or kind identifier is not in the supported set.
    #[error("unsupported {kind} \"{value}\"; expected one of: {expected}")]
    UnsupportedPlatform {
        /// Which identifier was rejected (`operating system`, `architecture`, `kind`).
        kind: &'static str,
        /// The rejected identifier.
        value: String,
        /// Comma-separated list of accepted identifiers.
        expected: String,
    },

    /// A SHA-256 digest is not a valid 64-character hex string.
    #[error("invalid SHA-256 digest: {reason}")]
    InvalidSha256Digest {
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
