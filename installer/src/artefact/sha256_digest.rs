//! SHA-256 digest newtype and file hashing for artefact verification.
//!
//! Validates that the value is a 64-character lowercase hexadecimal string
//! representing a 256-bit hash digest, and computes that digest over a file
//! in fixed-size chunks.

use super::error::{ArtefactError, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// A validated hex-encoded SHA-256 digest string.
///
/// # Examples
///
/// ```
/// use getgo::artefact::sha256_digest::Sha256Digest;
///
/// let hex = "a".repeat(64);
/// let digest: Sha256Digest = hex.as_str().try_into().expect("valid digest");
/// assert_eq!(digest.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether this digest equals `expected` exactly.
    ///
    /// Comparison is case-sensitive: an upper-case expected value never
    /// matches, because computed digests are always lower-case.
    #[must_use]
    pub fn matches(&self, expected: &str) -> bool {
        self.0 == expected
    }

    /// Hash an in-memory buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use getgo::artefact::sha256_digest::Sha256Digest;
    ///
    /// let digest = Sha256Digest::of_bytes(b"hello world\n");
    /// assert_eq!(
    ///     digest.as_str(),
    ///     "a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447"
    /// );
    /// ```
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(bytes))
    }

    /// Lower-case hex of a finished hasher. `sha2` always produces 64 valid
    /// characters, so no validation is needed.
    fn from_hasher(hasher: Sha256) -> Self {
        Self(format!("{:x}", hasher.finalize()))
    }
}

/// Compute the SHA-256 digest of a file.
///
/// Reads the file at `path` in chunks and returns the lowercase hex
/// digest. The file handle is closed before returning.
///
/// # Errors
///
/// Returns the underlying [`io::Error`] if the file cannot be opened or read.
pub fn compute_sha256(path: &Path) -> io::Result<Sha256Digest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(Sha256Digest::from_hasher(hasher))
}

impl TryFrom<&str> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        validate_sha256(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded SHA-256 digest.
fn validate_sha256(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: "digest must be lowercase".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_digest() -> String {
        "a".repeat(64)
    }

    #[test]
    fn accepts_valid_sixty_four_char_hex() {
        let digest = Sha256Digest::try_from(valid_digest().as_str());
        assert!(digest.is_ok());
    }

    #[test]
    fn rejects_too_short() {
        let result = Sha256Digest::try_from("abcdef");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_too_long() {
        let long = "a".repeat(65);
        let result = Sha256Digest::try_from(long.as_str());
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_hex_characters() {
        let mut bad = "a".repeat(63);
        bad.push('g');
        let result = Sha256Digest::try_from(bad.as_str());
        assert!(result.is_err());
    }

    #[test]
    fn rejects_uppercase_hex() {
        let mut bad = "A".repeat(64);
        bad.truncate(64);
        let result = Sha256Digest::try_from(bad.as_str());
        assert!(result.is_err());
    }

    #[test]
    fn display_shows_full_digest() {
        let hex = valid_digest();
        let digest = Sha256Digest::try_from(hex.as_str()).expect("known good");
        assert_eq!(format!("{digest}"), hex);
    }

    #[test]
    fn from_owned_string_accepts_valid() {
        let digest = Sha256Digest::try_from(valid_digest());
        assert!(digest.is_ok());
    }

    #[test]
    fn compute_sha256_hashes_file_contents() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("hello.txt");
        fs::write(&path, b"hello world\n").expect("write file");

        let digest = compute_sha256(&path).expect("hash file");
        assert_eq!(
            digest.as_str(),
            "a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447"
        );
        assert_eq!(digest, Sha256Digest::of_bytes(b"hello world\n"));
    }

    #[test]
    fn compute_sha256_spans_multiple_chunks() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("big.bin");
        let content = vec![7u8; 8192 * 3 + 17];
        fs::write(&path, &content).expect("write file");

        let digest = compute_sha256(&path).expect("hash file");
        assert_eq!(digest, Sha256Digest::of_bytes(&content));
    }

    #[test]
    fn compute_sha256_fails_for_missing_file() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let result = compute_sha256(&temp_dir.path().join("absent"));
        assert!(result.is_err());
    }

    #[test]
    fn matches_is_case_sensitive() {
        let digest = Sha256Digest::of_bytes(b"data");
        assert!(digest.matches(digest.as_str()));
        assert!(!digest.matches(&digest.as_str().to_uppercase()));
    }
}
