//! Release index model, download, verification, and extraction.
//!
//! This module holds the type-safe domain model for Go release files and
//! the I/O seams the resolver and pipeline are built from.
//!
//! # Sub-modules
//!
//! - [`descriptor`] — The resolved download target (`ArtifactDescriptor`).
//! - [`download`] — Index and file download trait with an HTTP implementation.
//! - [`error`] — Semantic error types for validation failures.
//! - [`extraction`] — Archive extraction with path traversal protection.
//! - [`index`] — Release index schema and JSON parsing.
//! - [`platform`] — Operating system, architecture, and kind identifiers.
//! - [`sha256_digest`] — SHA-256 digest newtype and file hashing.
//! - [`version`] — Release version ordering.

pub mod descriptor;
pub mod download;
pub mod error;
pub mod extraction;
pub mod index;
pub mod platform;
pub mod sha256_digest;
pub mod version;
