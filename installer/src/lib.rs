//! getgo installer library.
//!
//! This crate resolves the latest stable Go release for a platform from the
//! official release index, downloads it with a SHA-256 check, and optionally
//! unpacks it without overwriting existing files. It is used by the `getgo`
//! CLI binary and can be consumed programmatically for testing or custom
//! installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Release index model, download, hashing, and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Endpoint and transport configuration
//! - [`error`] - Semantic error types
//! - [`output`] - Progress and dry-run output
//! - [`pipeline`] - Fetch, verify, and extract orchestration
//! - [`resolver`] - Release selection for a platform triple

pub mod artefact;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod resolver;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
