//! Output helpers for the getgo CLI.
//!
//! Progress and errors go to stderr; the only stdout output is the name of
//! the downloaded file, so the binary composes in shell pipelines.

use crate::artefact::descriptor::ArtifactDescriptor;
use crate::pipeline::FetchRequest;
use std::io::Write;

/// Write a line to stderr, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Write a line to stdout, ignoring write failures.
pub fn write_stdout_line(stdout: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stdout, "{message}").is_err() {
        // A closed pipe is not an installation failure.
    }
}

/// Dry-run summary of what would be fetched.
///
/// # Example
///
/// ```
/// use getgo::artefact::descriptor::ArtifactDescriptor;
/// use getgo::output::DryRunInfo;
/// use getgo::pipeline::FetchRequest;
///
/// let descriptor = ArtifactDescriptor::new("go1.22.3", "go1.22.3.linux-amd64.tar.gz", "abc");
/// let request = FetchRequest::default();
/// let info = DryRunInfo {
///     descriptor: &descriptor,
///     request: &request,
///     url: "https://go.dev/dl/go1.22.3.linux-amd64.tar.gz",
/// };
///
/// let output = info.display_text();
/// assert!(output.contains("Dry run"));
/// assert!(output.contains("go1.22.3.linux-amd64.tar.gz"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// The resolved file.
    pub descriptor: &'a ArtifactDescriptor,
    /// Where the file would be written and unpacked.
    pub request: &'a FetchRequest,
    /// Full download URL.
    pub url: &'a str,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        let dest_dir = self
            .request
            .dest_dir
            .as_ref()
            .map_or_else(|| ".".to_owned(), |dir| dir.display().to_string());
        let extract_dir = self
            .request
            .extract_dir
            .as_ref()
            .map_or_else(|| "(no extraction)".to_owned(), |dir| dir.display().to_string());
        let lines = [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Version: {}", self.descriptor.version()),
            format!("File: {}", self.descriptor.filename()),
            format!("SHA-256: {}", self.descriptor.checksum()),
            format!("URL: {}", self.url),
            format!("Destination directory: {dest_dir}"),
            format!("Extract into: {extract_dir}"),
        ];

        lines.join("\n")
    }
}
