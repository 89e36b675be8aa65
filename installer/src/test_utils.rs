//! Shared test utilities for the installer crate.
//!
//! Builds synthetic release indices and archives so that resolver, pipeline,
//! and extraction tests can run without network access.

use crate::artefact::sha256_digest::Sha256Digest;
use serde_json::{Value, json};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Return the lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256Digest::of_bytes(bytes).into_inner()
}

/// Build one file record of a release index.
#[must_use]
pub fn index_file(os: &str, arch: &str, kind: &str, filename: &str, sha256: &str) -> Value {
    json!({
        "filename": filename,
        "os": os,
        "arch": arch,
        "sha256": sha256,
        "size": 1024,
        "kind": kind,
    })
}

/// Build one release record of a release index.
#[must_use]
pub fn release(version: &str, stable: bool, files: Vec<Value>) -> Value {
    json!({
        "version": version,
        "stable": stable,
        "files": files,
    })
}

/// Serialize release records into an index body.
#[must_use]
pub fn index_json(releases: Vec<Value>) -> String {
    Value::Array(releases).to_string()
}

/// A release whose files follow the real naming scheme
/// (`go1.22.3.linux-amd64.tar.gz`), with checksums derived from the
/// filename so every entry is distinct.
#[must_use]
pub fn standard_release(version: &str, stable: bool) -> Value {
    let platforms = [
        ("linux", "amd64", "archive", "tar.gz"),
        ("linux", "arm64", "archive", "tar.gz"),
        ("linux", "armv6l", "archive", "tar.gz"),
        ("linux", "386", "archive", "tar.gz"),
        ("darwin", "arm64", "archive", "tar.gz"),
        ("darwin", "arm64", "installer", "pkg"),
        ("darwin", "amd64", "installer", "pkg"),
        ("windows", "amd64", "archive", "zip"),
        ("windows", "amd64", "installer", "msi"),
        ("freebsd", "amd64", "archive", "tar.gz"),
    ];
    let mut files: Vec<Value> = platforms
        .iter()
        .map(|(os, arch, kind, ext)| {
            let filename = format!("{version}.{os}-{arch}.{ext}");
            let sha = sha256_hex(filename.as_bytes());
            index_file(os, arch, kind, &filename, &sha)
        })
        .collect();
    let source = format!("{version}.src.tar.gz");
    files.push(index_file("", "", "source", &source, &sha256_hex(source.as_bytes())));
    release(version, stable, files)
}

/// An entry to place in a synthetic archive.
#[derive(Debug, Clone)]
pub enum ArchiveEntry<'a> {
    /// A directory entry with mode `0o755`.
    Dir(&'a str),
    /// A regular file with the given permission bits.
    File {
        /// Path inside the archive.
        name: &'a str,
        /// File contents.
        contents: &'a [u8],
        /// Permission bits.
        mode: u32,
    },
}

impl<'a> ArchiveEntry<'a> {
    /// A regular file with mode `0o644`.
    #[must_use]
    pub const fn file(name: &'a str, contents: &'a [u8]) -> Self {
        Self::File {
            name,
            contents,
            mode: 0o644,
        }
    }
}

/// Write a `.tar.gz` archive containing `entries` to `path`.
///
/// # Errors
///
/// Returns an error if the archive cannot be written.
pub fn write_tar_gz(path: &Path, entries: &[ArchiveEntry<'_>]) -> io::Result<()> {
    let encoder = flate2::write::GzEncoder::new(File::create(path)?, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for entry in entries {
        let mut header = tar::Header::new_gnu();
        match entry {
            ArchiveEntry::Dir(name) => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                builder.append_data(&mut header, name, io::empty())?;
            }
            ArchiveEntry::File {
                name,
                contents,
                mode,
            } => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(*mode);
                header.set_size(contents.len() as u64);
                builder.append_data(&mut header, name, *contents)?;
            }
        }
    }
    builder.into_inner()?.finish()?.flush()
}

/// Write a `.zip` archive containing `entries` to `path`.
///
/// # Errors
///
/// Returns an error if the archive cannot be written.
pub fn write_zip(path: &Path, entries: &[ArchiveEntry<'_>]) -> io::Result<()> {
    let mut writer = zip::ZipWriter::new(File::create(path)?);
    for entry in entries {
        match entry {
            ArchiveEntry::Dir(name) => {
                let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
                writer.add_directory(*name, options).map_err(io::Error::other)?;
            }
            ArchiveEntry::File {
                name,
                contents,
                mode,
            } => {
                let options = zip::write::SimpleFileOptions::default().unix_permissions(*mode);
                writer.start_file(*name, options).map_err(io::Error::other)?;
                writer.write_all(contents)?;
            }
        }
    }
    writer.finish().map_err(io::Error::other)?.flush()
}
