//! CLI argument definitions for getgo.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::artefact::platform::{Arch, Kind, Os};
use crate::error::Result;
use crate::pipeline::FetchRequest;
use crate::resolver::ResolveRequest;
use camino::{Utf8Path, Utf8PathBuf};
use std::time::Duration;

use clap::Parser;

/// Download, verify, and unpack the latest stable Go release.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "getgo")]
#[command(version, about)]
#[command(long_about = concat!(
    "Download, verify, and unpack the latest stable Go release.\n\n",
    "getgo reads the official release index, picks the newest stable release ",
    "for the requested platform, downloads it, and checks its SHA-256 digest ",
    "against the index before anything else touches it. A file that is already ",
    "present with the right digest is not downloaded again.\n\n",
    "Archives (.tar.gz, .zip) can be unpacked with --extract. Extraction never ",
    "overwrites an existing file.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  GETGO_INDEX_URL       Release index URL\n",
    "  GETGO_DOWNLOAD_URL    Base URL release files are fetched from\n",
    "  GETGO_TIMEOUT_SECS    HTTP timeout in seconds\n",
    "  RUST_LOG              Log filter (overrides -v)\n\n",
    "EXAMPLES:\n",
    "  Download the latest archive for this machine:\n",
    "    $ getgo\n\n",
    "  Download and unpack into /usr/local:\n",
    "    $ getgo --dir /tmp --extract /usr/local\n\n",
    "  Fetch the macOS installer for Apple silicon:\n",
    "    $ getgo --os darwin --arch arm64 --kind installer\n\n",
    "  Pin a release:\n",
    "    $ getgo --go-version 1.21.10\n\n",
    "  Preview without downloading:\n",
    "    $ getgo --dry-run",
))]
pub struct Cli {
    /// Directory to download into [default: current directory].
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<Utf8PathBuf>,

    /// Unpack the archive into DIR after verification.
    #[arg(short = 'x', long, value_name = "DIR")]
    pub extract: Option<Utf8PathBuf>,

    /// Packaging form to download.
    #[arg(short, long, value_name = "KIND", default_value = "archive")]
    pub kind: Kind,

    /// Target operating system [default: host].
    #[arg(long, value_name = "OS")]
    pub os: Option<Os>,

    /// Target architecture [default: host].
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<Arch>,

    /// Download this release instead of the latest stable one.
    #[arg(long = "go-version", value_name = "VERSION")]
    pub go_version: Option<String>,

    /// Read settings from a TOML file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Override the release index URL.
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,

    /// Override the base URL release files are fetched from.
    #[arg(long = "download-url", value_name = "URL")]
    pub download_url: Option<String>,

    /// Override the HTTP timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Do not print the downloaded file name to stdout.
    #[arg(long)]
    pub no_show: bool,

    /// Resolve and show what would be downloaded, then exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Build the resolve request, filling OS and architecture from the host
    /// when not given.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::InstallerError::UnsupportedPlatform`] when a
    /// host value is needed but has no index identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use getgo::artefact::platform::{Arch, Kind, Os};
    /// use getgo::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["getgo", "--os", "linux", "--arch", "arm"]);
    /// let request = cli.resolve_request().expect("explicit platform");
    /// assert_eq!((request.os, request.arch, request.kind), (Os::Linux, Arch::Arm, Kind::Archive));
    /// ```
    pub fn resolve_request(&self) -> Result<ResolveRequest> {
        let os = self.os.map_or_else(Os::host, Ok)?;
        let arch = self.arch.map_or_else(Arch::host, Ok)?;
        let mut request = ResolveRequest::new(os, arch, self.kind);
        if let Some(version) = &self.go_version {
            request = request.with_version(version);
        }
        Ok(request)
    }

    /// Build the fetch request from the directory flags.
    #[must_use]
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            dest_dir: non_empty(self.dir.as_ref()),
            extract_dir: non_empty(self.extract.as_ref()),
            quiet: self.quiet,
        }
    }

    /// The configuration file path, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<&std::path::Path> {
        self.config.as_deref().map(Utf8Path::as_std_path)
    }

    /// The timeout override, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn non_empty(path: Option<&Utf8PathBuf>) -> Option<std::path::PathBuf> {
    path.filter(|p| !p.as_str().is_empty())
        .map(|p| p.as_std_path().to_path_buf())
}
