//! BDD tests for the fetch-verify-extract pipeline with real extraction.

use getgo::artefact::download::{ArtefactDownloader, DownloadError};
use getgo::artefact::extraction::ArchiveExtractor;
use getgo::error::InstallerError;
use getgo::pipeline::{FetchRequest, fetch_verify_extract_with};
use getgo::test_utils::{ArchiveEntry, sha256_hex, write_tar_gz, write_zip};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

const ENTRY_CONTENTS: &[u8] = b"release contents\n";
const LOCAL_EDIT: &str = "edited locally";

/// A stub [`ArtefactDownloader`] serving one file from memory.
struct StubServer {
    filename: String,
    body: Option<Vec<u8>>,
    corrupt: bool,
    requests: Cell<usize>,
}

impl ArtefactDownloader for StubServer {
    fn fetch_index(&self, _include_all: bool) -> Result<String, DownloadError> {
        panic!("the pipeline must not fetch the index");
    }

    fn download_artefact(&self, filename: &str, dest: &Path) -> Result<(), DownloadError> {
        self.requests.set(self.requests.get() + 1);
        let url = format!("https://go.dev/dl/{filename}");
        let body = match (&self.body, filename == self.filename) {
            (Some(body), true) => body,
            _ => return Err(DownloadError::NotFound { url }),
        };
        let served: &[u8] = if self.corrupt { b"corrupted" } else { body };
        fs::write(dest, served).map_err(|source| DownloadError::Io {
            path: dest.display().to_string(),
            source,
        })
    }
}

struct PipelineWorld {
    temp_dir: tempfile::TempDir,
    server: Option<StubServer>,
    checksum: String,
    result: Option<Result<PathBuf, InstallerError>>,
}

impl PipelineWorld {
    fn dest_dir(&self) -> PathBuf {
        self.temp_dir.path().join("downloads")
    }

    fn extract_dir(&self) -> PathBuf {
        self.temp_dir.path().join("goroot")
    }

    fn server(&self) -> &StubServer {
        self.server.as_ref().expect("server configured")
    }

    fn run(&mut self, extract: bool) {
        let request = FetchRequest {
            dest_dir: Some(self.dest_dir()),
            extract_dir: extract.then(|| self.extract_dir()),
            quiet: true,
        };
        let server = self.server();
        let mut stderr = Vec::new();
        let result = fetch_verify_extract_with(
            server,
            &ArchiveExtractor,
            &request,
            &server.filename,
            &self.checksum,
            &mut stderr,
        );
        self.result = Some(result);
    }

    fn error(&self) -> &InstallerError {
        match self.result.as_ref().expect("pipeline ran") {
            Ok(path) => panic!("expected an error, got {}", path.display()),
            Err(err) => err,
        }
    }
}

/// Build the bytes a release file named `filename` would contain.
fn release_body(work: &Path, filename: &str, entry: &str) -> Vec<u8> {
    let path = work.join(filename);
    let entries = [ArchiveEntry::file(entry, ENTRY_CONTENTS)];
    if filename.ends_with(".tar.gz") {
        write_tar_gz(&path, &entries).expect("write tar.gz");
    } else if filename.ends_with(".zip") {
        write_zip(&path, &entries).expect("write zip");
    } else {
        fs::write(&path, ENTRY_CONTENTS).expect("write payload");
    }
    let body = fs::read(&path).expect("read body");
    fs::remove_file(&path).expect("remove staging copy");
    body
}

#[fixture]
fn world() -> PipelineWorld {
    PipelineWorld {
        temp_dir: tempfile::tempdir().expect("temp dir"),
        server: None,
        checksum: String::new(),
        result: None,
    }
}

#[given("a server publishing \"{filename}\" containing \"{entry}\"")]
fn given_server(world: &mut PipelineWorld, filename: String, entry: String) {
    let body = release_body(world.temp_dir.path(), &filename, &entry);
    world.checksum = sha256_hex(&body);
    world.server = Some(StubServer {
        filename,
        body: Some(body),
        corrupt: false,
        requests: Cell::new(0),
    });
}

#[given("a server without \"{filename}\"")]
fn given_missing(world: &mut PipelineWorld, filename: String) {
    world.checksum = "0".repeat(64);
    world.server = Some(StubServer {
        filename,
        body: None,
        corrupt: false,
        requests: Cell::new(0),
    });
}

#[given("the server corrupts the file in transit")]
fn given_corrupt(world: &mut PipelineWorld) {
    if let Some(server) = world.server.as_mut() {
        server.corrupt = true;
    }
}

#[when("the pipeline runs with extraction")]
fn when_run_extracting(world: &mut PipelineWorld) {
    world.run(true);
}

#[when("the pipeline runs without extraction")]
fn when_run_plain(world: &mut PipelineWorld) {
    world.run(false);
}

#[when("the extracted \"{entry}\" is edited locally")]
fn when_edited(world: &mut PipelineWorld, entry: String) {
    fs::write(world.extract_dir().join(entry), LOCAL_EDIT).expect("edit extracted file");
}

#[then("the pipeline succeeds")]
fn then_succeeds(world: &mut PipelineWorld) {
    let result = world.result.as_ref().expect("pipeline ran");
    assert!(result.is_ok(), "expected success, got {result:?}");
}

#[then("the download is kept in the destination directory")]
fn then_download_kept(world: &mut PipelineWorld) {
    let expected = world.dest_dir().join(&world.server().filename);
    match world.result.as_ref().expect("pipeline ran") {
        Ok(path) => assert_eq!(*path, expected),
        Err(err) => panic!("expected success, got {err:?}"),
    }
    assert!(expected.is_file());
}

#[then("the download is absent from the destination directory")]
fn then_download_absent(world: &mut PipelineWorld) {
    assert!(!world.dest_dir().join(&world.server().filename).exists());
}

#[then("the extraction directory contains \"{entry}\"")]
fn then_extracted(world: &mut PipelineWorld, entry: String) {
    let contents = fs::read(world.extract_dir().join(entry)).expect("read extracted file");
    assert_eq!(contents, ENTRY_CONTENTS);
}

#[then("nothing was extracted")]
fn then_nothing_extracted(world: &mut PipelineWorld) {
    assert!(!world.extract_dir().exists());
}

#[then("the server was asked for the file {count} time")]
fn then_request_count(world: &mut PipelineWorld, count: usize) {
    assert_eq!(world.server().requests.get(), count);
}

#[then("the pipeline fails with a checksum mismatch")]
fn then_checksum_mismatch(world: &mut PipelineWorld) {
    match world.error() {
        InstallerError::ChecksumMismatch {
            expected, actual, ..
        } => {
            assert_eq!(*expected, world.checksum);
            assert_eq!(*actual, sha256_hex(b"corrupted"));
        }
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }
}

#[then("the pipeline fails with a destination conflict")]
fn then_conflict(world: &mut PipelineWorld) {
    assert!(matches!(
        world.error(),
        InstallerError::DestinationConflict { .. }
    ));
}

#[then("the extracted \"{entry}\" keeps the local edit")]
fn then_local_edit_kept(world: &mut PipelineWorld, entry: String) {
    let contents =
        fs::read_to_string(world.extract_dir().join(entry)).expect("read extracted file");
    assert_eq!(contents, LOCAL_EDIT);
}

#[then("the pipeline fails with not found")]
fn then_not_found(world: &mut PipelineWorld) {
    assert!(matches!(world.error(), InstallerError::NotFound { .. }));
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Fresh download is verified and unpacked"
)]
fn scenario_fresh_download(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "A verified file is not downloaded twice"
)]
fn scenario_idempotent(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Corrupted download is removed"
)]
fn scenario_corrupted(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Repeated extraction refuses to overwrite"
)]
fn scenario_repeated_extraction(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Zip archives are unpacked"
)]
fn scenario_zip(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Installer packages are not unpacked"
)]
fn scenario_installer(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Missing file on the server"
)]
fn scenario_missing(world: PipelineWorld) {
    let _ = world;
}
