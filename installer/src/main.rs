//! getgo CLI entrypoint.
//!
//! Resolves the Go release for the requested platform, downloads and
//! verifies it, and optionally unpacks it. The downloaded file name is
//! printed to stdout; progress and errors go to stderr.

use clap::Parser;
use getgo::cli::Cli;
use getgo::config::Config;
use getgo::error::Result;
use getgo::output::{DryRunInfo, write_stderr_line, write_stdout_line};
use getgo::pipeline::fetch_verify_extract;
use getgo::resolver::resolve;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Install `env_logger` at the level chosen by `-v`; `RUST_LOG` wins when
/// set.
fn init_logging(verbosity: u8) {
    env_logger::Builder::new()
        .filter_level(level_for_verbosity(verbosity))
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn level_for_verbosity(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let config = Config::load(cli.config_path())?.with_overrides(
        cli.index_url.clone(),
        cli.download_url.clone(),
        cli.timeout(),
    )?;
    let resolve_request = cli.resolve_request()?;
    let fetch_request = cli.fetch_request();

    if !cli.quiet {
        write_stderr_line(
            stderr,
            format!(
                "Resolving {} {}/{}...",
                resolve_request.version.as_deref().unwrap_or("latest stable"),
                resolve_request.os,
                resolve_request.arch
            ),
        );
    }
    let descriptor = resolve(&config, &resolve_request)?;

    if cli.dry_run {
        let url = config.artefact_url(descriptor.filename());
        let info = DryRunInfo {
            descriptor: &descriptor,
            request: &fetch_request,
            url: &url,
        };
        write_stderr_line(stderr, info.display_text());
        return Ok(());
    }

    fetch_verify_extract(
        &config,
        &fetch_request,
        descriptor.filename(),
        descriptor.checksum(),
        stderr,
    )?;

    if !cli.no_show {
        write_stdout_line(stdout, descriptor.filename());
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
