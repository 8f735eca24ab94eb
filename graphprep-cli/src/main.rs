//! Binary entry point for `graphprep`.
//!
//! Parses arguments, runs the preparation pipeline with the placeholder
//! providers and prints a summary to stdout. Failures are logged with their
//! stable codes and turned into a non-zero exit status.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use graphprep_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to prepare graph")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

/// Stable `(code, stage_code)` pair for errors raised by the CLI.
fn error_codes(err: &anyhow::Error) -> (Option<&'static str>, Option<&'static str>) {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Core(core)) => (Some(core.code().as_str()), core.stage_code()),
        Some(CliError::Provider(provider)) => (Some(provider.code().as_str()), None),
        None => (None, None),
    }
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let (code, stage_code) = error_codes(&err);
        error!(
            error = %format!("{err:#}"),
            code = code.map(field::display),
            stage_code = stage_code.map(field::display),
            "graph preparation failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
