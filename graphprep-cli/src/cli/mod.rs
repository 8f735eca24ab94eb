//! Command-line interface for the graphprep smoke check.
//!
//! The `prepare` command runs the full pipeline against a Matrix Market file
//! with the placeholder providers and prints the shape of every output.

mod commands;
mod summary;

pub use commands::{Cli, CliError, Command, ExecutionSummary, PrepareCommand, run_cli};
pub use summary::render_summary;
