//! Command implementations and argument parsing for the graphprep CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use graphprep_core::{
    AdjacencySource, DatasetFiles, MatrixMarketFile, PipelineBuilder, PipelineError,
    PipelineResult, ProviderError, SplitFractions,
};
use graphprep_providers_mock::{ConstantFeatures, SampledBinaryLabels};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "graphprep",
    about = "Prepare a graph for vertex classification."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Load, symmetrise, label and partition a graph.
    Prepare(PrepareCommand),
}

/// Options accepted by the `prepare` command.
#[derive(Debug, Args, Clone)]
pub struct PrepareCommand {
    /// Matrix Market adjacency file, or a dataset prefix with `--prefix`.
    pub input: PathBuf,

    /// Treat INPUT as a prefix naming `<INPUT>-G.mtx` and `<INPUT>-walks.txt`.
    #[arg(long)]
    pub prefix: bool,

    /// Random-walk corpus, one walk per line.
    #[arg(long)]
    pub walks: Option<PathBuf>,

    /// Base seed; drawn from entropy and logged when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of labelled vertices used for training.
    #[arg(long, default_value_t = SplitFractions::default().train())]
    pub train: f64,

    /// Fraction of labelled vertices used for validation.
    #[arg(long, default_value_t = SplitFractions::default().validation())]
    pub validation: f64,

    /// Fraction of labelled vertices used for testing.
    #[arg(long, default_value_t = SplitFractions::default().test())]
    pub test: f64,

    /// Fraction of vertices the placeholder label provider labels.
    #[arg(
        long = "labelled-fraction",
        default_value_t = SampledBinaryLabels::new().labelled_fraction()
    )]
    pub labelled_fraction: f64,

    /// Probability that a sampled vertex is labelled `1`.
    #[arg(
        long = "positive-probability",
        default_value_t = SampledBinaryLabels::new().positive_probability()
    )]
    pub positive_probability: f64,

    /// Shuffle labelled vertices before partitioning.
    #[arg(long)]
    pub shuffle: bool,

    /// Print every entry, row and split instead of sizes only.
    #[arg(long)]
    pub verbose: bool,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The placeholder providers rejected their configuration.
    #[error("invalid provider configuration: {0}")]
    Provider(#[from] ProviderError),
    /// The pipeline failed.
    #[error(transparent)]
    Core(#[from] PipelineError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the adjacency source.
    pub adjacency_source: String,
    /// Outputs of the pipeline run.
    pub result: PipelineResult,
    /// Whether full listings should be rendered.
    pub verbose: bool,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when configuration or execution fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use graphprep_cli::cli::{Cli, run_cli};
/// # use clap::Parser;
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(
///     file.path(),
///     "%%MatrixMarket matrix coordinate pattern general\n2 2 1\n1 2\n",
/// )?;
/// let path = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from(["graphprep", "prepare", path.as_str(), "--seed", "3"])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.adjacency().get(1, 0), Some(1.0));
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Prepare(prepare) => {
            Span::current().record("command", field::display("prepare"));
            run_prepare(prepare)
        }
    }
}

#[instrument(
    name = "cli.prepare",
    err,
    skip(command),
    fields(input = %command.input.display(), prefix = command.prefix, seed = field::Empty),
)]
pub(super) fn run_prepare(command: PrepareCommand) -> Result<ExecutionSummary, CliError> {
    let labels = SampledBinaryLabels::new()
        .with_labelled_fraction(command.labelled_fraction)?
        .with_positive_probability(command.positive_probability)?;
    let features = ConstantFeatures::default();

    let (source, walks) = resolve_inputs(&command);
    let mut builder = PipelineBuilder::new()
        .with_fractions(command.train, command.validation, command.test)
        .with_partition_shuffle(command.shuffle);
    if let Some(seed) = command.seed {
        Span::current().record("seed", seed);
        builder = builder.with_seed(seed);
    }
    if let Some(path) = walks {
        builder = builder.with_walks(path);
    }
    let pipeline = builder.build()?;

    let result = pipeline.run(&source, &features, &labels)?;
    info!(
        adjacency_source = source.name(),
        vertices = result.adjacency().vertex_count(),
        labelled = result.labels().len(),
        "command completed"
    );
    Ok(ExecutionSummary {
        adjacency_source: source.name().to_owned(),
        result,
        verbose: command.verbose,
    })
}

pub(super) fn resolve_inputs(command: &PrepareCommand) -> (MatrixMarketFile, Option<PathBuf>) {
    if !command.prefix {
        return (MatrixMarketFile::new(&command.input), command.walks.clone());
    }
    let files = DatasetFiles::from_prefix(&command.input);
    let walks = match &command.walks {
        Some(explicit) => Some(explicit.clone()),
        None if files.walks().is_file() => Some(files.walks().to_path_buf()),
        None => {
            warn!(
                path = %files.walks().display(),
                "no walk corpus found next to the adjacency file"
            );
            None
        }
    };
    (files.adjacency().clone(), walks)
}
