//! Plain-text rendering of a pipeline run for the terminal.

use std::io::{self, Write};

use graphprep_core::{Label, VertexId, WalkError};

use super::ExecutionSummary;

/// Render a human-readable summary of `summary` to `writer`.
///
/// Sizes are always printed. When [`ExecutionSummary::verbose`] is set the
/// adjacency entries, feature rows, identifier map, walks, labels and splits
/// follow, one item per line.
///
/// # Errors
/// Returns any I/O error raised while writing, or
/// [`io::ErrorKind::InvalidData`] when the walk corpus cannot be read.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::io::Cursor;
/// # use graphprep_cli::cli::{ExecutionSummary, render_summary};
/// # use graphprep_core::{AdjacencyMatrix, PipelineBuilder};
/// # use graphprep_providers_mock::{ConstantFeatures, SampledBinaryLabels};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let graph = AdjacencyMatrix::try_from_triplets((2, 2), [(0, 1, 1.0)])?;
/// let result = PipelineBuilder::new()
///     .with_seed(1)
///     .build()?
///     .run(&graph, &ConstantFeatures::default(), &SampledBinaryLabels::new())?;
/// let summary = ExecutionSummary {
///     adjacency_source: "demo".into(),
///     result,
///     verbose: false,
/// };
/// let mut buffer = Cursor::new(Vec::new());
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer.into_inner())?;
/// assert!(text.starts_with("adjacency source: demo\n"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let result = &summary.result;
    let adjacency = result.adjacency();
    let features = result.features();
    let partition = result.partition();

    writeln!(writer, "adjacency source: {}", summary.adjacency_source)?;
    writeln!(
        writer,
        "adjacency: {n} x {n}, {nnz} stored entries",
        n = adjacency.vertex_count(),
        nnz = adjacency.nnz()
    )?;
    writeln!(
        writer,
        "features: {} x {}",
        features.rows(),
        features.dimension()
    )?;
    writeln!(writer, "id map: {} entries", result.id_map().len())?;
    match result.walks() {
        Some(corpus) => writeln!(writer, "walks: {}", corpus.path().display())?,
        None => writeln!(writer, "walks: none")?,
    }
    writeln!(writer, "labels: {}", result.labels().len())?;
    writeln!(writer, "seed: {}", result.seed())?;
    writeln!(
        writer,
        "split sizes: train={} validation={} test={}",
        partition.train().len(),
        partition.validation().len(),
        partition.test().len()
    )?;

    if !summary.verbose {
        return Ok(());
    }

    writeln!(writer, "[adjacency]")?;
    for (row, col, value) in adjacency.entries() {
        writeln!(writer, "{row}\t{col}\t{value}")?;
    }

    writeln!(writer, "[features]")?;
    for vertex in 0..features.rows() {
        if let Some(row) = features.row(vertex) {
            writeln!(writer, "{vertex}\t{}", join(row.iter()))?;
        }
    }

    writeln!(writer, "[id map]")?;
    for (id, vertex) in result.id_map().iter() {
        writeln!(writer, "{id}\t{vertex}")?;
    }

    if let Some(corpus) = result.walks() {
        writeln!(writer, "[walks]")?;
        for walk in corpus.iter().map_err(invalid_data)? {
            let walk = walk.map_err(invalid_data)?;
            writeln!(writer, "{}", join(walk.iter()))?;
        }
    }

    writeln!(writer, "[labels]")?;
    for (vertex, label) in result.labels().iter() {
        writeln!(writer, "{vertex}\t{}", label.get())?;
    }

    let split_labels = result.split_labels();
    for (name, vertices, labels) in [
        ("train", partition.train(), split_labels.train()),
        ("validation", partition.validation(), split_labels.validation()),
        ("test", partition.test(), split_labels.test()),
    ] {
        writeln!(writer, "[{name}]")?;
        write_split(&mut writer, vertices, labels)?;
    }
    Ok(())
}

fn write_split(mut writer: impl Write, vertices: &[VertexId], labels: &[Label]) -> io::Result<()> {
    for (vertex, label) in vertices.iter().zip(labels) {
        writeln!(writer, "{vertex}\t{}", label.get())?;
    }
    Ok(())
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn invalid_data(err: WalkError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}
