//! Tests for the `Pipeline` orchestration API.

mod common;

use std::sync::Arc;

use common::{AllVertices, BrokenFeatures, FixedLabels, FixedRows, OutcomeLog, RandomFeatures};
use graphprep_core::{
    AdjacencyErrorCode, AdjacencyMatrix, DatasetFiles, Label, LabelMap, MatrixMarketFile,
    PipelineBuilder, PipelineError, PipelineErrorCode, ProviderError, StageOutcome,
};
use graphprep_test_support::{
    fixtures::{matrix_market_file, text_file},
    tracing::capture,
};
use rstest::{fixture, rstest};
use tracing::Level;

#[fixture]
fn ring() -> AdjacencyMatrix {
    let edges: Vec<_> = (0..10).map(|v| (v, (v + 1) % 10, 1.0)).collect();
    AdjacencyMatrix::try_from_triplets((10, 10), edges).expect("ring is valid")
}

#[rstest]
fn directed_edge_is_symmetrised_end_to_end() {
    let file = matrix_market_file((2, 2), &[(0, 1, 1.0)]).expect("write fixture");
    let pipeline = PipelineBuilder::new().with_seed(1).build().expect("valid");
    let result = pipeline
        .run(&MatrixMarketFile::new(file.path()), &RandomFeatures::default(), &AllVertices)
        .expect("run must succeed");
    let adjacency = result.adjacency();
    assert_eq!(adjacency.get(0, 1), Some(1.0));
    assert_eq!(adjacency.get(1, 0), Some(1.0));
    assert_eq!(adjacency.get(0, 0), None);
    assert_eq!(adjacency.get(1, 1), None);
    assert_eq!(result.id_map().len(), 2);
}

#[rstest]
fn labelled_vertices_split_six_two_two(ring: AdjacencyMatrix) {
    let labels: LabelMap = (0..10).map(|v| (v, Label::new(1))).collect();
    let pipeline = PipelineBuilder::new().with_seed(5).build().expect("valid");
    let result = pipeline
        .run(&ring, &RandomFeatures::default(), &FixedLabels(labels))
        .expect("run must succeed");
    let partition = result.partition();
    assert_eq!(partition.train(), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(partition.validation(), &[6, 7]);
    assert_eq!(partition.test(), &[8, 9]);
    assert_eq!(result.split_labels().train().len(), 6);
}

#[rstest]
fn single_labelled_vertex_lands_in_test(ring: AdjacencyMatrix) {
    let labels: LabelMap = [(4, Label::new(0))].into_iter().collect();
    let result = PipelineBuilder::new()
        .with_seed(2)
        .build()
        .expect("valid")
        .run(&ring, &RandomFeatures::default(), &FixedLabels(labels))
        .expect("run must succeed");
    assert!(result.partition().train().is_empty());
    assert!(result.partition().validation().is_empty());
    assert_eq!(result.partition().test(), &[4]);
    assert_eq!(result.split_labels().test(), &[Label::new(0)]);
}

#[rstest]
fn fixed_seed_reproduces_every_output(ring: AdjacencyMatrix) {
    let pipeline = PipelineBuilder::new()
        .with_seed(99)
        .with_partition_shuffle(true)
        .build()
        .expect("valid");
    let first = pipeline
        .run(&ring, &RandomFeatures::default(), &AllVertices)
        .expect("first run");
    let second = pipeline
        .run(&ring, &RandomFeatures::default(), &AllVertices)
        .expect("second run");
    assert_eq!(first, second);
    assert_eq!(first.seed(), 99);
}

#[rstest]
fn unseeded_runs_report_the_drawn_seed(ring: AdjacencyMatrix) {
    let pipeline = PipelineBuilder::new().build().expect("valid");
    let first = pipeline
        .run(&ring, &RandomFeatures::default(), &AllVertices)
        .expect("run");
    let replay = PipelineBuilder::new()
        .with_seed(first.seed())
        .build()
        .expect("valid")
        .run(&ring, &RandomFeatures::default(), &AllVertices)
        .expect("replay");
    assert_eq!(first, replay);
}

#[rstest]
fn non_square_input_aborts_before_providers_run() {
    let file = matrix_market_file((2, 3), &[(0, 2, 1.0)]).expect("write fixture");
    let features = RandomFeatures::default();
    let err = PipelineBuilder::new()
        .build()
        .expect("valid")
        .run(&MatrixMarketFile::new(file.path()), &features, &AllVertices)
        .expect_err("non-square input must fail");
    assert_eq!(err.code(), PipelineErrorCode::AdjacencyFailure);
    assert_eq!(err.adjacency_code(), Some(AdjacencyErrorCode::NotSquare));
    assert!(err.to_string().contains("not square"));
    assert_eq!(features.calls(), 0);
}

#[rstest]
fn oversized_declared_shape_fails_without_allocating() {
    let file = text_file(
        &format!(
            "%%MatrixMarket matrix coordinate pattern general\n{max} {max} 0\n",
            max = usize::MAX
        ),
        ".mtx",
    )
    .expect("write fixture");
    let features = RandomFeatures::default();
    let err = PipelineBuilder::new()
        .build()
        .expect("valid")
        .run(&MatrixMarketFile::new(file.path()), &features, &AllVertices)
        .expect_err("unallocatable shape must fail");
    assert_eq!(err.code(), PipelineErrorCode::AdjacencyFailure);
    assert_eq!(err.adjacency_code(), Some(AdjacencyErrorCode::TooLarge));
    assert_eq!(features.calls(), 0);
}

#[rstest]
#[case(0.9999)]
#[case(1.0001)]
fn fraction_sums_off_by_a_ten_thousandth_are_rejected(#[case] total: f64) {
    let err = PipelineBuilder::new()
        .with_fractions(0.6, 0.2, total - 0.8)
        .build()
        .expect_err("fractions must sum to one");
    assert_eq!(err.code(), PipelineErrorCode::PartitionFailure);
    assert_eq!(err.stage_code(), Some("PARTITION_FRACTION_SUM"));
}

#[rstest]
fn provider_failures_are_attributed(ring: AdjacencyMatrix) {
    let err = PipelineBuilder::new()
        .build()
        .expect("valid")
        .run(&ring, &BrokenFeatures, &AllVertices)
        .expect_err("broken provider must fail");
    match err {
        PipelineError::Features { provider, error } => {
            assert_eq!(&*provider, "broken-features");
            assert_eq!(error, ProviderError::ZeroDimension);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn feature_row_count_must_match_vertices(ring: AdjacencyMatrix) {
    let err = PipelineBuilder::new()
        .build()
        .expect("valid")
        .run(&ring, &FixedRows(3), &AllVertices)
        .expect_err("row mismatch must fail");
    assert_eq!(err.code(), PipelineErrorCode::FeatureFailure);
    assert_eq!(err.stage_code(), Some("PROVIDER_ROW_COUNT_MISMATCH"));
}

#[rstest]
fn label_keys_must_lie_within_the_graph(ring: AdjacencyMatrix) {
    let labels: LabelMap = [(3, Label::new(1)), (10, Label::new(0))].into_iter().collect();
    let err = PipelineBuilder::new()
        .build()
        .expect("valid")
        .run(&ring, &RandomFeatures::default(), &FixedLabels(labels))
        .expect_err("out-of-range label must fail");
    assert_eq!(err.code(), PipelineErrorCode::LabelFailure);
    assert_eq!(err.stage_code(), Some("PROVIDER_LABEL_OUT_OF_RANGE"));
}

#[rstest]
fn walks_are_attached_lazily(ring: AdjacencyMatrix) {
    let walks = text_file("0 1 2\n\n9 8\n", ".txt").expect("write walks");
    let result = PipelineBuilder::new()
        .with_walks(walks.path())
        .build()
        .expect("valid")
        .run(&ring, &RandomFeatures::default(), &AllVertices)
        .expect("run must succeed");
    let corpus = result.walks().expect("walks were configured");
    let read: Vec<_> = corpus
        .iter()
        .expect("corpus opens")
        .collect::<Result<_, _>>()
        .expect("walks parse");
    assert_eq!(read, vec![vec![0, 1, 2], Vec::new(), vec![9, 8]]);
}

#[rstest]
fn missing_walk_corpus_fails_the_run(ring: AdjacencyMatrix) {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = PipelineBuilder::new()
        .with_walks(dir.path().join("absent-walks.txt"))
        .build()
        .expect("valid")
        .run(&ring, &RandomFeatures::default(), &AllVertices)
        .expect_err("missing corpus must fail");
    assert_eq!(err.code(), PipelineErrorCode::WalkFailure);
    assert_eq!(err.stage_code(), Some("WALKS_IO"));
}

#[rstest]
fn dataset_prefix_resolves_both_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let prefix = dir.path().join("medium");
    let files = DatasetFiles::from_prefix(&prefix);
    std::fs::write(
        files.adjacency().path(),
        "%%MatrixMarket matrix coordinate pattern symmetric\n3 3 2\n2 1\n3 2\n",
    )
    .expect("write adjacency");
    std::fs::write(files.walks(), "0 1\n").expect("write walks");

    let result = PipelineBuilder::new()
        .with_walks(files.walks())
        .build()
        .expect("valid")
        .run(files.adjacency(), &RandomFeatures::default(), &AllVertices)
        .expect("run must succeed");
    assert_eq!(result.adjacency().vertex_count(), 3);
    assert_eq!(result.adjacency().get(0, 1), Some(2.0));
    assert!(result.walks().is_some());
}

#[rstest]
fn every_stage_reports_its_outcome(ring: AdjacencyMatrix) {
    let log = Arc::new(OutcomeLog::default());
    PipelineBuilder::new()
        .with_observer(log.clone())
        .build()
        .expect("valid")
        .run(&ring, &RandomFeatures::default(), &AllVertices)
        .expect("run must succeed");
    let mut stages: Vec<_> = log.ended().into_iter().map(|(stage, _)| stage).collect();
    stages.sort();
    assert_eq!(
        stages,
        vec![
            "build id map",
            "load adjacency",
            "load features",
            "load labels",
            "partition labelled vertices",
            "symmetrize adjacency",
        ]
    );
    assert!(log
        .ended()
        .iter()
        .all(|(_, outcome)| *outcome == StageOutcome::Completed));
}

#[rstest]
fn failing_stage_still_reports_its_end() {
    let file = matrix_market_file((3, 2), &[]).expect("write fixture");
    let log = Arc::new(OutcomeLog::default());
    let result = PipelineBuilder::new()
        .with_observer(log.clone())
        .build()
        .expect("valid")
        .run(&MatrixMarketFile::new(file.path()), &RandomFeatures::default(), &AllVertices);
    assert!(result.is_err());
    assert_eq!(
        log.ended(),
        vec![("load adjacency".to_owned(), StageOutcome::Failed)]
    );
}

#[rstest]
fn run_emits_span_and_stage_events(ring: AdjacencyMatrix) {
    let pipeline = PipelineBuilder::new().with_seed(8).build().expect("valid");
    let (result, layer) =
        capture(|| pipeline.run(&ring, &RandomFeatures::default(), &AllVertices));
    result.expect("run must succeed");

    let run_span = layer.span("core.run").expect("core.run span must exist");
    assert_eq!(run_span.fields.get("source"), Some(&"in-memory".to_owned()));
    assert_eq!(run_span.fields.get("seed"), Some(&"8".to_owned()));

    let started = layer.events_with_message("stage started");
    let finished = layer.events_with_message("stage finished");
    assert_eq!(started.len(), 6);
    assert_eq!(finished.len(), 6);
    assert!(
        started
            .iter()
            .any(|event| event.field("stage") == Some("build id map"))
    );
    assert!(finished.iter().all(|event| {
        event.level == Level::INFO
            && event.field("outcome") == Some("completed")
            && event.field("duration_ms").is_some()
    }));
    assert!(
        layer
            .events_with_message("stage progress")
            .iter()
            .all(|event| event.field("delta_ms").is_some() && event.field("total_ms").is_some())
    );
}

#[rstest]
fn failed_run_logs_a_warning_for_the_failed_stage() {
    let file = matrix_market_file((2, 3), &[]).expect("write fixture");
    let pipeline = PipelineBuilder::new().build().expect("valid");
    let source = MatrixMarketFile::new(file.path());
    let (result, layer) =
        capture(|| pipeline.run(&source, &RandomFeatures::default(), &AllVertices));
    assert!(result.is_err());
    assert!(layer.events_with_message("stage finished").iter().any(|event| {
        event.level == Level::WARN
            && event.field("stage") == Some("load adjacency")
            && event.field("outcome") == Some("failed")
    }));
}
