//! Graph data preparation for vertex-classification learners.
//!
//! The crate loads a sparse adjacency matrix, derives its undirected form,
//! attaches per-vertex features and labels from pluggable providers and
//! splits the labelled vertices into train, validation and test sets.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod adjacency;
mod builder;
mod error;
mod features;
mod labels;
mod partition;
mod pipeline;
mod provider;
mod result;
mod seed;
mod symmetrize;
mod trace;
mod walks;

/// Dense vertex identifier in `[0, n)`.
pub type VertexId = usize;

pub use crate::{
    adjacency::{AdjacencyMatrix, AdjacencySource, MatrixMarketFile},
    builder::PipelineBuilder,
    error::{
        AdjacencyError, AdjacencyErrorCode, PartitionError, PartitionErrorCode, PipelineError,
        PipelineErrorCode, ProviderError, ProviderErrorCode, Result, WalkError, WalkErrorCode,
    },
    features::FeatureMatrix,
    labels::{Label, LabelMap},
    partition::{
        FRACTION_SUM_TOLERANCE, Partitioner, SplitFractions, SplitLabels, VertexPartition,
        partition,
    },
    pipeline::{DatasetFiles, Pipeline},
    provider::{FeatureProvider, LabelProvider},
    result::{IdMap, PipelineResult},
    symmetrize::symmetrize,
    trace::{StageObserver, StageOutcome, StageParam, TraceScope, Tracer, TracingObserver, param},
    walks::{WalkCorpus, WalkReader},
};
