//! Error types for the graphprep core library.
//!
//! Each pipeline stage owns an error enum; [`PipelineError`] wraps them with
//! the name of the source or provider that failed. Every enum exposes a
//! stable machine-readable code so callers can branch without string
//! matching.

use std::{fmt, io, path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::VertexId;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident
                    $( { $($fields:tt)* } )? $( ( $($elems:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(
                        Self::$ErrVariant $( { $($fields)* } )? $( ( $($elems)* ) )?
                            => $CodeTy::$CodeVariant,
                    )+
                }
            }
        }
    };
}

/// An error produced while loading an adjacency matrix.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AdjacencyError {
    /// The parsed matrix has a different number of rows and columns.
    #[error("adjacency matrix is not square ({rows} x {cols})")]
    NotSquare {
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
    },
    /// The resource could not be opened or read.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path of the resource that failed.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The Matrix Market banner or size line is malformed.
    #[error("invalid matrix market header: {reason}")]
    InvalidHeader {
        /// Description of the malformed header.
        reason: String,
    },
    /// The banner names a format this loader does not read.
    #[error("unsupported matrix market format `{detail}`")]
    UnsupportedFormat {
        /// The banner token that is not supported.
        detail: String,
    },
    /// An entry line could not be parsed.
    #[error("line {line}: {reason}")]
    Parse {
        /// One-based line number within the resource.
        line: usize,
        /// Description of the parse failure.
        reason: String,
    },
    /// An entry addressed a coordinate outside the declared shape.
    #[error("entry ({row}, {col}) lies outside a {rows} x {cols} matrix")]
    EntryOutOfBounds {
        /// Zero-based row of the offending entry.
        row: usize,
        /// Zero-based column of the offending entry.
        col: usize,
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
    },
    /// The number of entries disagrees with the size line.
    #[error("size line declares {expected} entries but {actual} were read")]
    EntryCountMismatch {
        /// Entry count declared by the size line.
        expected: usize,
        /// Entry count actually present.
        actual: usize,
    },
    /// The declared shape is too large to index in memory.
    #[error("adjacency matrix with {vertices} vertices cannot be allocated")]
    TooLarge {
        /// Declared vertex count.
        vertices: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`AdjacencyError`] variants.
    enum AdjacencyErrorCode for AdjacencyError {
        /// The parsed matrix is not square.
        NotSquare => NotSquare { .. } => "ADJACENCY_NOT_SQUARE",
        /// The resource could not be read.
        Io => Io { .. } => "ADJACENCY_IO",
        /// The header is malformed.
        InvalidHeader => InvalidHeader { .. } => "ADJACENCY_INVALID_HEADER",
        /// The banner names an unsupported format.
        UnsupportedFormat => UnsupportedFormat { .. } => "ADJACENCY_UNSUPPORTED_FORMAT",
        /// An entry line could not be parsed.
        Parse => Parse { .. } => "ADJACENCY_PARSE",
        /// An entry lies outside the declared shape.
        EntryOutOfBounds => EntryOutOfBounds { .. } => "ADJACENCY_ENTRY_OUT_OF_BOUNDS",
        /// The entry count disagrees with the size line.
        EntryCountMismatch => EntryCountMismatch { .. } => "ADJACENCY_ENTRY_COUNT_MISMATCH",
        /// The declared shape cannot be allocated.
        TooLarge => TooLarge { .. } => "ADJACENCY_TOO_LARGE",
    }
}

/// An error raised while configuring or running the partitioner.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PartitionError {
    /// A split fraction was not finite or fell outside `[0, 1]`.
    #[error("{split} fraction must be a finite value in [0, 1] (got {value})")]
    InvalidFraction {
        /// Name of the split (`train`, `validation` or `test`).
        split: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The three fractions do not sum to one.
    #[error(
        "train/validation/test fractions must sum to 1 (got {train} + {validation} + {test} = {sum})"
    )]
    FractionSum {
        /// Train fraction supplied by the caller.
        train: f64,
        /// Validation fraction supplied by the caller.
        validation: f64,
        /// Test fraction supplied by the caller.
        test: f64,
        /// Left-to-right sum of the three fractions.
        sum: f64,
    },
    /// The produced splits do not account for every input key.
    #[error("partition holds {actual} keys but {expected} were supplied")]
    SizeMismatch {
        /// Number of input keys.
        expected: usize,
        /// Combined size of the three splits.
        actual: usize,
    },
    /// A vertex appears in more than one split.
    #[error("vertex {vertex} appears in more than one split")]
    Overlap {
        /// The duplicated vertex.
        vertex: VertexId,
    },
}

define_error_codes! {
    /// Stable codes describing [`PartitionError`] variants.
    enum PartitionErrorCode for PartitionError {
        /// A fraction was out of range.
        InvalidFraction => InvalidFraction { .. } => "PARTITION_INVALID_FRACTION",
        /// The fractions do not sum to one.
        FractionSum => FractionSum { .. } => "PARTITION_FRACTION_SUM",
        /// The splits lost or gained keys.
        SizeMismatch => SizeMismatch { .. } => "PARTITION_SIZE_MISMATCH",
        /// A vertex appears in more than one split.
        Overlap => Overlap { .. } => "PARTITION_OVERLAP",
    }
}

/// An error produced by a [`crate::FeatureProvider`] or [`crate::LabelProvider`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProviderError {
    /// The feature matrix row count differs from the vertex count.
    #[error("feature matrix has {actual} rows but the graph has {expected} vertices")]
    RowCountMismatch {
        /// Vertex count of the loaded graph.
        expected: usize,
        /// Row count returned by the provider.
        actual: usize,
    },
    /// A feature row has a different width from the first row.
    #[error("feature row {row} has width {actual} but expected {expected}")]
    InconsistentWidth {
        /// Offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// A label was assigned to a vertex outside `[0, n)`.
    #[error("label assigned to vertex {vertex} but the graph has {vertices} vertices")]
    LabelOutOfRange {
        /// The out-of-range vertex.
        vertex: VertexId,
        /// Vertex count of the loaded graph.
        vertices: usize,
    },
    /// The same vertex was labelled twice.
    #[error("vertex {vertex} was labelled more than once")]
    DuplicateLabel {
        /// The repeated vertex.
        vertex: VertexId,
    },
    /// A provider parameter was not a finite value in `[0, 1]`.
    #[error("{parameter} must be a finite value in [0, 1] (got {value})")]
    InvalidFraction {
        /// Name of the rejected parameter.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Feature rows must have at least one column.
    #[error("feature vectors must have positive dimension")]
    ZeroDimension,
    /// The requested matrix does not fit in memory.
    #[error("feature matrix with {rows} rows and dimension {dimension} exceeds capacity limits")]
    CapacityOverflow {
        /// Requested row count.
        rows: usize,
        /// Requested row width.
        dimension: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`ProviderError`] variants.
    enum ProviderErrorCode for ProviderError {
        /// Feature row count differs from the vertex count.
        RowCountMismatch => RowCountMismatch { .. } => "PROVIDER_ROW_COUNT_MISMATCH",
        /// Feature rows have inconsistent widths.
        InconsistentWidth => InconsistentWidth { .. } => "PROVIDER_INCONSISTENT_WIDTH",
        /// A label key lies outside the vertex range.
        LabelOutOfRange => LabelOutOfRange { .. } => "PROVIDER_LABEL_OUT_OF_RANGE",
        /// A vertex was labelled twice.
        DuplicateLabel => DuplicateLabel { .. } => "PROVIDER_DUPLICATE_LABEL",
        /// A provider parameter was out of range.
        InvalidFraction => InvalidFraction { .. } => "PROVIDER_INVALID_FRACTION",
        /// Feature rows have zero width.
        ZeroDimension => ZeroDimension => "PROVIDER_ZERO_DIMENSION",
        /// The feature matrix would overflow.
        CapacityOverflow => CapacityOverflow { .. } => "PROVIDER_CAPACITY_OVERFLOW",
    }
}

/// An error produced while reading a random-walk corpus.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WalkError {
    /// The corpus file could not be opened or read.
    #[error("failed to read walks from `{path}`: {source}")]
    Io {
        /// Path of the corpus.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A token could not be converted into a vertex identifier.
    #[error("line {line}: `{token}` is not a vertex identifier")]
    InvalidVertex {
        /// One-based line number.
        line: usize,
        /// The rejected token.
        token: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`WalkError`] variants.
    enum WalkErrorCode for WalkError {
        /// The corpus could not be read.
        Io => Io { .. } => "WALKS_IO",
        /// A token is not a vertex identifier.
        InvalidVertex => InvalidVertex { .. } => "WALKS_INVALID_VERTEX",
    }
}

/// Error type produced when building or running a [`crate::Pipeline`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading the adjacency matrix failed.
    #[error("adjacency source `{adjacency_source}` failed: {error}")]
    Adjacency {
        /// Name of the adjacency source.
        adjacency_source: Arc<str>,
        /// Underlying loader error.
        #[source]
        error: AdjacencyError,
    },
    /// The feature provider failed or broke its contract.
    #[error("feature provider `{provider}` failed: {error}")]
    Features {
        /// Name of the feature provider.
        provider: Arc<str>,
        /// Underlying provider error.
        #[source]
        error: ProviderError,
    },
    /// The label provider failed or broke its contract.
    #[error("label provider `{provider}` failed: {error}")]
    Labels {
        /// Name of the label provider.
        provider: Arc<str>,
        /// Underlying provider error.
        #[source]
        error: ProviderError,
    },
    /// Partition configuration or postconditions failed.
    #[error(transparent)]
    Partition(#[from] PartitionError),
    /// The walk corpus could not be attached.
    #[error(transparent)]
    Walks(#[from] WalkError),
    /// A split references a vertex with no label.
    #[error("vertex {vertex} is not present in the label map")]
    MissingLabel {
        /// The unlabelled vertex.
        vertex: VertexId,
    },
}

define_error_codes! {
    /// Stable codes describing [`PipelineError`] variants.
    enum PipelineErrorCode for PipelineError {
        /// Loading the adjacency matrix failed.
        AdjacencyFailure => Adjacency { .. } => "PIPELINE_ADJACENCY_FAILURE",
        /// The feature provider failed.
        FeatureFailure => Features { .. } => "PIPELINE_FEATURE_FAILURE",
        /// The label provider failed.
        LabelFailure => Labels { .. } => "PIPELINE_LABEL_FAILURE",
        /// Partitioning failed.
        PartitionFailure => Partition(..) => "PIPELINE_PARTITION_FAILURE",
        /// Attaching the walk corpus failed.
        WalkFailure => Walks(..) => "PIPELINE_WALK_FAILURE",
        /// A split references an unlabelled vertex.
        MissingLabel => MissingLabel { .. } => "PIPELINE_MISSING_LABEL",
    }
}

impl PipelineError {
    /// Retrieve the inner [`AdjacencyErrorCode`] when loading failed.
    #[must_use]
    pub const fn adjacency_code(&self) -> Option<AdjacencyErrorCode> {
        match self {
            Self::Adjacency { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the stable code of the stage error wrapped by this error, if any.
    #[must_use]
    pub const fn stage_code(&self) -> Option<&'static str> {
        match self {
            Self::Adjacency { error, .. } => Some(error.code().as_str()),
            Self::Features { error, .. } | Self::Labels { error, .. } => {
                Some(error.code().as_str())
            }
            Self::Partition(error) => Some(error.code().as_str()),
            Self::Walks(error) => Some(error.code().as_str()),
            Self::MissingLabel { .. } => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, PipelineError>;
