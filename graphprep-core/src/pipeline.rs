//! Pipeline orchestration.
//!
//! Runs Load, Symmetrize, Features and Labels, Partition and Walks in that
//! order, tracing each stage, and bundles the outputs into a
//! [`PipelineResult`]. The first failing stage aborts the run.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

#[cfg(feature = "parallel")]
use tracing::{Dispatch, dispatcher};
use tracing::{Span, field, info, instrument};

use crate::{
    Result,
    adjacency::{AdjacencyMatrix, AdjacencySource, MatrixMarketFile},
    error::PipelineError,
    features::FeatureMatrix,
    labels::LabelMap,
    partition::{Partitioner, SplitFractions},
    provider::{FeatureProvider, LabelProvider, validate_features, validate_labels},
    result::{IdMap, PipelineResult},
    seed::SeedStream,
    symmetrize::symmetrize,
    trace::{Tracer, param},
    walks::WalkCorpus,
};

/// Prepares a graph for vertex classification.
///
/// # Examples
/// ```
/// use graphprep_core::{
///     AdjacencyMatrix, FeatureMatrix, FeatureProvider, Label, LabelMap, LabelProvider,
///     PipelineBuilder, ProviderError,
/// };
/// use rand::rngs::SmallRng;
///
/// struct Ones;
/// impl FeatureProvider for Ones {
///     fn name(&self) -> &str { "ones" }
///     fn features(&self, n: usize, _: &mut SmallRng) -> Result<FeatureMatrix, ProviderError> {
///         FeatureMatrix::filled(n, 1, 1.0)
///     }
/// }
///
/// struct AllPositive;
/// impl LabelProvider for AllPositive {
///     fn name(&self) -> &str { "all-positive" }
///     fn labels(&self, n: usize, _: &mut SmallRng) -> Result<LabelMap, ProviderError> {
///         Ok((0..n).map(|v| (v, Label::new(1))).collect())
///     }
/// }
///
/// let adjacency = AdjacencyMatrix::try_from_triplets((2, 2), [(0, 1, 1.0)])?;
/// let pipeline = PipelineBuilder::new().with_seed(1).build()?;
/// let result = pipeline.run(&adjacency, &Ones, &AllPositive)?;
/// assert_eq!(result.adjacency().get(1, 0), Some(1.0));
/// assert_eq!(result.features().rows(), 2);
/// assert_eq!(result.partition().len(), 2);
/// assert!(result.walks().is_none());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Pipeline {
    partitioner: Partitioner,
    seed: Option<u64>,
    shuffle: bool,
    walks: Option<PathBuf>,
    tracer: Tracer,
}

impl Pipeline {
    pub(crate) fn new(
        partitioner: Partitioner,
        seed: Option<u64>,
        shuffle: bool,
        walks: Option<PathBuf>,
        tracer: Tracer,
    ) -> Self {
        Self {
            partitioner,
            seed,
            shuffle,
            walks,
            tracer,
        }
    }

    /// Returns the validated split fractions.
    #[must_use]
    pub fn fractions(&self) -> SplitFractions {
        self.partitioner.fractions()
    }

    /// Returns the configured base seed.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns whether labelled vertices are shuffled before partitioning.
    #[must_use]
    pub fn partition_shuffle(&self) -> bool {
        self.shuffle
    }

    /// Returns the configured walk corpus path.
    #[must_use]
    pub fn walks(&self) -> Option<&Path> {
        self.walks.as_deref()
    }

    /// Executes every stage and bundles the outputs.
    ///
    /// # Errors
    /// Returns the first stage failure:
    /// [`PipelineError::Adjacency`] when loading fails (including
    /// non-square input), [`PipelineError::Features`] or
    /// [`PipelineError::Labels`] when a provider fails or breaks its
    /// contract, [`PipelineError::Partition`] or
    /// [`PipelineError::MissingLabel`] when partitioning fails and
    /// [`PipelineError::Walks`] when the corpus cannot be opened.
    #[instrument(
        name = "core.run",
        err,
        skip_all,
        fields(
            source = source.name(),
            features = features.name(),
            labels = labels.name(),
            seed = field::Empty,
        ),
    )]
    pub fn run<S, F, L>(&self, source: &S, features: &F, labels: &L) -> Result<PipelineResult>
    where
        S: AdjacencySource + ?Sized,
        F: FeatureProvider + ?Sized,
        L: LabelProvider + ?Sized,
    {
        let seed = self.resolve_seed();
        Span::current().record("seed", seed);

        let loaded = self.load(source)?;
        let adjacency = self.tracer.trace(
            "symmetrize adjacency",
            &[param("vertices", loaded.vertex_count())],
            |scope| {
                let symmetric = symmetrize(&loaded);
                scope.update(&[param("nnz", symmetric.nnz())]);
                Ok::<_, PipelineError>(symmetric)
            },
        )?;
        let vertices = adjacency.vertex_count();

        let (feature_matrix, label_map) = self.provide(features, labels, vertices, seed);
        let feature_matrix = feature_matrix?;
        let label_map = label_map?;

        let id_map = self
            .tracer
            .trace("build id map", &[param("vertices", vertices)], |_| {
                Ok::<_, PipelineError>(IdMap::identity(vertices))
            })?;
        let partitioner = if self.shuffle {
            self.partitioner
                .with_shuffle_seed(SeedStream::Shuffle.seed(seed))
        } else {
            self.partitioner
        };
        let (partition, split_labels) = self.tracer.trace(
            "partition labelled vertices",
            &[
                param("labelled", label_map.len()),
                param("shuffle", self.shuffle),
            ],
            |scope| {
                let partition = partitioner.partition(label_map.keys())?;
                let split_labels = partition.labels(&label_map)?;
                scope.update(&[
                    param("train", partition.train().len()),
                    param("validation", partition.validation().len()),
                    param("test", partition.test().len()),
                ]);
                Ok::<_, PipelineError>((partition, split_labels))
            },
        )?;

        let walks = self.attach_walks()?;

        info!(
            vertices,
            labelled = label_map.len(),
            walks = walks.is_some(),
            "pipeline run completed"
        );
        Ok(PipelineResult {
            adjacency,
            features: feature_matrix,
            id_map,
            walks,
            labels: label_map,
            partition,
            split_labels,
            seed,
        })
    }

    fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            let drawn = rand::random::<u64>();
            info!(seed = drawn, "no seed configured; drew one from entropy");
            drawn
        })
    }

    fn load<S: AdjacencySource + ?Sized>(&self, source: &S) -> Result<AdjacencyMatrix> {
        self.tracer
            .trace("load adjacency", &[param("source", source.name())], |scope| {
                let matrix = source.load().map_err(|error| PipelineError::Adjacency {
                    adjacency_source: Arc::from(source.name()),
                    error,
                })?;
                scope.update(&[
                    param("vertices", matrix.vertex_count()),
                    param("nnz", matrix.nnz()),
                ]);
                Ok::<_, PipelineError>(matrix)
            })
    }

    #[cfg(feature = "parallel")]
    fn provide<F, L>(
        &self,
        features: &F,
        labels: &L,
        vertices: usize,
        seed: u64,
    ) -> (Result<FeatureMatrix>, Result<LabelMap>)
    where
        F: FeatureProvider + ?Sized,
        L: LabelProvider + ?Sized,
    {
        // Worker threads do not inherit the caller's subscriber or span.
        let dispatch = dispatcher::get_default(Dispatch::clone);
        let span = Span::current();
        rayon::join(
            || {
                dispatcher::with_default(&dispatch, || {
                    span.in_scope(|| self.features(features, vertices, seed))
                })
            },
            || {
                dispatcher::with_default(&dispatch, || {
                    span.in_scope(|| self.labels(labels, vertices, seed))
                })
            },
        )
    }

    #[cfg(not(feature = "parallel"))]
    fn provide<F, L>(
        &self,
        features: &F,
        labels: &L,
        vertices: usize,
        seed: u64,
    ) -> (Result<FeatureMatrix>, Result<LabelMap>)
    where
        F: FeatureProvider + ?Sized,
        L: LabelProvider + ?Sized,
    {
        self.provide_sequential(features, labels, vertices, seed)
    }

    #[cfg(any(test, not(feature = "parallel")))]
    fn provide_sequential<F, L>(
        &self,
        features: &F,
        labels: &L,
        vertices: usize,
        seed: u64,
    ) -> (Result<FeatureMatrix>, Result<LabelMap>)
    where
        F: FeatureProvider + ?Sized,
        L: LabelProvider + ?Sized,
    {
        (
            self.features(features, vertices, seed),
            self.labels(labels, vertices, seed),
        )
    }

    fn features<F: FeatureProvider + ?Sized>(
        &self,
        provider: &F,
        vertices: usize,
        seed: u64,
    ) -> Result<FeatureMatrix> {
        self.tracer.trace(
            "load features",
            &[
                param("provider", provider.name()),
                param("vertices", vertices),
            ],
            |scope| {
                let mut rng = SeedStream::Features.rng(seed);
                let matrix = provider
                    .features(vertices, &mut rng)
                    .and_then(|matrix| validate_features(&matrix, vertices).map(|()| matrix))
                    .map_err(|error| PipelineError::Features {
                        provider: Arc::from(provider.name()),
                        error,
                    })?;
                scope.update(&[param("dimension", matrix.dimension())]);
                Ok::<_, PipelineError>(matrix)
            },
        )
    }

    fn labels<L: LabelProvider + ?Sized>(
        &self,
        provider: &L,
        vertices: usize,
        seed: u64,
    ) -> Result<LabelMap> {
        self.tracer.trace(
            "load labels",
            &[
                param("provider", provider.name()),
                param("vertices", vertices),
            ],
            |scope| {
                let mut rng = SeedStream::Labels.rng(seed);
                let map = provider
                    .labels(vertices, &mut rng)
                    .and_then(|map| validate_labels(&map, vertices).map(|()| map))
                    .map_err(|error| PipelineError::Labels {
                        provider: Arc::from(provider.name()),
                        error,
                    })?;
                scope.update(&[param("labelled", map.len())]);
                Ok::<_, PipelineError>(map)
            },
        )
    }

    fn attach_walks(&self) -> Result<Option<WalkCorpus>> {
        let Some(path) = self.walks.as_deref() else {
            return Ok(None);
        };
        self.tracer.trace(
            "attach walks",
            &[param("path", path.display())],
            |_| Ok::<_, PipelineError>(Some(WalkCorpus::open(path)?)),
        )
    }
}

/// File layout of a dataset stored as `<prefix>-G.mtx` plus
/// `<prefix>-walks.txt`.
///
/// # Examples
/// ```
/// use std::path::Path;
///
/// use graphprep_core::{AdjacencySource, DatasetFiles};
///
/// let files = DatasetFiles::from_prefix("data/medium");
/// assert_eq!(files.adjacency().path(), Path::new("data/medium-G.mtx"));
/// assert_eq!(files.walks(), Path::new("data/medium-walks.txt"));
/// assert_eq!(files.adjacency().name(), "medium");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetFiles {
    adjacency: MatrixMarketFile,
    walks: PathBuf,
}

impl DatasetFiles {
    /// Resolves the adjacency and walk files sharing `prefix`.
    #[must_use]
    pub fn from_prefix(prefix: impl AsRef<Path>) -> Self {
        let prefix = prefix.as_ref();
        let name = prefix
            .file_name()
            .and_then(|stem| stem.to_str())
            .map_or_else(|| "dataset".to_owned(), ToOwned::to_owned);
        let with_suffix = |suffix: &str| {
            let mut file = prefix.as_os_str().to_owned();
            file.push(suffix);
            PathBuf::from(file)
        };
        Self {
            adjacency: MatrixMarketFile::new(with_suffix("-G.mtx")).with_name(name),
            walks: with_suffix("-walks.txt"),
        }
    }

    /// Returns the adjacency source.
    #[must_use]
    pub fn adjacency(&self) -> &MatrixMarketFile {
        &self.adjacency
    }

    /// Returns the walk corpus path.
    #[must_use]
    pub fn walks(&self) -> &Path {
        &self.walks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, rngs::SmallRng};
    use rstest::{fixture, rstest};

    use crate::{Label, PipelineBuilder, ProviderError};

    struct Noise;

    impl FeatureProvider for Noise {
        fn name(&self) -> &str {
            "noise"
        }

        fn features(
            &self,
            vertices: usize,
            rng: &mut SmallRng,
        ) -> std::result::Result<FeatureMatrix, ProviderError> {
            FeatureMatrix::try_from_rows(
                (0..vertices)
                    .map(|_| vec![rng.r#gen::<f32>(), rng.r#gen::<f32>()])
                    .collect(),
            )
        }
    }

    struct Coin;

    impl LabelProvider for Coin {
        fn name(&self) -> &str {
            "coin"
        }

        fn labels(
            &self,
            vertices: usize,
            rng: &mut SmallRng,
        ) -> std::result::Result<LabelMap, ProviderError> {
            let mut labels = LabelMap::new();
            for vertex in 0..vertices {
                if rng.gen_bool(0.5) {
                    labels.insert(vertex, Label::new(u32::from(rng.gen_bool(0.3))))?;
                }
            }
            Ok(labels)
        }
    }

    struct Empty;

    impl FeatureProvider for Empty {
        fn name(&self) -> &str {
            "empty"
        }

        fn features(
            &self,
            _vertices: usize,
            _rng: &mut SmallRng,
        ) -> std::result::Result<FeatureMatrix, ProviderError> {
            Err(ProviderError::ZeroDimension)
        }
    }

    #[fixture]
    fn pipeline() -> Pipeline {
        PipelineBuilder::new()
            .with_seed(17)
            .build()
            .expect("configuration is valid")
    }

    #[rstest]
    fn sequential_provision_matches_the_default_path(pipeline: Pipeline) {
        let (features, labels) = pipeline.provide(&Noise, &Coin, 24, 17);
        let (sequential_features, sequential_labels) =
            pipeline.provide_sequential(&Noise, &Coin, 24, 17);
        assert_eq!(
            features.expect("features succeed"),
            sequential_features.expect("features succeed")
        );
        assert_eq!(
            labels.expect("labels succeed"),
            sequential_labels.expect("labels succeed")
        );
    }

    #[rstest]
    fn provider_call_order_does_not_change_output(pipeline: Pipeline) {
        let labels_first = pipeline.labels(&Coin, 24, 17).expect("labels succeed");
        let features_second = pipeline.features(&Noise, 24, 17).expect("features succeed");
        let (features, labels) = pipeline.provide_sequential(&Noise, &Coin, 24, 17);
        assert_eq!(features.expect("features succeed"), features_second);
        assert_eq!(labels.expect("labels succeed"), labels_first);
    }

    #[rstest]
    fn sequential_provision_attributes_feature_failures(pipeline: Pipeline) {
        let (features, labels) = pipeline.provide_sequential(&Empty, &Coin, 4, 17);
        match features {
            Err(PipelineError::Features { provider, error }) => {
                assert_eq!(&*provider, "empty");
                assert_eq!(error, ProviderError::ZeroDimension);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(labels.is_ok());
    }
}
