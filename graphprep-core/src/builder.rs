//! Builder utilities for configuring pipeline runs.
//!
//! Exposes the configuration surface and the validation performed once,
//! before any [`Pipeline`] is constructed.

use std::{fmt, path::PathBuf, sync::Arc};

use crate::{
    Result,
    partition::{Partitioner, SplitFractions},
    pipeline::Pipeline,
    trace::{StageObserver, Tracer, TracingObserver},
};

/// Configures and constructs [`Pipeline`] instances.
///
/// # Examples
/// ```
/// use graphprep_core::PipelineBuilder;
///
/// let pipeline = PipelineBuilder::new()
///     .with_fractions(0.8, 0.1, 0.1)
///     .with_seed(7)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(pipeline.fractions().train(), 0.8);
/// assert_eq!(pipeline.seed(), Some(7));
/// ```
#[derive(Clone)]
pub struct PipelineBuilder {
    train: f64,
    validation: f64,
    test: f64,
    seed: Option<u64>,
    shuffle: bool,
    walks: Option<PathBuf>,
    observer: Arc<dyn StageObserver>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        let fractions = SplitFractions::default();
        Self {
            train: fractions.train(),
            validation: fractions.validation(),
            test: fractions.test(),
            seed: None,
            shuffle: false,
            walks: None,
            observer: Arc::new(TracingObserver),
        }
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("train", &self.train)
            .field("validation", &self.validation)
            .field("test", &self.test)
            .field("seed", &self.seed)
            .field("shuffle", &self.shuffle)
            .field("walks", &self.walks)
            .finish_non_exhaustive()
    }
}

impl PipelineBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use graphprep_core::PipelineBuilder;
    ///
    /// let builder = PipelineBuilder::new();
    /// assert_eq!(builder.fractions(), (0.6, 0.2, 0.2));
    /// assert_eq!(builder.seed(), None);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the train/validation/test fractions.
    ///
    /// The values are validated by [`Self::build`].
    #[must_use]
    pub fn with_fractions(mut self, train: f64, validation: f64, test: f64) -> Self {
        self.train = train;
        self.validation = validation;
        self.test = test;
        self
    }

    /// Returns the configured fractions as `(train, validation, test)`.
    #[must_use]
    pub fn fractions(&self) -> (f64, f64, f64) {
        (self.train, self.validation, self.test)
    }

    /// Fixes the base seed so runs are reproducible.
    ///
    /// Without a seed each run draws one from entropy and logs it.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the configured base seed.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Shuffles the labelled vertices before partitioning.
    ///
    /// The shuffle draws from its own stream derived from the base seed.
    ///
    /// # Examples
    /// ```
    /// use graphprep_core::PipelineBuilder;
    ///
    /// let builder = PipelineBuilder::new().with_partition_shuffle(true);
    /// assert!(builder.partition_shuffle());
    /// ```
    #[must_use]
    pub fn with_partition_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Returns whether labelled vertices are shuffled before partitioning.
    #[must_use]
    pub fn partition_shuffle(&self) -> bool {
        self.shuffle
    }

    /// Attaches a random-walk corpus read lazily from `path`.
    #[must_use]
    pub fn with_walks(mut self, path: impl Into<PathBuf>) -> Self {
        self.walks = Some(path.into());
        self
    }

    /// Returns the configured walk corpus path.
    #[must_use]
    pub fn walks(&self) -> Option<&PathBuf> {
        self.walks.as_ref()
    }

    /// Replaces the stage observer (defaults to [`TracingObserver`]).
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Validates the configuration and constructs a [`Pipeline`].
    ///
    /// # Errors
    /// Returns [`crate::PipelineError::Partition`] when the fractions are
    /// invalid.
    ///
    /// # Examples
    /// ```
    /// use graphprep_core::{PipelineBuilder, PipelineErrorCode};
    ///
    /// let err = PipelineBuilder::new()
    ///     .with_fractions(0.6, 0.2, 0.1999)
    ///     .build()
    ///     .expect_err("fractions must sum to one");
    /// assert_eq!(err.code(), PipelineErrorCode::PartitionFailure);
    /// ```
    pub fn build(self) -> Result<Pipeline> {
        let fractions = SplitFractions::new(self.train, self.validation, self.test)?;
        Ok(Pipeline::new(
            Partitioner::new(fractions),
            self.seed,
            self.shuffle,
            self.walks,
            Tracer::new(self.observer),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::error::{PartitionError, PipelineError};

    #[rstest]
    fn defaults_match_documented_values() {
        let pipeline = PipelineBuilder::new().build().expect("defaults are valid");
        assert_eq!(pipeline.fractions(), SplitFractions::default());
        assert_eq!(pipeline.seed(), None);
        assert!(!pipeline.partition_shuffle());
        assert!(pipeline.walks().is_none());
    }

    #[rstest]
    #[case(0.9999)]
    #[case(1.0001)]
    fn build_rejects_fractions_not_summing_to_one(#[case] total: f64) {
        let err = PipelineBuilder::new()
            .with_fractions(0.5, 0.3, total - 0.8)
            .build()
            .expect_err("fractions do not sum to one");
        assert!(matches!(
            err,
            PipelineError::Partition(PartitionError::FractionSum { .. })
        ));
    }

    #[rstest]
    fn build_carries_configuration() {
        let pipeline = PipelineBuilder::new()
            .with_seed(3)
            .with_partition_shuffle(true)
            .with_walks("walks.txt")
            .build()
            .expect("configuration is valid");
        assert_eq!(pipeline.seed(), Some(3));
        assert!(pipeline.partition_shuffle());
        assert_eq!(
            pipeline.walks().map(|path| path.to_string_lossy().into_owned()),
            Some("walks.txt".to_owned())
        );
    }
}
