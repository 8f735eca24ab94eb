//! Train/validation/test partitioning of labelled vertices.
//!
//! The partitioner slices its input contiguously: the first
//! `floor(N * train)` keys become the training split, the next
//! `floor(N * validation)` keys the validation split and everything left
//! over the test split. Keeping the remainder in the test split means floor
//! rounding can never drop or duplicate a key.
//!
//! The input order is the split order. Callers that want a random split
//! either supply keys that are already shuffled or configure a shuffle seed
//! with [`Partitioner::with_shuffle_seed`].

use std::collections::HashMap;

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};
use tracing::debug;

use crate::{
    VertexId,
    error::{PartitionError, PipelineError},
    labels::{Label, LabelMap},
};

/// Tolerance applied when checking that the three fractions sum to one.
///
/// It absorbs the rounding of decimal literals such as `0.7 + 0.2 + 0.1`
/// while still rejecting sums such as `0.9999` or `1.0001`.
pub const FRACTION_SUM_TOLERANCE: f64 = 1e-9;

/// Validated train/validation/test fractions.
///
/// # Examples
/// ```
/// use graphprep_core::SplitFractions;
///
/// let fractions = SplitFractions::new(0.6, 0.2, 0.2)?;
/// assert_eq!(fractions.train(), 0.6);
/// assert!(SplitFractions::new(0.6, 0.2, 0.1999).is_err());
/// # Ok::<(), graphprep_core::PartitionError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitFractions {
    train: f64,
    validation: f64,
    test: f64,
}

impl SplitFractions {
    /// Validates and stores the three fractions.
    ///
    /// # Errors
    /// Returns [`PartitionError::InvalidFraction`] when a fraction is not a
    /// finite value in `[0, 1]` and [`PartitionError::FractionSum`] when the
    /// fractions do not sum to one.
    #[expect(clippy::float_arithmetic, reason = "fraction sum validation")]
    pub fn new(train: f64, validation: f64, test: f64) -> Result<Self, PartitionError> {
        for (split, value) in [("train", train), ("validation", validation), ("test", test)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PartitionError::InvalidFraction { split, value });
            }
        }
        let sum = train + validation + test;
        if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(PartitionError::FractionSum {
                train,
                validation,
                test,
                sum,
            });
        }
        Ok(Self {
            train,
            validation,
            test,
        })
    }

    /// Returns the training fraction.
    #[must_use]
    pub const fn train(&self) -> f64 {
        self.train
    }

    /// Returns the validation fraction.
    #[must_use]
    pub const fn validation(&self) -> f64 {
        self.validation
    }

    /// Returns the test fraction.
    ///
    /// The test split is sized by remainder, so this value is informational.
    #[must_use]
    pub const fn test(&self) -> f64 {
        self.test
    }
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            train: 0.6,
            validation: 0.2,
            test: 0.2,
        }
    }
}

/// Three disjoint, order-preserving splits of labelled vertices.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexPartition {
    train: Vec<VertexId>,
    validation: Vec<VertexId>,
    test: Vec<VertexId>,
}

impl VertexPartition {
    /// Returns the training vertices.
    #[must_use]
    pub fn train(&self) -> &[VertexId] {
        &self.train
    }

    /// Returns the validation vertices.
    #[must_use]
    pub fn validation(&self) -> &[VertexId] {
        &self.validation
    }

    /// Returns the test vertices.
    #[must_use]
    pub fn test(&self) -> &[VertexId] {
        &self.test
    }

    /// Returns the combined size of the three splits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    /// Returns whether every split is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decomposes the partition into `(train, validation, test)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<VertexId>, Vec<VertexId>, Vec<VertexId>) {
        (self.train, self.validation, self.test)
    }

    /// Looks up the label of every vertex in each split.
    ///
    /// # Errors
    /// Returns [`PipelineError::MissingLabel`] when a split references a
    /// vertex that `labels` does not contain.
    ///
    /// # Examples
    /// ```
    /// use graphprep_core::{Label, LabelMap, partition};
    ///
    /// let labels: LabelMap = (0..5).map(|v| (v, Label::new((v % 2) as u32))).collect();
    /// let split = partition(labels.keys(), 0.6, 0.2, 0.2)?;
    /// let split_labels = split.labels(&labels)?;
    /// assert_eq!(split_labels.train(), &[Label::new(0), Label::new(1), Label::new(0)]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn labels(&self, labels: &LabelMap) -> Result<SplitLabels, PipelineError> {
        let lookup = |vertices: &[VertexId]| {
            vertices
                .iter()
                .map(|&vertex| {
                    labels
                        .get(vertex)
                        .ok_or(PipelineError::MissingLabel { vertex })
                })
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(SplitLabels {
            train: lookup(&self.train)?,
            validation: lookup(&self.validation)?,
            test: lookup(&self.test)?,
        })
    }
}

/// Labels aligned with the vertices of a [`VertexPartition`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitLabels {
    train: Vec<Label>,
    validation: Vec<Label>,
    test: Vec<Label>,
}

impl SplitLabels {
    /// Returns the training labels.
    #[must_use]
    pub fn train(&self) -> &[Label] {
        &self.train
    }

    /// Returns the validation labels.
    #[must_use]
    pub fn validation(&self) -> &[Label] {
        &self.validation
    }

    /// Returns the test labels.
    #[must_use]
    pub fn test(&self) -> &[Label] {
        &self.test
    }
}

/// Splits key sequences according to a fixed set of fractions.
///
/// # Examples
/// ```
/// use graphprep_core::{Partitioner, SplitFractions};
///
/// let partitioner = Partitioner::new(SplitFractions::new(0.6, 0.2, 0.2)?);
/// let keys: Vec<usize> = (0..10).collect();
/// let split = partitioner.partition(&keys)?;
/// assert_eq!(split.train(), &[0, 1, 2, 3, 4, 5]);
/// assert_eq!(split.validation(), &[6, 7]);
/// assert_eq!(split.test(), &[8, 9]);
/// # Ok::<(), graphprep_core::PartitionError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Partitioner {
    fractions: SplitFractions,
    shuffle_seed: Option<u64>,
}

impl Partitioner {
    /// Creates a partitioner that keeps the input order.
    #[must_use]
    pub const fn new(fractions: SplitFractions) -> Self {
        Self {
            fractions,
            shuffle_seed: None,
        }
    }

    /// Shuffles the keys with a generator seeded from `seed` before slicing.
    #[must_use]
    pub const fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Returns the configured fractions.
    #[must_use]
    pub const fn fractions(&self) -> SplitFractions {
        self.fractions
    }

    /// Returns the shuffle seed, if shuffling is enabled.
    #[must_use]
    pub const fn shuffle_seed(&self) -> Option<u64> {
        self.shuffle_seed
    }

    /// Splits `keys` into train, validation and test sequences.
    ///
    /// # Errors
    /// Returns [`PartitionError::SizeMismatch`] or [`PartitionError::Overlap`]
    /// if the produced splits violate their postconditions.
    pub fn partition(&self, keys: &[VertexId]) -> Result<VertexPartition, PartitionError> {
        let ordered = match self.shuffle_seed {
            Some(seed) => {
                let mut shuffled = keys.to_vec();
                shuffled.shuffle(&mut SmallRng::seed_from_u64(seed));
                shuffled
            }
            None => keys.to_vec(),
        };

        let total = ordered.len();
        let train_count = split_count(total, self.fractions.train);
        let validation_count =
            split_count(total, self.fractions.validation).min(total - train_count);

        let mut train = ordered;
        let mut validation = train.split_off(train_count);
        let test = validation.split_off(validation_count);
        let partition = VertexPartition {
            train,
            validation,
            test,
        };
        check_postconditions(&partition, total)?;
        debug!(
            train = partition.train.len(),
            validation = partition.validation.len(),
            test = partition.test.len(),
            "partitioned labelled vertices"
        );
        Ok(partition)
    }
}

/// Splits `keys` with the given fractions, keeping their order.
///
/// # Errors
/// Returns a [`PartitionError`] when the fractions are invalid or the
/// postconditions fail.
///
/// # Examples
/// ```
/// use graphprep_core::partition;
///
/// let split = partition(&[42], 0.6, 0.2, 0.2)?;
/// assert!(split.train().is_empty());
/// assert!(split.validation().is_empty());
/// assert_eq!(split.test(), &[42]);
/// # Ok::<(), graphprep_core::PartitionError>(())
/// ```
pub fn partition(
    keys: &[VertexId],
    train: f64,
    validation: f64,
    test: f64,
) -> Result<VertexPartition, PartitionError> {
    Partitioner::new(SplitFractions::new(train, validation, test)?).partition(keys)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "split sizes are floor(N * fraction) with fraction in [0, 1]"
)]
fn split_count(total: usize, fraction: f64) -> usize {
    ((total as f64) * fraction).floor().max(0.0) as usize
}

fn check_postconditions(partition: &VertexPartition, total: usize) -> Result<(), PartitionError> {
    if partition.len() != total {
        return Err(PartitionError::SizeMismatch {
            expected: total,
            actual: partition.len(),
        });
    }
    let mut owner: HashMap<VertexId, usize> = HashMap::with_capacity(total);
    let splits = [&partition.train, &partition.validation, &partition.test];
    for (split_index, split) in splits.into_iter().enumerate() {
        for &vertex in split {
            if let Some(&existing) = owner.get(&vertex) {
                if existing != split_index {
                    return Err(PartitionError::Overlap { vertex });
                }
            } else {
                owner.insert(vertex, split_index);
            }
        }
    }
    Ok(())
}
