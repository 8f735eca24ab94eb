//! Pluggable feature and label capabilities.
//!
//! Providers receive the vertex count of the loaded graph and an explicit
//! random source. They never see process-wide randomness, so the same seed
//! always reproduces the same output.

use rand::rngs::SmallRng;

use crate::{error::ProviderError, features::FeatureMatrix, labels::LabelMap};

/// Supplies a dense feature row for every vertex.
///
/// Conformant implementations return exactly `vertices` rows of a consistent
/// width.
///
/// # Examples
/// ```
/// use graphprep_core::{FeatureMatrix, FeatureProvider, ProviderError};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// struct Zeros;
///
/// impl FeatureProvider for Zeros {
///     fn name(&self) -> &str { "zeros" }
///     fn features(
///         &self,
///         vertices: usize,
///         _: &mut SmallRng,
///     ) -> Result<FeatureMatrix, ProviderError> {
///         FeatureMatrix::filled(vertices, 2, 0.0)
///     }
/// }
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let features = Zeros.features(3, &mut rng)?;
/// assert_eq!((features.rows(), features.dimension()), (3, 2));
/// # Ok::<(), ProviderError>(())
/// ```
pub trait FeatureProvider: Send + Sync {
    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Produces the feature matrix for a graph with `vertices` vertices.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] when the features cannot be produced.
    fn features(&self, vertices: usize, rng: &mut SmallRng)
    -> Result<FeatureMatrix, ProviderError>;
}

/// Supplies labels for some or all vertices.
///
/// Conformant implementations only use keys in `[0, vertices)`. The order in
/// which labels are inserted is the order the partitioner splits them in.
pub trait LabelProvider: Send + Sync {
    /// Returns a human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Produces labels for a graph with `vertices` vertices.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] when the labels cannot be produced.
    fn labels(&self, vertices: usize, rng: &mut SmallRng) -> Result<LabelMap, ProviderError>;
}

/// Checks a feature matrix against the provider contract.
pub(crate) fn validate_features(
    features: &FeatureMatrix,
    vertices: usize,
) -> Result<(), ProviderError> {
    if features.rows() != vertices {
        return Err(ProviderError::RowCountMismatch {
            expected: vertices,
            actual: features.rows(),
        });
    }
    Ok(())
}

/// Checks a label map against the provider contract.
pub(crate) fn validate_labels(labels: &LabelMap, vertices: usize) -> Result<(), ProviderError> {
    labels.ensure_within(vertices)
}
