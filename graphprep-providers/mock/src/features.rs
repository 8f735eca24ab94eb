use graphprep_core::{FeatureMatrix, FeatureProvider, ProviderError};
use rand::rngs::SmallRng;

/// Feature provider that gives every vertex the same constant vector.
///
/// The default is a single column of ones.
///
/// # Examples
/// ```
/// use graphprep_core::FeatureProvider;
/// use graphprep_providers_mock::ConstantFeatures;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let features = ConstantFeatures::default().features(3, &mut SmallRng::seed_from_u64(0))?;
/// assert_eq!(features.data(), &[1.0, 1.0, 1.0]);
/// # Ok::<(), graphprep_core::ProviderError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantFeatures {
    dimension: usize,
    value: f32,
}

impl ConstantFeatures {
    /// Creates a provider emitting `dimension` copies of `value` per vertex.
    ///
    /// # Errors
    /// Returns [`ProviderError::ZeroDimension`] when `dimension` is zero.
    pub const fn new(dimension: usize, value: f32) -> Result<Self, ProviderError> {
        if dimension == 0 {
            return Err(ProviderError::ZeroDimension);
        }
        Ok(Self { dimension, value })
    }

    /// Returns the width of every feature row.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the constant feature value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }
}

impl Default for ConstantFeatures {
    fn default() -> Self {
        Self {
            dimension: 1,
            value: 1.0,
        }
    }
}

impl FeatureProvider for ConstantFeatures {
    fn name(&self) -> &str {
        "constant-features"
    }

    fn features(

        &self,

        vertices: usize,

        _rng: &mut SmallRng,

    ) -> Result<FeatureMatrix, ProviderError> {
        FeatureMatrix::filled(vertices, self.dimension, self.value)
    }
}
