use graphprep_core::{Label, LabelMap, LabelProvider, ProviderError};
use rand::{Rng, rngs::SmallRng, seq::index};
use tracing::debug;

const DEFAULT_LABELLED_FRACTION: f64 = 0.1;
const DEFAULT_POSITIVE_PROBABILITY: f64 = 2.0 / 3.0;

/// Label provider that samples a fraction of vertices and labels each one
/// `1` with a fixed probability, otherwise `0`.
///
/// Vertices are drawn uniformly without replacement, and the returned
/// [`LabelMap`] keeps the sample order.
///
/// # Examples
/// ```
/// use graphprep_core::LabelProvider;
/// use graphprep_providers_mock::SampledBinaryLabels;
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let provider = SampledBinaryLabels::new()
///     .with_labelled_fraction(0.5)?
///     .with_positive_probability(1.0)?;
/// let labels = provider.labels(10, &mut SmallRng::seed_from_u64(9))?;
/// assert_eq!(labels.len(), 5);
/// assert!(labels.iter().all(|(vertex, label)| vertex < 10 && label.get() == 1));
/// # Ok::<(), graphprep_core::ProviderError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledBinaryLabels {
    labelled_fraction: f64,
    positive_probability: f64,
}

impl SampledBinaryLabels {
    /// Creates a provider labelling 10% of vertices, two thirds of them `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            labelled_fraction: DEFAULT_LABELLED_FRACTION,
            positive_probability: DEFAULT_POSITIVE_PROBABILITY,
        }
    }

    /// Sets the fraction of vertices that receive a label.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidFraction`] unless `fraction` is a
    /// finite value in `[0, 1]`.
    pub fn with_labelled_fraction(mut self, fraction: f64) -> Result<Self, ProviderError> {
        self.labelled_fraction = checked_fraction("labelled_fraction", fraction)?;
        Ok(self)
    }

    /// Sets the probability that a sampled vertex is labelled `1`.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidFraction`] unless `probability` is a
    /// finite value in `[0, 1]`.
    pub fn with_positive_probability(mut self, probability: f64) -> Result<Self, ProviderError> {
        self.positive_probability = checked_fraction("positive_probability", probability)?;
        Ok(self)
    }

    /// Returns the fraction of vertices that receive a label.
    #[must_use]
    pub const fn labelled_fraction(&self) -> f64 {
        self.labelled_fraction
    }

    /// Returns the probability of label `1`.
    #[must_use]
    pub const fn positive_probability(&self) -> f64 {
        self.positive_probability
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "sample size is floor(n * fraction) with fraction in [0, 1]"
    )]
    fn sample_size(&self, vertices: usize) -> usize {
        let size = ((vertices as f64) * self.labelled_fraction).floor() as usize;
        size.min(vertices)
    }
}

impl Default for SampledBinaryLabels {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelProvider for SampledBinaryLabels {
    fn name(&self) -> &str {
        "sampled-binary-labels"
    }

    fn labels(&self, vertices: usize, rng: &mut SmallRng) -> Result<LabelMap, ProviderError> {
        let amount = self.sample_size(vertices);
        let sampled = index::sample(rng, vertices, amount);
        let mut labels = LabelMap::new();
        for vertex in sampled.iter() {
            let positive = rng.gen_bool(self.positive_probability);
            labels.insert(vertex, Label::new(u32::from(positive)))?;
        }
        debug!(vertices, labelled = labels.len(), "sampled binary labels");
        Ok(labels)
    }
}

fn checked_fraction(parameter: &'static str, value: f64) -> Result<f64, ProviderError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ProviderError::InvalidFraction { parameter, value })
    }
}
