//! Placeholder feature and label providers for graphs without real signals.
//!
//! Both providers draw exclusively from the generator handed to them by the
//! pipeline, so a fixed pipeline seed reproduces their output exactly.

mod features;
mod labels;

pub use features::ConstantFeatures;
pub use labels::SampledBinaryLabels;
