//! Seed derivation for the independent random streams of a pipeline run.

use rand::{SeedableRng, rngs::SmallRng};

/// SplitMix64 increment (the 64-bit golden ratio) used for stream seed
/// derivation.
const STREAM_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Consumers of randomness within one run.
///
/// Each stream gets its own generator so the order in which stages execute
/// never changes what they draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SeedStream {
    Features,
    Labels,
    Shuffle,
}

impl SeedStream {
    const fn index(self) -> u64 {
        match self {
            Self::Features => 0,
            Self::Labels => 1,
            Self::Shuffle => 2,
        }
    }

    pub(crate) fn seed(self, base_seed: u64) -> u64 {
        splitmix64(base_seed ^ (self.index() + 1).wrapping_mul(STREAM_SEED_SPACING))
    }

    pub(crate) fn rng(self, base_seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(self.seed(base_seed))
    }
}

#[inline]
const fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(STREAM_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}
