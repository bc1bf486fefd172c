// Deterministic, portable pseudo-random number generator for lattice walks.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// The generator is hand-rolled so that a given seed yields the same stream on
// every platform and toolchain; a random walk recorded with seed N must replay
// step for step wherever it is re-run.
//
// `harmonic_space` consumes this crate through its `RandomSource` trait (see
// `walk.rs`), so tests can substitute scripted sources while production walks
// use `WalkRng`.
//
// **Critical constraint: determinism.** Every method on `WalkRng` must produce
// identical output given the same prior state. No floating-point arithmetic
// in the core generator and no OS entropy anywhere in this crate.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ generator used to draw walk steps.
///
/// Serializable so that a walker's position in its random stream can be
/// snapshotted alongside its lattice position and resumed later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkRng {
    s: [u64; 4],
}

impl WalkRng {
    /// Create a new generator seeded from a `u64`.
    ///
    /// SplitMix64 expands the seed into the 256-bit state, so even adjacent
    /// seeds (0, 1, 2, ...) start from well-separated states.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }
}

/// SplitMix64, used only to expand a `u64` seed into xoshiro state.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
