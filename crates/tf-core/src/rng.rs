//! Deterministic simulation RNG.
//!
//! Every random decision a simulation makes (initial placement, speeds,
//! target resampling) goes through one `SimRng` seeded from
//! [`SimConfig::seed`][crate::SimConfig::seed].  Ticks run on a single
//! thread in a fixed particle order, so the same seed and the same number of
//! ticks always reproduce the same particle state.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Simulation-level RNG.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed for the `stream`-th independent run derived from `seed`.  Used
    /// when one configuration spawns successive simulations (one per cluster
    /// generation) that must not replay the same animation.
    pub fn mix_seed(seed: u64, stream: u64) -> u64 {
        seed ^ stream.wrapping_mul(MIXING_CONSTANT)
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
