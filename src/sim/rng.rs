//! Seeded randomness for game state

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Per-game RNG. Same seed, same run.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: Pcg32,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform in `[0, 1)`
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform in `[lo, hi)`; returns `lo` for an empty range
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..hi)
    }

    /// Uniform index in `[0, n)`; `n` must be non-zero
    pub fn index(&mut self, n: usize) -> usize {
        self.rng.random_range(0..n)
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }

    /// Random heading in radians
    pub fn angle(&mut self) -> f32 {
        self.unit() * std::f32::consts::TAU
    }
}
