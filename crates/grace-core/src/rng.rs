//! Per-instance random stream.
//!
//! Each component owns one `FieldRng` seeded at construction; nothing in
//! the workspace touches a global generator. The draw order inside every
//! step is fixed, so a trajectory is reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Seeded random stream owned by a single component.
#[derive(Debug, Clone)]
pub struct FieldRng {
    inner: ChaCha8Rng,
}

impl FieldRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    /// Uniform draw in [lo, hi).
    pub fn uniform_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.uniform()
    }

    /// Uniform index in [lo, hi).
    pub fn index_range(&mut self, lo: usize, hi: usize) -> usize {
        self.inner.random_range(lo..hi)
    }

    /// Uniform angle in [0, 2π).
    pub fn angle(&mut self) -> f64 {
        self.uniform() * TAU
    }

    /// One standard normal draw (Box-Muller, second variate discarded).
    pub fn standard_normal(&mut self) -> f64 {
        // 1 - U keeps u1 in (0, 1] so the log stays finite.
        let u1 = 1.0 - self.uniform();
        let u2 = self.uniform();
        (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }

    /// Normal draw with the given mean and standard deviation.
    pub fn gaussian(&mut self, mean: f64, std: f64) -> f64 {
        mean + std * self.standard_normal()
    }

    /// Bernoulli trial: true with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    /// Add independent N(0, std²) noise to every value, in order.
    pub fn add_noise(&mut self, values: &mut [f64], std: f64) {
        for v in values {
            *v += self.gaussian(0.0, std);
        }
    }
}
