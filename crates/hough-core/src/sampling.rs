//! Random source used by the randomized detectors.
//!
//! Detectors take any [`UniformSource`]; every `rand` generator is one, so
//! tests pass a seeded `StdRng` and production code uses [`default_rng`].

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Uniform floats in `[0, 1)`.
pub trait UniformSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        let i = (self.next_f64() * len as f64) as usize;
        i.min(len.saturating_sub(1))
    }
}

impl<R: RngCore + ?Sized> UniformSource for R {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// `StdRng` seeded once from the wall clock.
pub fn default_rng() -> StdRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed);
    StdRng::seed_from_u64(nanos)
}

/// Deterministic generator for reproducible runs.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
