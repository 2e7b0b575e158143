//! Seedable pseudo-random generator behind `RANDOM`

use std::time::{SystemTime, UNIX_EPOCH};

const MULTIPLIER: u64 = 48_271;
const MODULUS: u64 = 0x7fff_ffff;

/// Park-Miller minimal standard generator.
#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    /// A generator starting from `seed`.
    pub fn new(seed: u32) -> Self {
        let mut prng = Self { state: 1 };
        prng.seed(seed);
        prng
    }

    /// A generator seeded from the clock.
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    /// Restart the sequence from `seed`.
    pub fn seed(&mut self, seed: u32) {
        let s = u64::from(seed) & MODULUS;
        self.state = if s == 0 || s == MODULUS { 1 } else { s };
        self.next_f64();
    }

    /// Next value in `(0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Integer in `0..max` (`max` is truncated; non-positive yields 0).
    pub fn below(&mut self, max: f64) -> f64 {
        (self.next_f64() * max.trunc()).floor().max(0.0)
    }

    /// Integer in `start..=end`.
    pub fn between(&mut self, start: f64, end: f64) -> f64 {
        (self.next_f64() * (end - start + 1.0)).floor() + start
    }
}

/// A seed derived from the current time.
pub fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
        .unwrap_or(1)
}
