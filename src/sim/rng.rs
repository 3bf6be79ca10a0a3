//! The single source of randomness for layout decisions
//!
//! Everything random in a run (platform widths, gaps, bonus items) is drawn
//! through [`RandomSource`], so a test can script the exact outcomes.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform random draws in `[0, 1)`
pub trait RandomSource {
    fn unit(&mut self) -> f32;

    /// Uniform draw from `[lo, hi)`; returns `lo` for an empty range
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + self.unit() * (hi - lo)
    }

    /// Bernoulli draw with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.unit() < p
    }
}

impl RandomSource for Pcg32 {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Seeded production source
pub fn seeded(seed: u64) -> Box<dyn RandomSource> {
    Box::new(Pcg32::seed_from_u64(seed))
}

/// Replays a fixed list of draws, cycling when exhausted
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// Always draws the same value
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn unit(&mut self) -> f32 {
        let Some(&value) = self.values.get(self.cursor % self.values.len().max(1)) else {
            return 0.0;
        };
        self.cursor += 1;
        value
    }
}
