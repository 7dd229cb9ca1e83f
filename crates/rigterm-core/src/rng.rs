//! Random sources for the simulated feeds
//!
//! Production wiring uses [`XorShiftRng`] seeded from the wall clock; tests
//! use [`ScriptedRandom`] to decide exactly which ticks fire.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of uniform samples in `[0, 1)`
pub trait RandomSource: Send {
    fn next_f64(&mut self) -> f64;

    /// Uniform index into a collection of `len` items. `None` when empty.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let i = (self.next_f64() * len as f64) as usize;
        Some(i.min(len - 1))
    }

    /// True with the given probability: the sample must strictly exceed
    /// `1 - probability`
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() > 1.0 - probability
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Deterministic xorshift64 generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift requires a non-zero state
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Seed from the current wall clock
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;
        Self::new(nanos)
    }

    /// Generate the next raw u64 value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for XorShiftRng {
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Default for XorShiftRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Replays a fixed list of samples, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    samples: VecDeque<f64>,
}

impl ScriptedRandom {
    /// Samples are clamped into `[0, 1)`. An empty script always yields 0.
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples
                .into_iter()
                .map(|s| s.clamp(0.0, 1.0 - f64::EPSILON))
                .collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        match self.samples.pop_front() {
            Some(s) => {
                self.samples.push_back(s);
                s
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = XorShiftRng::new(42);
        let mut rng2 = XorShiftRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_range() {
        let mut rng = XorShiftRng::new(42);

        for _ in 0..1000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
        }

        for _ in 0..100 {
            let i = rng.pick_index(4).unwrap();
            assert!(i < 4);
        }
        assert_eq!(rng.pick_index(0), None);
    }

    #[test]
    fn test_zero_seed_is_usable() {
        let mut rng = XorShiftRng::new(0);
        assert_ne!(rng.next_u64(), 0);
    }

    #[test]
    fn test_scripted_cycles() {
        let mut rng = ScriptedRandom::new([0.1, 0.9]);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.next_f64(), 0.9);
        assert_eq!(rng.next_f64(), 0.1);
    }

    #[test]
    fn test_chance_threshold() {
        // 30% chance fires only for samples in the top 30% of the range
        let mut rng = ScriptedRandom::new([0.69, 0.71]);
        assert!(!rng.chance(0.3));
        assert!(rng.chance(0.3));
    }

    #[test]
    fn test_chance_boundary_sample_misses() {
        let mut rng = ScriptedRandom::new([1.0 - 0.3, 0.0]);
        assert!(!rng.chance(0.3));
        assert!(!rng.chance(1.0));
        assert!(!rng.chance(0.0));
    }

    #[test]
    fn test_pick_index_upper_edge() {
        let mut rng = ScriptedRandom::new([0.999_999]);
        assert_eq!(rng.pick_index(4), Some(3));
    }
}
