use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic pseudo-random stream shared by generation and simulation.
///
/// A single stream is seeded from the 32-bit session seed and threaded by
/// mutable reference through every call site that needs randomness. Replaying
/// the same seed with the same call order reproduces every outcome.
#[derive(Clone, Debug)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Creates a new stream from the provided session seed.
    #[must_use]
    pub fn from_seed(seed: u32) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(u64::from(seed)),
        }
    }

    /// Draws a value uniformly from `0.0..1.0`.
    pub fn unit(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Returns `true` with the provided probability.
    pub fn chance(&mut self, probability: f32) -> bool {
        self.unit() < probability
    }

    /// Draws an integer uniformly from `low..=high`.
    ///
    /// Returns `low` when the range is empty.
    pub fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// Draws an index uniformly from `0..len`, or `0` for an empty range.
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.inner.gen_range(0..len)
    }

    /// Draws an angle uniformly from `0.0..TAU`.
    pub fn angle(&mut self) -> f32 {
        unit_to_angle(self.unit())
    }

    /// Draws `-1.0` or `1.0` with equal probability.
    pub fn sign(&mut self) -> f32 {
        if self.chance(0.5) {
            -1.0
        } else {
            1.0
        }
    }

    /// Draws a symmetric perturbation in `-spread / 2..spread / 2`.
    pub fn jitter(&mut self, spread: f32) -> f32 {
        (self.unit() - 0.5) * spread
    }
}

// The product may round up to exactly `TAU` in f32.
fn unit_to_angle(unit: f32) -> f32 {
    (unit * TAU).rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_seeds_replay_identical_streams() {
        let mut first = SimRng::from_seed(0xdead_beef);
        let mut second = SimRng::from_seed(0xdead_beef);

        for _ in 0..64 {
            assert_eq!(first.unit().to_bits(), second.unit().to_bits());
            assert_eq!(first.range_inclusive(-3, 9), second.range_inclusive(-3, 9));
        }
    }

    #[test]
    fn draws_stay_within_requested_bounds() {
        let mut rng = SimRng::from_seed(7);

        for _ in 0..512 {
            let unit = rng.unit();
            assert!((0.0..1.0).contains(&unit));
            let value = rng.range_inclusive(2, 4);
            assert!((2..=4).contains(&value));
            assert!(rng.index(3) < 3);
            assert!((0.0..TAU).contains(&rng.angle()));
        }
    }

    #[test]
    fn angles_never_reach_a_full_turn() {
        let below_one = 1.0_f32 - f32::EPSILON / 2.0;

        for unit in [0.0, 0.5, below_one, 1.0] {
            let angle = unit_to_angle(unit);
            assert!((0.0..TAU).contains(&angle), "{unit} mapped to {angle}");
        }
    }

    #[test]
    fn degenerate_ranges_do_not_panic() {
        let mut rng = SimRng::from_seed(1);

        assert_eq!(rng.range_inclusive(5, 5), 5);
        assert_eq!(rng.range_inclusive(5, 1), 5);
        assert_eq!(rng.index(0), 0);
    }
}
