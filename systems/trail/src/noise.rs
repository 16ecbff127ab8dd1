//! Seeded one-dimensional Perlin drift.

use noise::{NoiseFn, Perlin};

/// Perlin noise sampled along a single axis and remapped to `0.0..=1.0`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DriftNoise {
    perlin: Perlin,
}

impl DriftNoise {
    pub(crate) fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Noise at position `t`; whole-number positions sit at the midpoint.
    pub(crate) fn sample(&self, t: f32) -> f32 {
        let value = self.perlin.get([f64::from(t), 0.0]) as f32;
        ((value + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_unit_interval() {
        let noise = DriftNoise::new(17);
        for step in 0..2_000 {
            let value = noise.sample(step as f32 * 0.037 - 20.0);
            assert!((0.0..=1.0).contains(&value), "noise {value} out of range");
        }
    }

    #[test]
    fn whole_positions_sit_at_the_midpoint() {
        let noise = DriftNoise::new(3);
        assert!((noise.sample(4.0) - 0.5).abs() < 1e-6);
        assert!((noise.sample(-2.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn is_continuous() {
        let noise = DriftNoise::new(9);
        let before = noise.sample(5.3 - 1e-4);
        let after = noise.sample(5.3 + 1e-4);
        assert!((before - after).abs() < 1e-2);
    }

    #[test]
    fn different_seeds_diverge() {
        let first = DriftNoise::new(1);
        let second = DriftNoise::new(2);
        let differing = (0..32)
            .map(|cell| cell as f32 + 0.37)
            .filter(|&t| (first.sample(t) - second.sample(t)).abs() > 1e-4)
            .count();
        assert!(differing > 16);
    }
}
