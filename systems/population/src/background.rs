//! Background colour derived from the live population size.

use fluid_core::{Color, CHANNEL_MAX};

/// Background alpha bounds on the 0–255 scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundAlphaRange {
    /// Alpha reached when the population sits at capacity.
    pub min: f32,
    /// Alpha used when the population is nearly empty.
    pub max: f32,
}

impl BackgroundAlphaRange {
    /// Creates a range from values already scaled to 0–255.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Creates a range from normalised values, scaling them by 255.
    #[must_use]
    pub fn from_unit(min: f32, max: f32) -> Self {
        Self::new(min * CHANNEL_MAX, max * CHANNEL_MAX)
    }
}

/// Outcome of blending the background for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackgroundBlend {
    /// Alpha written into both endpoint colours.
    pub alpha: f32,
    /// Position between the "off" and "on" colours, in `0.0..=1.0`.
    pub factor: f32,
    /// Blended background colour.
    pub color: Color,
}

/// Maps the population size onto the background alpha.
///
/// The endpoints are inverted: an empty population maps to `range.max` and a
/// full one to `range.min`. The result is truncated to a whole channel value.
/// A zero capacity yields `range.min`; sizes above capacity are clamped.
#[must_use]
pub fn population_alpha(population: usize, capacity: usize, range: BackgroundAlphaRange) -> f32 {
    if capacity == 0 {
        return range.min.trunc();
    }

    let population = population.min(capacity) as f32;
    let alpha = map(population, 0.0, capacity as f32, range.max, range.min);
    alpha.trunc()
}

/// Recovers the normalised blend position of `alpha` within `range`.
///
/// `range.max` maps to 0 and `range.min` maps to 1. A degenerate range maps to 1.
#[must_use]
pub fn blend_factor(alpha: f32, range: BackgroundAlphaRange) -> f32 {
    if (range.min - range.max).abs() <= f32::EPSILON {
        return 1.0;
    }
    map(alpha, range.max, range.min, 0.0, 1.0).clamp(0.0, 1.0)
}

/// Blends `off` toward `on` for the given population size.
///
/// Both endpoints keep their RGB and share the population alpha, so the blend
/// only varies the hue mix and never the transparency.
#[must_use]
pub fn blend_background(
    population: usize,
    capacity: usize,
    range: BackgroundAlphaRange,
    off: Color,
    on: Color,
) -> BackgroundBlend {
    let alpha = population_alpha(population, capacity, range);
    let factor = blend_factor(alpha, range);
    let color = off.with_alpha(alpha).lerp(on.with_alpha(alpha), factor);

    BackgroundBlend {
        alpha,
        factor,
        color,
    }
}

fn map(value: f32, start1: f32, stop1: f32, start2: f32, stop2: f32) -> f32 {
    start2 + (stop2 - start2) * ((value - start1) / (stop1 - start1))
}
