//! Noise velocity shared by every live mover.

use fluid_core::{ConfigField, ConfigurationError, VelocityStep};

/// Current noise velocity together with its bounds and step.
///
/// The current value always lies within `min..=max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseVelocity {
    min: f32,
    max: f32,
    step: f32,
    current: f32,
}

impl Default for NoiseVelocity {
    fn default() -> Self {
        Self {
            min: 0.002,
            max: 0.05,
            step: 0.002,
            current: 0.002,
        }
    }
}

impl NoiseVelocity {
    /// Creates a velocity starting at `min`.
    ///
    /// # Errors
    ///
    /// Fails when any value is non-finite, the range is inverted, or the step is negative.
    pub fn new(min: f32, max: f32, step: f32) -> Result<Self, ConfigurationError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ConfigurationError::NonFinite {
                field: ConfigField::NoiseVelocity,
            });
        }
        if !step.is_finite() {
            return Err(ConfigurationError::NonFinite {
                field: ConfigField::NoiseVelocityStep,
            });
        }
        if min > max {
            return Err(ConfigurationError::InvertedRange {
                field: ConfigField::NoiseVelocity,
                min: f64::from(min),
                max: f64::from(max),
            });
        }
        if step < 0.0 {
            return Err(ConfigurationError::Negative {
                field: ConfigField::NoiseVelocityStep,
                value: step,
            });
        }

        Ok(Self {
            min,
            max,
            step,
            current: min,
        })
    }

    /// Current velocity.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Distance moved by a single [`Self::adjust`].
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Moves the velocity one step in `direction` and returns the clamped result.
    pub fn adjust(&mut self, direction: VelocityStep) -> f32 {
        let next = self.current + direction.sign() * self.step;
        self.current = next.clamp(self.min, self.max);
        self.current
    }

    /// Maps `t` from `0.0..=1.0` onto the velocity range and returns the clamped result.
    ///
    /// Non-finite input leaves the velocity unchanged.
    pub fn set_normalized(&mut self, t: f32) -> f32 {
        if !t.is_finite() {
            return self.current;
        }
        let next = self.min + (self.max - self.min) * t;
        self.current = next.clamp(self.min, self.max);
        self.current
    }
}
