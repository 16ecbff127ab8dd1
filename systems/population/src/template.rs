//! Values every newly spawned mover is built from.

use fluid_core::{AlphaRange, ConfigField, ConfigurationError};
use rand::Rng;

/// Spawn template shared by all future movers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnTemplate {
    diameter_min: f32,
    diameter_max: f32,
    deviation_max: f32,
    period: u32,
    alpha_range: AlphaRange,
    delta_index_min: u32,
    delta_index_max: u32,
}

impl Default for SpawnTemplate {
    fn default() -> Self {
        Self {
            diameter_min: 2.0,
            diameter_max: 8.0,
            deviation_max: 40.0,
            period: 60,
            alpha_range: AlphaRange::new(0.0, 200.0),
            delta_index_min: 1,
            delta_index_max: 4,
        }
    }
}

impl SpawnTemplate {
    /// Replaces the diameter range sampled for each spawn.
    ///
    /// # Errors
    ///
    /// Fails when a bound is non-finite or `min > max`.
    pub fn set_diameter_range(&mut self, min: f32, max: f32) -> Result<(), ConfigurationError> {
        validate_float_range(ConfigField::Diameter, min, max)?;
        self.diameter_min = min;
        self.diameter_max = max;
        Ok(())
    }

    /// Replaces the alpha range handed to each mover.
    ///
    /// # Errors
    ///
    /// Fails when a bound is non-finite or `min > max`.
    pub fn set_alpha_range(&mut self, min: f32, max: f32) -> Result<(), ConfigurationError> {
        validate_float_range(ConfigField::MoverAlpha, min, max)?;
        self.alpha_range = AlphaRange::new(min, max);
        Ok(())
    }

    /// Replaces the delta index range sampled for each spawn.
    ///
    /// # Errors
    ///
    /// Fails when `min > max`.
    pub fn set_delta_index_range(&mut self, min: u32, max: u32) -> Result<(), ConfigurationError> {
        if min > max {
            return Err(ConfigurationError::InvertedRange {
                field: ConfigField::DeltaIndex,
                min: f64::from(min),
                max: f64::from(max),
            });
        }
        self.delta_index_min = min;
        self.delta_index_max = max;
        Ok(())
    }

    /// Replaces the largest offset along the path normal.
    ///
    /// # Errors
    ///
    /// Fails when the value is non-finite or negative.
    pub fn set_deviation_max(&mut self, deviation_max: f32) -> Result<(), ConfigurationError> {
        if !deviation_max.is_finite() {
            return Err(ConfigurationError::NonFinite {
                field: ConfigField::DeviationMax,
            });
        }
        if deviation_max < 0.0 {
            return Err(ConfigurationError::Negative {
                field: ConfigField::DeviationMax,
                value: deviation_max,
            });
        }
        self.deviation_max = deviation_max;
        Ok(())
    }

    /// Replaces the fade period, in frames.
    pub fn set_period(&mut self, period: u32) {
        self.period = period;
    }

    /// Largest offset along the path normal.
    #[must_use]
    pub const fn deviation_max(&self) -> f32 {
        self.deviation_max
    }

    /// Fade period in frames.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Alpha range handed to each mover.
    #[must_use]
    pub const fn alpha_range(&self) -> AlphaRange {
        self.alpha_range
    }

    /// Draws a diameter uniformly from `[min, max)`, or `min` when the range is empty.
    pub fn sample_diameter<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.diameter_min < self.diameter_max {
            rng.gen_range(self.diameter_min..self.diameter_max)
        } else {
            self.diameter_min
        }
    }

    /// Draws a delta index uniformly from `[min, max)`, or `min` when the range is empty.
    pub fn sample_delta_index<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.delta_index_min < self.delta_index_max {
            rng.gen_range(self.delta_index_min..self.delta_index_max)
        } else {
            self.delta_index_min
        }
    }
}

pub(crate) fn validate_float_range(
    field: ConfigField,
    min: f32,
    max: f32,
) -> Result<(), ConfigurationError> {
    if !min.is_finite() || !max.is_finite() {
        return Err(ConfigurationError::NonFinite { field });
    }
    if min > max {
        return Err(ConfigurationError::InvertedRange {
            field,
            min: f64::from(min),
            max: f64::from(max),
        });
    }
    Ok(())
}
