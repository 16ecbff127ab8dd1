//! TOML settings describing the window, the population, and the shared path.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fluid_core::{Color, ConfigurationError, MoverFactory, PathSamples};
use fluid_system_population::PopulationController;
use fluid_system_trail::PathShape;
use glam::Vec2;
use serde::Deserialize;

/// Complete settings file. Every section and key is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) window: WindowSettings,
    pub(crate) population: PopulationSettings,
    pub(crate) noise: NoiseSettings,
    pub(crate) mover: MoverSettings,
    pub(crate) background: BackgroundSettings,
    pub(crate) path: PathSettings,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WindowSettings {
    pub(crate) title: String,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Fluid".to_owned(),
            width: 960,
            height: 960,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PopulationSettings {
    pub(crate) capacity: usize,
    pub(crate) seed: u64,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            capacity: 300,
            seed: 0x0f1d_5eed,
        }
    }
}

/// Noise velocity range and step.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct NoiseSettings {
    pub(crate) min: f32,
    pub(crate) max: f32,
    pub(crate) step: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            min: 0.002,
            max: 0.05,
            step: 0.002,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct MoverSettings {
    pub(crate) diameter: [f32; 2],
    pub(crate) alpha: [f32; 2],
    pub(crate) delta_index: [u32; 2],
    pub(crate) deviation_max: f32,
    pub(crate) period: u32,
}

impl Default for MoverSettings {
    fn default() -> Self {
        Self {
            diameter: [2.0, 8.0],
            alpha: [0.0, 200.0],
            delta_index: [1, 4],
            deviation_max: 40.0,
            period: 60,
        }
    }
}

/// Background alpha range, normalised, and the two endpoint colours.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BackgroundSettings {
    pub(crate) alpha: [f32; 2],
    pub(crate) off: HexColor,
    pub(crate) on: HexColor,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            alpha: [0.05, 0.25],
            off: HexColor(Color::from_rgb(0x10, 0x12, 0x1a)),
            on: HexColor(Color::from_rgb(0xe8, 0xf1, 0xff)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PathSettings {
    pub(crate) shape: PathShape,
    pub(crate) samples: usize,
    /// Half-size of the shape as a fraction of the window.
    pub(crate) extent: f32,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            shape: PathShape::Lissajous,
            samples: 720,
            extent: 0.4,
        }
    }
}

/// Colour written as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub(crate) struct HexColor(pub(crate) Color);

/// Reasons a hex colour string could not be parsed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum HexColorError {
    /// The string did not start with `#`.
    #[error("colour `{0}` must start with `#`")]
    MissingHash(String),
    /// The string had neither six nor eight hex digits.
    #[error("colour `{0}` must have 6 or 8 hex digits")]
    InvalidLength(String),
    /// The string contained a non-hex character.
    #[error("colour `{0}` contains a non-hex digit")]
    InvalidDigit(String),
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if !value.starts_with('#') {
            return Err(HexColorError::MissingHash(value));
        }
        let digits = &value[1..];
        if digits.len() != 6 && digits.len() != 8 {
            return Err(HexColorError::InvalidLength(value));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HexColorError::InvalidDigit(value));
        }

        let channel = |index: usize| {
            u8::from_str_radix(&digits[index..index + 2], 16)
                .map_err(|_| HexColorError::InvalidDigit(value.clone()))
        };
        let red = channel(0)?;
        let green = channel(2)?;
        let blue = channel(4)?;
        let alpha = if digits.len() == 8 {
            channel(6)?
        } else {
            u8::MAX
        };

        Ok(Self(Color::from_rgba(red, green, blue, alpha)))
    }
}

impl Settings {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings at {}", path.display()))
    }

    /// Parses settings from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings toml")
    }

    /// Samples the configured path shape centred in a `width` by `height` surface.
    pub(crate) fn build_path(
        &self,
        width: u32,
        height: u32,
    ) -> Result<PathSamples, ConfigurationError> {
        let size = Vec2::new(width as f32, height as f32);
        self.path
            .shape
            .sample(self.path.samples, size * 0.5, size * self.path.extent)
    }

    /// Pushes every population setting through the controller's validating setters.
    pub(crate) fn apply<F: MoverFactory>(
        &self,
        controller: &mut PopulationController<F>,
    ) -> Result<(), ConfigurationError> {
        controller.set_capacity(self.population.capacity);
        controller.set_noise_velocity_range(self.noise.min, self.noise.max, self.noise.step)?;
        let [diameter_min, diameter_max] = self.mover.diameter;
        controller.set_diameter_range(diameter_min, diameter_max)?;
        let [alpha_min, alpha_max] = self.mover.alpha;
        controller.set_mover_alpha_range(alpha_min, alpha_max)?;
        let [delta_min, delta_max] = self.mover.delta_index;
        controller.set_delta_index_range(delta_min, delta_max)?;
        controller.set_deviation_max(self.mover.deviation_max)?;
        controller.set_period(self.mover.period);
        let [background_min, background_max] = self.background.alpha;
        controller.set_background_alpha_range(background_min, background_max)?;
        controller.set_colors(self.background.off.0, self.background.on.0);
        Ok(())
    }
}
