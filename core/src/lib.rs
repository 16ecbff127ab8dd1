#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the fluid population engine.
//!
//! This crate defines the vocabulary that connects the population controller,
//! concrete movers, and rendering adapters. The controller owns a population of
//! [`Mover`] values created through a [`MoverFactory`] from a [`MoverConfig`],
//! drives a [`PopulationState`] machine, and blends a background [`Color`].
//! Adapters supply a [`Canvas`] that movers draw into.

use std::{fmt, sync::Arc};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Upper bound of an 8-bit colour channel expressed as a float.
pub const CHANNEL_MAX: f32 = 255.0;

/// RGBA colour with 8-bit channels, matching the host surface's integer colour model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
    alpha: u8,
}

impl Color {
    /// Creates an opaque colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba(red, green, blue, u8::MAX)
    }

    /// Creates a colour from byte RGBA components.
    #[must_use]
    pub const fn from_rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Alpha component of the colour.
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Returns the same RGB with the alpha replaced by `alpha` on the 0–255 scale.
    ///
    /// The value is clamped to the channel range and truncated toward zero.
    /// Non-finite values produce a fully transparent colour.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: channel_from_f32_truncated(alpha),
            ..self
        }
    }

    /// Interpolates every channel linearly between `self` and `other`.
    ///
    /// `amount` is clamped to `0.0..=1.0`; channels are rounded to the nearest integer.
    #[must_use]
    pub fn lerp(self, other: Self, amount: f32) -> Self {
        let amount = if amount.is_nan() {
            0.0
        } else {
            amount.clamp(0.0, 1.0)
        };

        Self {
            red: lerp_channel(self.red, other.red, amount),
            green: lerp_channel(self.green, other.green, amount),
            blue: lerp_channel(self.blue, other.blue, amount),
            alpha: lerp_channel(self.alpha, other.alpha, amount),
        }
    }

    /// Channels expressed as floats in the range `0.0..=1.0`, in RGBA order.
    #[must_use]
    pub fn to_unit_rgba(self) -> [f32; 4] {
        [
            f32::from(self.red) / CHANNEL_MAX,
            f32::from(self.green) / CHANNEL_MAX,
            f32::from(self.blue) / CHANNEL_MAX,
            f32::from(self.alpha) / CHANNEL_MAX,
        ]
    }
}

fn lerp_channel(from: u8, to: u8, amount: f32) -> u8 {
    let from = f32::from(from);
    let to = f32::from(to);
    (from + (to - from) * amount).round().clamp(0.0, CHANNEL_MAX) as u8
}

fn channel_from_f32_truncated(value: f32) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, CHANNEL_MAX) as u8
}

/// Phase of the population lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopulationState {
    /// No movers are alive and none are being spawned.
    #[default]
    Empty,
    /// One mover is spawned per frame until capacity is reached.
    Filling,
    /// The population sits at capacity.
    Full,
    /// Finished movers are retired every frame until none remain.
    Draining,
}

impl PopulationState {
    /// State that a user toggle moves into from `self`.
    ///
    /// Toggling while filling reverses immediately; toggling while draining
    /// restarts filling immediately.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Empty | Self::Draining => Self::Filling,
            Self::Full | Self::Filling => Self::Draining,
        }
    }
}

/// Direction of a stepped noise velocity adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VelocityStep {
    /// Adds one step to the current velocity.
    Increase,
    /// Subtracts one step from the current velocity.
    Decrease,
}

impl VelocityStep {
    /// Multiplier applied to the configured step.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Increase => 1.0,
            Self::Decrease => -1.0,
        }
    }
}

/// Inclusive alpha range on the 0–255 scale used by a mover's fade.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlphaRange {
    /// Alpha shown while the mover is fully faded out.
    pub min: f32,
    /// Alpha shown while the mover is fully faded in.
    pub max: f32,
}

impl AlphaRange {
    /// Creates a new alpha range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Alpha at the normalised fade position `t`, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn at(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t.clamp(0.0, 1.0)
    }
}

/// Positions and normals sampled along the path every mover follows.
///
/// The samples are owned outside the controller and shared read-only through
/// [`Arc`] by every mover for its entire lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct PathSamples {
    positions: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl PathSamples {
    /// Pairs positions with their normals.
    ///
    /// # Errors
    ///
    /// Fails when the sequences are empty or differ in length.
    pub fn new(positions: Vec<Vec2>, normals: Vec<Vec2>) -> Result<Self, ConfigurationError> {
        if positions.len() != normals.len() {
            return Err(ConfigurationError::MismatchedPath {
                positions: positions.len(),
                normals: normals.len(),
            });
        }
        if positions.is_empty() {
            return Err(ConfigurationError::EmptyPath);
        }
        Ok(Self { positions, normals })
    }

    /// Number of samples along the path; never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always `false`; construction rejects empty paths.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sampled positions in path order.
    #[must_use]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Unit normals matching [`Self::positions`] index for index.
    #[must_use]
    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    /// Position and normal at `index`, wrapping around the path.
    #[must_use]
    pub fn sample(&self, index: usize) -> (Vec2, Vec2) {
        let index = index % self.positions.len();
        (self.positions[index], self.normals[index])
    }
}

/// Values used to build a single mover at spawn time.
#[derive(Clone, Debug)]
pub struct MoverConfig {
    /// Diameter drawn for this mover.
    pub diameter: f32,
    /// Fill colour, RGB taken from the "on" endpoint.
    pub fill: Color,
    /// Largest offset along the path normal.
    pub deviation_max: f32,
    /// Length of the fade in and fade out, in frames.
    pub period: u32,
    /// Alpha range the fade moves through.
    pub alpha_range: AlphaRange,
    /// Noise velocity current at spawn time.
    pub noise_velocity: f32,
    /// Number of path samples advanced per frame.
    pub delta_index: u32,
    /// Shared path samples.
    pub path: Arc<PathSamples>,
}

/// Drawing surface supplied by the rendering adapter.
pub trait Canvas {
    /// Fills a circle centred at `center`.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Animated entity managed by the population controller.
///
/// The controller never inspects a mover beyond this capability set, so any
/// motion or visual algorithm implementing it is substitutable.
pub trait Mover {
    /// Initialises the mover after construction and before the first update.
    fn setup(&mut self);

    /// Advances the mover by one frame.
    fn update(&mut self);

    /// Draws the mover's current frame.
    fn draw(&self, canvas: &mut dyn Canvas);

    /// Whether the mover completed its path and may be retired.
    fn is_finished(&self) -> bool;

    /// Replaces the noise velocity driving the mover's motion.
    fn set_noise_velocity(&mut self, velocity: f32);
}

/// Builds movers from spawn-time configuration.
pub trait MoverFactory {
    /// Concrete mover produced by the factory.
    type Mover: Mover;

    /// Creates a configured, not yet set up, mover.
    fn create(&mut self, config: &MoverConfig) -> Self::Mover;
}

/// Configuration value that failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigField {
    /// Noise velocity range.
    NoiseVelocity,
    /// Noise velocity step.
    NoiseVelocityStep,
    /// Mover diameter range.
    Diameter,
    /// Per-mover alpha range.
    MoverAlpha,
    /// Background alpha range.
    BackgroundAlpha,
    /// Path delta index range.
    DeltaIndex,
    /// Maximum normal deviation.
    DeviationMax,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoiseVelocity => "noise_velocity",
            Self::NoiseVelocityStep => "noise_velocity_step",
            Self::Diameter => "diameter",
            Self::MoverAlpha => "mover_alpha",
            Self::BackgroundAlpha => "background_alpha",
            Self::DeltaIndex => "delta_index",
            Self::DeviationMax => "deviation_max",
        };
        f.write_str(name)
    }
}

/// Errors reported when configuring the population or its path.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// A range's lower bound exceeds its upper bound.
    #[error("{field} range is inverted (min {min} > max {max})")]
    InvertedRange {
        /// Field whose range failed validation.
        field: ConfigField,
        /// Provided lower bound.
        min: f64,
        /// Provided upper bound.
        max: f64,
    },
    /// A value was NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Field that received the non-finite value.
        field: ConfigField,
    },
    /// A normalised value fell outside `0.0..=1.0`.
    #[error("{field} must lie within 0.0..=1.0 (received {value})")]
    OutOfUnitRange {
        /// Field that received the value.
        field: ConfigField,
        /// Provided value.
        value: f32,
    },
    /// A step or magnitude was negative.
    #[error("{field} must not be negative (received {value})")]
    Negative {
        /// Field that received the value.
        field: ConfigField,
        /// Provided value.
        value: f32,
    },
    /// The path contained no samples.
    #[error("path must contain at least one sample")]
    EmptyPath,
    /// Positions and normals differ in length.
    #[error("path has {positions} positions but {normals} normals")]
    MismatchedPath {
        /// Number of positions supplied.
        positions: usize,
        /// Number of normals supplied.
        normals: usize,
    },
}
