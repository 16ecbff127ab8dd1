//! Closed path shapes sampled into shared positions and normals.

use std::f32::consts::{FRAC_PI_2, TAU};

use fluid_core::{ConfigurationError, PathSamples};
use glam::Vec2;
use serde::{Deserialize, Serialize};

const TANGENT_EPSILON: f32 = 1e-3;

/// Closed curve that movers travel along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathShape {
    /// Circle, or an ellipse when the extent is not square.
    #[default]
    Circle,
    /// Lissajous figure with a 3:2 frequency ratio.
    Lissajous,
    /// Three-petal rose.
    Rose,
}

impl PathShape {
    /// Samples `count` evenly spaced points around the shape.
    ///
    /// Points are centred on `center` and scaled by `extent` along each axis.
    /// Normals are unit vectors perpendicular to the local tangent.
    ///
    /// # Errors
    ///
    /// Fails when `count` is zero.
    pub fn sample(
        self,
        count: usize,
        center: Vec2,
        extent: Vec2,
    ) -> Result<PathSamples, ConfigurationError> {
        let mut positions = Vec::with_capacity(count);
        let mut normals = Vec::with_capacity(count);

        for index in 0..count {
            let theta = TAU * index as f32 / count as f32;
            positions.push(center + self.unit_point(theta) * extent);

            let tangent = (self.unit_point(theta + TANGENT_EPSILON)
                - self.unit_point(theta - TANGENT_EPSILON))
                * extent;
            normals.push(tangent.perp().normalize_or_zero());
        }

        PathSamples::new(positions, normals)
    }

    fn unit_point(self, theta: f32) -> Vec2 {
        match self {
            Self::Circle => Vec2::new(theta.cos(), theta.sin()),
            Self::Lissajous => Vec2::new((3.0 * theta + FRAC_PI_2).sin(), (2.0 * theta).sin()),
            Self::Rose => {
                let radius = (3.0 * theta).cos();
                Vec2::new(radius * theta.cos(), radius * theta.sin())
            }
        }
    }
}
