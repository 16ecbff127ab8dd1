#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Trail movers that drift along a shared path under one-dimensional noise.
//!
//! A [`TrailMover`] walks the shared [`PathSamples`], advancing a fixed number
//! of samples per frame, and drifts along the local normal by a noise-driven
//! offset. Each lap fades in at its start and out before its end; the frame a
//! lap completes the mover reports itself finished so the population can
//! retire it without a visible pop.

mod noise;
mod shapes;

use std::sync::Arc;

use fluid_core::{AlphaRange, Canvas, Color, Mover, MoverConfig, MoverFactory, PathSamples};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use self::noise::DriftNoise;
pub use self::shapes::PathShape;

/// Mover following the shared path with a noisy normal offset.
#[derive(Clone, Debug)]
pub struct TrailMover {
    radius: f32,
    fill: Color,
    deviation_max: f32,
    period: u32,
    alpha_range: AlphaRange,
    noise_velocity: f32,
    delta_index: usize,
    path: Arc<PathSamples>,
    noise: DriftNoise,
    start_offset: usize,
    cursor: usize,
    frame_in_lap: u32,
    lap_frames: u32,
    noise_position: f32,
    position: Vec2,
    alpha: f32,
    finished: bool,
}

impl TrailMover {
    /// Builds a mover from spawn configuration, a noise seed, and the path sample it starts on.
    #[must_use]
    pub fn new(config: &MoverConfig, noise_seed: u32, start_offset: usize) -> Self {
        Self {
            radius: config.diameter * 0.5,
            fill: config.fill,
            deviation_max: config.deviation_max,
            period: config.period,
            alpha_range: config.alpha_range,
            noise_velocity: config.noise_velocity,
            delta_index: config.delta_index.max(1) as usize,
            path: Arc::clone(&config.path),
            noise: DriftNoise::new(noise_seed),
            start_offset,
            cursor: 0,
            frame_in_lap: 0,
            lap_frames: 1,
            noise_position: 0.0,
            position: Vec2::ZERO,
            alpha: config.alpha_range.min,
            finished: false,
        }
    }

    /// Current centre of the mover.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current alpha on the 0–255 scale.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Noise velocity currently driving the drift.
    #[must_use]
    pub fn noise_velocity(&self) -> f32 {
        self.noise_velocity
    }

    /// Number of frames one lap takes.
    #[must_use]
    pub fn lap_frames(&self) -> u32 {
        self.lap_frames
    }

    fn resolve_position(&self) -> Vec2 {
        let (anchor, normal) = self.path.sample(self.start_offset + self.cursor);
        let drift = self.noise.sample(self.noise_position) * 2.0 - 1.0;
        anchor + normal * (drift * self.deviation_max)
    }

    fn resolve_alpha(&self) -> f32 {
        if self.period == 0 {
            return self.alpha_range.max;
        }
        let period = self.period as f32;
        let fade_in = self.frame_in_lap as f32 / period;
        let fade_out = self.lap_frames.saturating_sub(self.frame_in_lap) as f32 / period;
        self.alpha_range.at(fade_in.min(fade_out))
    }
}

impl Mover for TrailMover {
    fn setup(&mut self) {
        let samples = self.path.len();
        self.lap_frames = u32::try_from(samples.div_ceil(self.delta_index)).unwrap_or(u32::MAX);
        self.cursor = 0;
        self.frame_in_lap = 0;
        self.noise_position = 0.0;
        self.finished = false;
        self.position = self.resolve_position();
        self.alpha = self.resolve_alpha();
    }

    fn update(&mut self) {
        let samples = self.path.len();
        self.finished = false;
        self.cursor += self.delta_index;
        self.frame_in_lap = self.frame_in_lap.saturating_add(1);
        if self.cursor >= samples {
            self.cursor = 0;
            self.frame_in_lap = 0;
            self.finished = true;
        }

        self.noise_position += self.noise_velocity;
        self.position = self.resolve_position();
        self.alpha = self.resolve_alpha();
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        if self.alpha <= 0.0 {
            return;
        }
        canvas.fill_circle(self.position, self.radius, self.fill.with_alpha(self.alpha));
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn set_noise_velocity(&mut self, velocity: f32) {
        self.noise_velocity = velocity;
    }
}

/// Seeded factory assigning each trail mover its own noise stream and start sample.
#[derive(Debug)]
pub struct TrailFactory {
    rng: ChaCha8Rng,
}

impl TrailFactory {
    /// Creates a factory whose draws are reproducible for `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl MoverFactory for TrailFactory {
    type Mover = TrailMover;

    fn create(&mut self, config: &MoverConfig) -> TrailMover {
        let noise_seed = self.rng.gen::<u32>();
        let start_offset = self.rng.gen_range(0..config.path.len());
        TrailMover::new(config, noise_seed, start_offset)
    }
}
