#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population controller that grows and shrinks a set of movers.
//!
//! Each frame the controller evaluates its [`PopulationState`] machine,
//! spawns at most one mover while filling, retires finished movers while
//! draining, recomputes the background colour from the population size, and
//! then advances every live mover.

mod background;
mod template;
mod velocity;

use std::{cmp::Ordering, fmt, sync::Arc};

use fluid_core::{
    Canvas, Color, ConfigField, ConfigurationError, Mover, MoverConfig, MoverFactory,
    PathSamples, PopulationState, VelocityStep,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

pub use self::background::{
    blend_background, blend_factor, population_alpha, BackgroundAlphaRange, BackgroundBlend,
};
pub use self::template::SpawnTemplate;
pub use self::velocity::NoiseVelocity;

const DEFAULT_CAPACITY: usize = 200;

/// Owns the mover population and derives the background colour from it.
pub struct PopulationController<F: MoverFactory> {
    factory: F,
    rng: ChaCha8Rng,
    capacity: usize,
    population: Vec<F::Mover>,
    state: PopulationState,
    running: bool,
    velocity: NoiseVelocity,
    template: SpawnTemplate,
    path: Arc<PathSamples>,
    background_range: BackgroundAlphaRange,
    background_alpha: f32,
    color_off: Color,
    color_on: Color,
    background: Color,
}

impl<F: MoverFactory> fmt::Debug for PopulationController<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopulationController")
            .field("state", &self.state)
            .field("population", &self.population.len())
            .field("capacity", &self.capacity)
            .field("noise_velocity", &self.velocity.current())
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl<F: MoverFactory> PopulationController<F> {
    /// Creates an empty controller that builds movers with `factory` along `path`.
    ///
    /// `rng_seed` drives the diameter and delta index draws.
    #[must_use]
    pub fn new(factory: F, path: Arc<PathSamples>, rng_seed: u64) -> Self {
        let background_range = BackgroundAlphaRange::from_unit(0.05, 0.25);
        let color_off = Color::from_rgb(0x10, 0x12, 0x1a);

        Self {
            factory,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            capacity: DEFAULT_CAPACITY,
            population: Vec::new(),
            state: PopulationState::Empty,
            running: false,
            velocity: NoiseVelocity::default(),
            template: SpawnTemplate::default(),
            path,
            background_range,
            background_alpha: background_range.max,
            color_off,
            color_on: Color::from_rgb(0xe8, 0xf1, 0xff),
            background: color_off,
        }
    }

    /// Advances the population by one frame.
    pub fn update(&mut self) {
        self.update_population();
        self.update_background();
        for mover in &mut self.population {
            mover.update();
        }
    }

    /// Draws every live mover in population order.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        for mover in &self.population {
            mover.draw(canvas);
        }
    }

    /// Reverses the direction of the population.
    ///
    /// Takes effect on the next [`Self::update`].
    pub fn toggle(&mut self) {
        self.transition(self.state.toggled());
    }

    /// Steps the noise velocity and forwards it to every live mover.
    pub fn adjust(&mut self, direction: VelocityStep) {
        let velocity = self.velocity.adjust(direction);
        self.broadcast_velocity(velocity);
    }

    /// Sets the noise velocity from a normalised position and forwards it to every live mover.
    pub fn set_normalized(&mut self, t: f32) {
        let velocity = self.velocity.set_normalized(t);
        self.broadcast_velocity(velocity);
    }

    /// Background colour computed by the latest update.
    #[must_use]
    pub fn background_color(&self) -> Color {
        self.background
    }

    /// Background alpha computed by the latest update, on the 0–255 scale.
    #[must_use]
    pub fn background_alpha(&self) -> f32 {
        self.background_alpha
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PopulationState {
        self.state
    }

    /// Number of live movers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.population.len()
    }

    /// Whether no movers are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Whether the latest update left at least one mover alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Maximum number of live movers.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current noise velocity.
    #[must_use]
    pub fn noise_velocity(&self) -> f32 {
        self.velocity.current()
    }

    /// Live movers in population order.
    #[must_use]
    pub fn movers(&self) -> &[F::Mover] {
        &self.population
    }

    /// Replaces the maximum number of live movers.
    ///
    /// Lowering the capacity below the live population never removes movers.
    /// They live on until the population drains, and a population above its
    /// capacity neither spawns nor becomes full.
    pub fn set_capacity(&mut self, capacity: usize) {
        debug!(capacity, "population capacity configured");
        self.capacity = capacity;
    }

    /// Replaces the noise velocity range and step, resetting the velocity to `min`.
    ///
    /// Live movers keep their velocity until the next adjustment.
    ///
    /// # Errors
    ///
    /// Fails when a value is non-finite, `min > max`, or `step` is negative.
    pub fn set_noise_velocity_range(
        &mut self,
        min: f32,
        max: f32,
        step: f32,
    ) -> Result<(), ConfigurationError> {
        self.velocity = NoiseVelocity::new(min, max, step)?;
        debug!(min, max, step, "noise velocity range configured");
        Ok(())
    }

    /// Replaces the diameter range for future spawns.
    ///
    /// # Errors
    ///
    /// Fails when a bound is non-finite or `min > max`.
    pub fn set_diameter_range(&mut self, min: f32, max: f32) -> Result<(), ConfigurationError> {
        self.template.set_diameter_range(min, max)
    }

    /// Replaces the per-mover alpha range for future spawns.
    ///
    /// # Errors
    ///
    /// Fails when a bound is non-finite or `min > max`.
    pub fn set_mover_alpha_range(&mut self, min: f32, max: f32) -> Result<(), ConfigurationError> {
        self.template.set_alpha_range(min, max)
    }

    /// Replaces the delta index range for future spawns.
    ///
    /// # Errors
    ///
    /// Fails when `min > max`.
    pub fn set_delta_index_range(&mut self, min: u32, max: u32) -> Result<(), ConfigurationError> {
        self.template.set_delta_index_range(min, max)
    }

    /// Replaces the largest offset along the path normal for future spawns.
    ///
    /// # Errors
    ///
    /// Fails when the value is non-finite or negative.
    pub fn set_deviation_max(&mut self, deviation_max: f32) -> Result<(), ConfigurationError> {
        self.template.set_deviation_max(deviation_max)
    }

    /// Replaces the fade period, in frames, for future spawns.
    pub fn set_period(&mut self, period: u32) {
        self.template.set_period(period);
    }

    /// Replaces the background alpha range from normalised bounds.
    ///
    /// The bounds are scaled by 255 and the current background alpha resets to
    /// the scaled maximum.
    ///
    /// # Errors
    ///
    /// Fails when a bound is non-finite or outside `0.0..=1.0`.
    pub fn set_background_alpha_range(
        &mut self,
        min: f32,
        max: f32,
    ) -> Result<(), ConfigurationError> {
        for value in [min, max] {
            if !value.is_finite() {
                return Err(ConfigurationError::NonFinite {
                    field: ConfigField::BackgroundAlpha,
                });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::OutOfUnitRange {
                    field: ConfigField::BackgroundAlpha,
                    value,
                });
            }
        }

        self.background_range = BackgroundAlphaRange::from_unit(min, max);
        self.background_alpha = self.background_range.max;
        debug!(min, max, "background alpha range configured");
        Ok(())
    }

    /// Replaces the endpoint colours and resets the background to `off`.
    pub fn set_colors(&mut self, off: Color, on: Color) {
        self.color_off = off;
        self.color_on = on;
        self.background = off;
    }

    /// Replaces the path shared by future spawns.
    ///
    /// Live movers keep the path they were built with.
    pub fn set_path(&mut self, path: Arc<PathSamples>) {
        self.path = path;
    }

    fn update_population(&mut self) {
        match self.state {
            PopulationState::Filling => match self.population.len().cmp(&self.capacity) {
                Ordering::Less => self.spawn(),
                Ordering::Equal => self.transition(PopulationState::Full),
                Ordering::Greater => {}
            },
            PopulationState::Full => {}
            PopulationState::Draining => {
                self.retire_finished();
                if self.population.is_empty() {
                    self.transition(PopulationState::Empty);
                }
            }
            PopulationState::Empty => {}
        }
        self.running = !self.population.is_empty();
    }

    fn update_background(&mut self) {
        if !self.running {
            self.background = self.color_off;
            return;
        }

        let blend = blend_background(
            self.population.len(),
            self.capacity,
            self.background_range,
            self.color_off,
            self.color_on,
        );
        self.background_alpha = blend.alpha;
        self.background = blend.color;
    }

    fn spawn(&mut self) {
        let config = MoverConfig {
            diameter: self.template.sample_diameter(&mut self.rng),
            fill: self.color_on,
            deviation_max: self.template.deviation_max(),
            period: self.template.period(),
            alpha_range: self.template.alpha_range(),
            noise_velocity: self.velocity.current(),
            delta_index: self.template.sample_delta_index(&mut self.rng),
            path: Arc::clone(&self.path),
        };

        let mut mover = self.factory.create(&config);
        mover.setup();
        self.population.push(mover);
        trace!(
            population = self.population.len(),
            diameter = config.diameter,
            delta_index = config.delta_index,
            "mover spawned"
        );
    }

    fn retire_finished(&mut self) {
        let before = self.population.len();
        self.population.retain(|mover| !mover.is_finished());
        let retired = before - self.population.len();
        if retired > 0 {
            trace!(retired, population = self.population.len(), "movers retired");
        }
    }

    fn broadcast_velocity(&mut self, velocity: f32) {
        for mover in &mut self.population {
            mover.set_noise_velocity(velocity);
        }
    }

    fn transition(&mut self, next: PopulationState) {
        if next != self.state {
            debug!(
                from = ?self.state,
                to = ?next,
                population = self.population.len(),
                "population state changed"
            );
        }
        self.state = next;
    }
}
