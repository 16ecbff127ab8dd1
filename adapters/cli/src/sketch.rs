//! Sketch wiring the population controller into a rendering backend.

use fluid_core::{Canvas, Color, MoverFactory};
use fluid_rendering::{FrameInput, Sketch};
use fluid_system_population::PopulationController;

/// Applies per-frame input to the controller before advancing it.
#[derive(Debug)]
pub(crate) struct FluidSketch<F: MoverFactory> {
    controller: PopulationController<F>,
}

impl<F: MoverFactory> FluidSketch<F> {
    pub(crate) fn new(controller: PopulationController<F>) -> Self {
        Self { controller }
    }
}

impl<F: MoverFactory> Sketch for FluidSketch<F> {
    fn update(&mut self, input: &FrameInput) {
        if input.toggle {
            self.controller.toggle();
        }
        if let Some(step) = input.velocity_step {
            self.controller.adjust(step);
        }
        if let Some(t) = input.velocity_normalized {
            self.controller.set_normalized(t);
        }
        self.controller.update();
    }

    fn background(&self) -> Color {
        self.controller.background_color()
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        self.controller.draw(canvas);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::settings::Settings;
    use fluid_core::{PopulationState, VelocityStep};
    use fluid_rendering::HeadlessBackend;
    use fluid_system_trail::TrailFactory;

    fn sketch(capacity: usize) -> FluidSketch<TrailFactory> {
        let mut settings = Settings::default();
        settings.population.capacity = capacity;
        let path = settings.build_path(320, 240).expect("default path");
        let mut controller = PopulationController::new(TrailFactory::new(1), Arc::new(path), 1);
        settings.apply(&mut controller).expect("default settings are valid");
        FluidSketch::new(controller)
    }

    #[test]
    fn toggle_input_starts_filling() {
        let mut sketch = sketch(8);
        sketch.update(&FrameInput {
            toggle: true,
            ..FrameInput::default()
        });

        assert_eq!(sketch.controller.state(), PopulationState::Filling);
        assert_eq!(sketch.controller.len(), 1);
    }

    #[test]
    fn velocity_inputs_reach_the_controller() {
        let mut sketch = sketch(8);
        sketch.update(&FrameInput {
            velocity_normalized: Some(1.0),
            ..FrameInput::default()
        });
        assert!((sketch.controller.noise_velocity() - 0.05).abs() < 1e-6);

        sketch.update(&FrameInput {
            velocity_step: Some(VelocityStep::Increase),
            ..FrameInput::default()
        });
        assert_eq!(sketch.controller.noise_velocity(), 0.05, "clamped at maximum");
    }

    #[test]
    fn headless_run_draws_the_population() {
        let mut sketch = sketch(16);
        let summary = HeadlessBackend::new()
            .with_frames(40)
            .with_toggle_every(0)
            .render(&mut sketch);
        assert_eq!(summary.peak_circles, 0, "nothing spawns without a toggle");

        sketch.controller.toggle();
        let summary = HeadlessBackend::new().with_frames(30).render(&mut sketch);
        assert_eq!(sketch.controller.len(), 16);
        assert!(summary.peak_circles > 0);
        assert!(summary.peak_circles <= 16);
    }
}
