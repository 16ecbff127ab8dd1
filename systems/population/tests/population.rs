use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::Arc,
};

use fluid_core::{
    Canvas, Color, ConfigField, ConfigurationError, Mover, MoverConfig, MoverFactory,
    PathSamples, PopulationState, VelocityStep,
};
use fluid_system_population::PopulationController;
use glam::Vec2;

const OFF: Color = Color::from_rgb(0, 0, 0);
const ON: Color = Color::from_rgb(200, 100, 50);

#[derive(Debug)]
struct ScriptedMover {
    id: usize,
    finished: Rc<Cell<bool>>,
    velocity: Rc<RefCell<Vec<f32>>>,
    setup_done: bool,
    updates: u32,
}

impl Mover for ScriptedMover {
    fn setup(&mut self) {
        self.setup_done = true;
    }

    fn update(&mut self) {
        assert!(self.setup_done, "update before setup");
        self.updates += 1;
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.fill_circle(Vec2::new(self.id as f32, 0.0), 1.0, ON);
    }

    fn is_finished(&self) -> bool {
        self.finished.get()
    }

    fn set_noise_velocity(&mut self, velocity: f32) {
        self.velocity.borrow_mut().push(velocity);
    }
}

/// Factory whose movers all share one "finished" switch per spawn slot.
#[derive(Default)]
struct ScriptedFactory {
    configs: Rc<RefCell<Vec<MoverConfig>>>,
    finished: Rc<RefCell<Vec<Rc<Cell<bool>>>>>,
    velocity: Rc<RefCell<Vec<f32>>>,
}

impl MoverFactory for ScriptedFactory {
    type Mover = ScriptedMover;

    fn create(&mut self, config: &MoverConfig) -> ScriptedMover {
        self.configs.borrow_mut().push(config.clone());
        let finished = Rc::new(Cell::new(false));
        self.finished.borrow_mut().push(Rc::clone(&finished));
        ScriptedMover {
            id: self.configs.borrow().len() - 1,
            finished,
            velocity: Rc::clone(&self.velocity),
            setup_done: false,
            updates: 0,
        }
    }
}

struct Harness {
    controller: PopulationController<ScriptedFactory>,
    configs: Rc<RefCell<Vec<MoverConfig>>>,
    finished: Rc<RefCell<Vec<Rc<Cell<bool>>>>>,
    velocity: Rc<RefCell<Vec<f32>>>,
}

impl Harness {
    fn new(capacity: usize) -> Self {
        let factory = ScriptedFactory::default();
        let configs = Rc::clone(&factory.configs);
        let finished = Rc::clone(&factory.finished);
        let velocity = Rc::clone(&factory.velocity);
        let mut controller = PopulationController::new(factory, path(), 0x5eed);
        controller.set_capacity(capacity);
        controller.set_colors(OFF, ON);
        controller
            .set_background_alpha_range(0.0, 1.0)
            .expect("valid background range");
        controller
            .set_noise_velocity_range(0.0, 1.0, 0.25)
            .expect("valid velocity range");
        Self {
            controller,
            configs,
            finished,
            velocity,
        }
    }

    fn finish(&self, index: usize) {
        self.finished.borrow()[index].set(true);
    }

    fn finish_all(&self) {
        for flag in self.finished.borrow().iter() {
            flag.set(true);
        }
    }

    fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.controller.update();
            assert!(self.controller.len() <= self.controller.capacity());
        }
    }
}

fn path() -> Arc<PathSamples> {
    Arc::new(
        PathSamples::new(
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)],
            vec![Vec2::Y; 3],
        )
        .expect("valid path"),
    )
}

#[derive(Default)]
struct CountingCanvas {
    circles: Vec<Vec2>,
}

impl Canvas for CountingCanvas {
    fn fill_circle(&mut self, center: Vec2, _radius: f32, _color: Color) {
        self.circles.push(center);
    }
}

#[test]
fn starts_empty_and_idle() {
    let mut harness = Harness::new(4);
    harness.frames(10);

    assert_eq!(harness.controller.state(), PopulationState::Empty);
    assert!(harness.controller.is_empty());
    assert!(!harness.controller.is_running());
    assert_eq!(harness.controller.background_color(), OFF);
}

#[test]
fn filling_spawns_exactly_one_mover_per_frame() {
    let mut harness = Harness::new(10);
    harness.controller.toggle();

    for expected in 1..10 {
        harness.frames(1);
        assert_eq!(harness.controller.len(), expected);
        assert_eq!(harness.controller.state(), PopulationState::Filling);
    }
}

#[test]
fn reaching_capacity_transitions_to_full_without_more_spawns() {
    let mut harness = Harness::new(3);
    harness.controller.toggle();
    harness.frames(3);
    assert_eq!(harness.controller.len(), 3);
    assert_eq!(harness.controller.state(), PopulationState::Filling);

    harness.frames(1);
    assert_eq!(harness.controller.state(), PopulationState::Full);
    assert_eq!(harness.controller.len(), 3);

    harness.frames(5);
    assert_eq!(harness.controller.state(), PopulationState::Full);
    assert_eq!(harness.configs.borrow().len(), 3, "no spawns once full");
}

#[test]
fn draining_retires_finished_movers_and_empties_in_one_frame() {
    let mut harness = Harness::new(4);
    harness.controller.toggle();
    harness.frames(5);
    assert_eq!(harness.controller.state(), PopulationState::Full);

    harness.controller.toggle();
    assert_eq!(harness.controller.state(), PopulationState::Draining);
    harness.finish_all();
    harness.frames(1);

    assert!(harness.controller.is_empty());
    assert_eq!(harness.controller.state(), PopulationState::Empty);
    assert!(!harness.controller.is_running());
}

#[test]
fn draining_waits_for_movers_to_finish() {
    let mut harness = Harness::new(5);
    harness.controller.toggle();
    harness.frames(5);
    harness.controller.toggle();

    harness.finish(1);
    harness.finish(2);
    harness.finish(4);
    harness.frames(1);
    let remaining: Vec<usize> = harness.controller.movers().iter().map(|m| m.id).collect();
    assert_eq!(remaining, vec![0, 3], "adjacent finished movers are all removed");
    assert_eq!(harness.controller.state(), PopulationState::Draining);

    harness.frames(20);
    assert_eq!(harness.controller.len(), 2, "unfinished movers are never forced out");

    harness.finish_all();
    harness.frames(1);
    assert_eq!(harness.controller.state(), PopulationState::Empty);
}

#[test]
fn toggling_mid_fill_drains_without_reaching_full() {
    let mut harness = Harness::new(10);
    harness.controller.toggle();
    harness.frames(4);
    assert_eq!(harness.controller.len(), 4);

    harness.controller.toggle();
    harness.frames(1);
    assert_eq!(harness.controller.state(), PopulationState::Draining);
    assert_eq!(harness.controller.len(), 4, "no spawn after reversing");
}

#[test]
fn toggling_mid_drain_restarts_filling() {
    let mut harness = Harness::new(6);
    harness.controller.toggle();
    harness.frames(7);
    harness.controller.toggle();
    harness.finish(0);
    harness.frames(1);
    assert_eq!(harness.controller.len(), 5);

    harness.controller.toggle();
    assert_eq!(harness.controller.state(), PopulationState::Filling);
    harness.frames(1);
    assert_eq!(harness.controller.len(), 6);
}

#[test]
fn background_returns_to_off_once_empty() {
    let mut harness = Harness::new(4);
    harness.controller.toggle();
    harness.frames(2);
    assert_ne!(harness.controller.background_color(), OFF);

    harness.controller.toggle();
    harness.finish_all();
    harness.frames(1);
    assert_eq!(harness.controller.background_color(), OFF);
}

#[test]
fn background_blends_toward_on_as_population_grows() {
    let mut harness = Harness::new(4);
    harness.controller.toggle();

    harness.frames(2);
    // Two of four movers: alpha 255 -> 127.5, truncated to 127.
    assert_eq!(harness.controller.background_alpha(), 127.0);
    let half = harness.controller.background_color();
    assert_eq!(half.alpha(), 127);
    assert_eq!(half.red(), 100);

    harness.frames(2);
    assert_eq!(harness.controller.background_alpha(), 0.0);
    assert_eq!(harness.controller.background_color(), ON.with_alpha(0.0));
}

#[test]
fn zero_capacity_never_spawns() {
    let mut harness = Harness::new(0);
    for _ in 0..4 {
        harness.controller.toggle();
        harness.frames(3);
        assert!(harness.controller.is_empty());
        assert_eq!(harness.controller.background_color(), OFF);
        assert!(matches!(
            harness.controller.state(),
            PopulationState::Full | PopulationState::Empty
        ));
    }
    assert!(harness.configs.borrow().is_empty());
}

#[test]
fn velocity_changes_reach_every_live_mover() {
    let mut harness = Harness::new(3);
    harness.controller.toggle();
    harness.frames(3);

    harness.controller.adjust(VelocityStep::Increase);
    assert_eq!(harness.controller.noise_velocity(), 0.25);
    assert_eq!(*harness.velocity.borrow(), vec![0.25; 3]);

    harness.velocity.borrow_mut().clear();
    harness.controller.set_normalized(0.5);
    assert_eq!(*harness.velocity.borrow(), vec![0.5; 3]);
}

#[test]
fn velocity_stays_clamped_under_repeated_adjustment() {
    let mut harness = Harness::new(1);
    for _ in 0..20 {
        harness.controller.adjust(VelocityStep::Increase);
        assert!(harness.controller.noise_velocity() <= 1.0);
    }
    assert_eq!(harness.controller.noise_velocity(), 1.0);
    for _ in 0..20 {
        harness.controller.adjust(VelocityStep::Decrease);
        assert!(harness.controller.noise_velocity() >= 0.0);
    }
    assert_eq!(harness.controller.noise_velocity(), 0.0);
}

#[test]
fn spawned_movers_receive_current_template() {
    let mut harness = Harness::new(8);
    harness
        .controller
        .set_diameter_range(4.0, 6.0)
        .expect("valid diameter range");
    harness
        .controller
        .set_delta_index_range(2, 5)
        .expect("valid delta range");
    harness
        .controller
        .set_mover_alpha_range(10.0, 90.0)
        .expect("valid alpha range");
    harness.controller.set_period(12);
    harness.controller.set_normalized(0.75);
    harness.controller.toggle();
    harness.frames(8);

    let configs = harness.configs.borrow();
    assert_eq!(configs.len(), 8);
    for config in configs.iter() {
        assert!((4.0..6.0).contains(&config.diameter));
        assert!((2..5).contains(&config.delta_index));
        assert_eq!(config.fill, ON);
        assert_eq!(config.period, 12);
        assert_eq!(config.alpha_range.min, 10.0);
        assert_eq!(config.alpha_range.max, 90.0);
        assert_eq!(config.noise_velocity, 0.75);
        assert_eq!(config.path.len(), 3);
    }
}

#[test]
fn every_live_mover_is_updated_each_frame() {
    let mut harness = Harness::new(3);
    harness.controller.toggle();
    harness.frames(6);

    let updates: Vec<u32> = harness
        .controller
        .movers()
        .iter()
        .map(|mover| mover.updates)
        .collect();
    assert_eq!(updates, vec![6, 5, 4], "a spawn is updated in its first frame");
}

#[test]
fn draw_visits_movers_in_population_order() {
    let mut harness = Harness::new(3);
    harness.controller.toggle();
    harness.frames(3);

    let mut canvas = CountingCanvas::default();
    harness.controller.draw(&mut canvas);
    let order: Vec<f32> = canvas.circles.iter().map(|center| center.x).collect();
    assert_eq!(order, vec![0.0, 1.0, 2.0]);
}

#[test]
fn lowering_capacity_keeps_live_movers_until_draining() {
    let mut harness = Harness::new(4);
    harness.controller.toggle();
    harness.frames(5);
    assert_eq!(harness.controller.state(), PopulationState::Full);

    harness.controller.set_capacity(1);
    harness.finish_all();
    for _ in 0..3 {
        harness.controller.update();
    }
    assert_eq!(harness.controller.state(), PopulationState::Full);
    assert_eq!(harness.controller.len(), 4);

    harness.controller.toggle();
    harness.controller.update();
    assert_eq!(harness.controller.state(), PopulationState::Empty);
    assert!(harness.controller.is_empty());
}

#[test]
fn filling_above_capacity_neither_spawns_nor_becomes_full() {
    let mut harness = Harness::new(6);
    harness.controller.toggle();
    harness.frames(3);

    harness.controller.set_capacity(0);
    for _ in 0..4 {
        harness.controller.update();
    }
    assert_eq!(harness.controller.state(), PopulationState::Filling);
    assert_eq!(harness.controller.len(), 3);
    assert_eq!(harness.configs.borrow().len(), 3);

    harness.controller.set_capacity(3);
    harness.controller.update();
    assert_eq!(harness.controller.state(), PopulationState::Full);
    assert_eq!(harness.controller.len(), 3);
}

#[test]
fn invalid_configuration_names_the_field() {
    let mut harness = Harness::new(1);

    let error = harness
        .controller
        .set_background_alpha_range(0.2, 1.5)
        .expect_err("alpha outside unit range");
    assert_eq!(
        error,
        ConfigurationError::OutOfUnitRange {
            field: ConfigField::BackgroundAlpha,
            value: 1.5
        }
    );

    let error = harness
        .controller
        .set_noise_velocity_range(2.0, 1.0, 0.1)
        .expect_err("inverted velocity range");
    assert!(error.to_string().starts_with("noise_velocity range is inverted"));
    assert!(harness.controller.set_diameter_range(3.0, 1.0).is_err());
}
