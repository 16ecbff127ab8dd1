#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the fluid population.

mod settings;
mod sketch;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use fluid_rendering::{HeadlessBackend, Presentation, RenderingBackend};
use fluid_rendering_macroquad::MacroquadBackend;
use fluid_system_population::PopulationController;
use fluid_system_trail::TrailFactory;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::{settings::Settings, sketch::FluidSketch};

/// Animated mover population that fades the background as it grows.
#[derive(Debug, Parser)]
#[command(name = "fluid", version)]
struct CliArgs {
    /// TOML settings file; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Render without a window for a fixed number of frames.
    #[arg(long)]
    headless: bool,
    /// Frames rendered by a headless run.
    #[arg(long, default_value_t = 600, value_name = "COUNT")]
    frames: u32,
    /// Frames between scripted toggles in a headless run; zero disables them.
    #[arg(long, default_value_t = 240, value_name = "COUNT")]
    toggle_every: u32,
    /// Overrides the random seed from the settings file.
    #[arg(long)]
    seed: Option<u64>,
    /// Render as fast as possible instead of syncing to the display.
    #[arg(long)]
    no_vsync: bool,
    /// Log frame timings once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the fluid command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.population.seed = seed;
    }

    let presentation = Presentation::new(
        settings.window.title.clone(),
        settings.window.width,
        settings.window.height,
    )
    .context("invalid window settings")?;
    let path = settings
        .build_path(presentation.width, presentation.height)
        .context("invalid path settings")?;

    let seed = settings.population.seed;
    let factory = TrailFactory::new(seed.rotate_left(32));
    let mut controller = PopulationController::new(factory, Arc::new(path), seed);
    settings
        .apply(&mut controller)
        .context("invalid population settings")?;
    info!(
        capacity = controller.capacity(),
        seed,
        shape = ?settings.path.shape,
        "population configured"
    );

    let sketch = FluidSketch::new(controller);
    if args.headless {
        HeadlessBackend::new()
            .with_frames(args.frames)
            .with_toggle_every(args.toggle_every)
            .run(presentation, sketch)
    } else {
        MacroquadBackend::new()
            .with_vsync(!args.no_vsync)
            .with_show_fps(args.show_fps)
            .run(presentation, sketch)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
