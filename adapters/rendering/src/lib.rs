#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for fluid population adapters.
//!
//! Backends own the frame loop. Every frame they gather a [`FrameInput`],
//! hand it to [`Sketch::update`], paint [`Sketch::background`], and finally
//! call [`Sketch::draw`]; the order never changes and no call overlaps another.

use anyhow::Result as AnyResult;
use fluid_core::{Canvas, Color, VelocityStep};
use glam::Vec2;
use std::{error::Error, fmt};
use tracing::{debug, info};

/// Input snapshot gathered by adapters before updating the sketch.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a toggle press on this frame.
    pub toggle: bool,
    /// Stepped noise velocity change requested on this frame.
    pub velocity_step: Option<VelocityStep>,
    /// Absolute noise velocity requested on this frame, normalised to `0.0..=1.0`.
    pub velocity_normalized: Option<f32>,
}

/// Frame-driven content presented by a backend.
pub trait Sketch {
    /// Applies input and advances the content by one frame.
    fn update(&mut self, input: &FrameInput);

    /// Colour painted beneath the frame before drawing.
    ///
    /// Translucent colours leave a fading trail of previous frames.
    fn background(&self) -> Color;

    /// Draws the current frame.
    fn draw(&self, canvas: &mut dyn Canvas);
}

/// Window configuration handed to a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Title shown by windowed backends.
    pub window_title: String,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    ///
    /// Returns an error when either dimension is zero.
    pub fn new<T>(window_title: T, width: u32, height: u32) -> Result<Self, RenderingError>
    where
        T: Into<String>,
    {
        if width == 0 || height == 0 {
            return Err(RenderingError::EmptySurface { width, height });
        }

        Ok(Self {
            window_title: window_title.into(),
            width,
            height,
        })
    }

    /// Centre of the surface in pixels.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * 0.5
    }
}

/// Rendering backend capable of presenting a sketch.
pub trait RenderingBackend {
    /// Runs the backend until it finishes or is asked to exit.
    fn run<S>(self, presentation: Presentation, sketch: S) -> AnyResult<()>
    where
        S: Sketch + 'static;
}

/// Circle recorded by a [`RecordingCanvas`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleCommand {
    /// Centre of the circle.
    pub center: Vec2,
    /// Radius of the circle.
    pub radius: f32,
    /// Fill colour.
    pub color: Color,
}

/// Canvas that records draw calls instead of rasterising them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingCanvas {
    background: Option<Color>,
    circles: Vec<CircleCommand>,
}

impl RecordingCanvas {
    /// Starts a new frame painted with `background`, discarding recorded circles.
    pub fn clear(&mut self, background: Color) {
        self.background = Some(background);
        self.circles.clear();
    }

    /// Background of the current frame, if one was painted.
    #[must_use]
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Circles drawn since the last clear, in draw order.
    #[must_use]
    pub fn circles(&self) -> &[CircleCommand] {
        &self.circles
    }
}

impl Canvas for RecordingCanvas {
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circles.push(CircleCommand {
            center,
            radius,
            color,
        });
    }
}

/// Summary of a headless run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadlessSummary {
    /// Number of frames rendered.
    pub frames: u32,
    /// Background painted on the final frame.
    pub last_background: Option<Color>,
    /// Circles drawn on the final frame.
    pub last_circles: usize,
    /// Largest number of circles drawn in a single frame.
    pub peak_circles: usize,
}

/// Backend that renders a fixed number of frames without a window.
#[derive(Clone, Copy, Debug)]
pub struct HeadlessBackend {
    frames: u32,
    toggle_every: Option<u32>,
    log_every: u32,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self {
            frames: 600,
            toggle_every: None,
            log_every: 60,
        }
    }
}

impl HeadlessBackend {
    /// Returns a backend that renders the default number of frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the number of frames rendered before the run ends.
    #[must_use]
    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = frames;
        self
    }

    /// Requests a toggle on frame zero and then every `interval` frames.
    ///
    /// An interval of zero disables scripted toggles.
    #[must_use]
    pub fn with_toggle_every(mut self, interval: u32) -> Self {
        self.toggle_every = (interval > 0).then_some(interval);
        self
    }

    /// Configures how often, in frames, progress is logged.
    #[must_use]
    pub fn with_log_every(mut self, interval: u32) -> Self {
        self.log_every = interval.max(1);
        self
    }

    /// Renders every frame of the run into a recording canvas.
    pub fn render<S>(&self, sketch: &mut S) -> HeadlessSummary
    where
        S: Sketch + ?Sized,
    {
        let mut canvas = RecordingCanvas::default();
        let mut peak_circles = 0;

        for frame in 0..self.frames {
            let input = FrameInput {
                toggle: self
                    .toggle_every
                    .is_some_and(|interval| frame % interval == 0),
                ..FrameInput::default()
            };

            sketch.update(&input);
            canvas.clear(sketch.background());
            sketch.draw(&mut canvas);
            peak_circles = peak_circles.max(canvas.circles().len());

            if frame % self.log_every == 0 {
                debug!(
                    frame,
                    circles = canvas.circles().len(),
                    background = ?canvas.background(),
                    "headless frame rendered"
                );
            }
        }

        HeadlessSummary {
            frames: self.frames,
            last_background: canvas.background(),
            last_circles: canvas.circles().len(),
            peak_circles,
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<S>(self, presentation: Presentation, mut sketch: S) -> AnyResult<()>
    where
        S: Sketch + 'static,
    {
        let summary = self.render(&mut sketch);
        info!(
            title = %presentation.window_title,
            frames = summary.frames,
            peak_circles = summary.peak_circles,
            last_circles = summary.last_circles,
            "headless run complete"
        );
        Ok(())
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Surfaces need a positive width and height.
    EmptySurface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySurface { width, height } => {
                write!(
                    f,
                    "surface dimensions must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
