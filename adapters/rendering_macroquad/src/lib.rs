#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the fluid population.
//!
//! The sketch never plays sound, so macroquad is built without its default
//! `audio` feature.
//!
//! Frames are painted into a persistent render target rather than the window
//! itself. The sketch's background is blended over the previous frame as a
//! translucent rectangle, so movers leave trails that fade at a rate set by
//! the background alpha.

mod input;

use self::input::{gather_frame_input, KeyboardShortcuts};
use anyhow::Result;
use fluid_core::{Canvas, Color};
use fluid_rendering::{Presentation, RenderingBackend, Sketch};
use glam::Vec2;
use macroquad::{
    camera::{set_camera, set_default_camera, Camera2D},
    color::WHITE,
    math::{Rect, Vec2 as MacroquadVec2},
    texture::{draw_texture_ex, render_target, DrawTextureParams, FilterMode},
};
use std::time::{Duration, Instant};
use tracing::info;

#[doc(hidden)]
pub use self::input::{normalized_velocity_for_cursor, normalized_velocity_for_digit};

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Per-frame timings fed to the FPS counter.
#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    update_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_update: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds,
            avg_update: self.update_accum / frames,
            avg_render: self.render_accum / frames,
        };
        *self = Self::default();
        Some(metrics)
    }
}

/// Canvas drawing straight into the active macroquad camera.
struct MacroquadCanvas;

impl Canvas for MacroquadCanvas {
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(color));
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<S>(self, presentation: Presentation, mut sketch: S) -> Result<()>
    where
        S: Sketch + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            width,
            height,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(width).unwrap_or(i32::MAX),
            window_height: i32::try_from(height).unwrap_or(i32::MAX),
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        info!(width, height, "opening macroquad window");

        macroquad::Window::from_config(config, async move {
            let surface_width = width as f32;
            let surface_height = height as f32;
            let target = render_target(width, height);
            target.texture.set_filter(FilterMode::Linear);

            let mut camera =
                Camera2D::from_display_rect(Rect::new(0.0, 0.0, surface_width, surface_height));
            camera.render_target = Some(target);

            let mut canvas = MacroquadCanvas;
            let mut fps_counter = FpsCounter::default();
            let mut first_frame = true;

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));
                let frame_input = gather_frame_input(keyboard, screen_width);

                let update_start = Instant::now();
                sketch.update(&frame_input);
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                set_camera(&camera);
                let background = to_macroquad_color(sketch.background());
                if first_frame {
                    macroquad::window::clear_background(background);
                    first_frame = false;
                }
                macroquad::shapes::draw_rectangle(
                    0.0,
                    0.0,
                    surface_width,
                    surface_height,
                    background,
                );
                sketch.draw(&mut canvas);

                set_default_camera();
                macroquad::window::clear_background(macroquad::color::BLACK);
                draw_texture_ex(
                    target.texture,
                    0.0,
                    0.0,
                    WHITE,
                    DrawTextureParams {
                        dest_size: Some(MacroquadVec2::new(screen_width, screen_height)),
                        ..DrawTextureParams::default()
                    },
                );
                let render_duration = render_start.elapsed();

                let metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        avg_update,
                        avg_render,
                    }) = metrics
                    {
                        info!(
                            fps = per_second,
                            update_ms = avg_update.as_secs_f64() * 1_000.0,
                            render_ms = avg_render.as_secs_f64() * 1_000.0,
                            "frame timings"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    let [red, green, blue, alpha] = color.to_unit_rgba();
    macroquad::color::Color::new(red, green, blue, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_counter_waits_for_a_full_second() {
        let mut counter = FpsCounter::default();
        let frame = FrameBreakdown {
            frame: Duration::from_millis(250),
            update: Duration::from_millis(2),
            render: Duration::from_millis(4),
        };

        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        let metrics = counter.record_frame(frame).expect("one second elapsed");

        assert_eq!(metrics.per_second, 4.0);
        assert_eq!(metrics.avg_update, Duration::from_millis(2));
        assert_eq!(metrics.avg_render, Duration::from_millis(4));
        assert!(counter.record_frame(frame).is_none(), "counter resets");
    }

    #[test]
    fn colours_convert_to_unit_channels() {
        let converted = to_macroquad_color(Color::from_rgba(255, 0, 51, 255));
        assert_eq!(converted.r, 1.0);
        assert_eq!(converted.g, 0.0);
        assert!((converted.b - 0.2).abs() < 1e-6);
        assert_eq!(converted.a, 1.0);
    }
}
