//! Keyboard and mouse mapping onto [`FrameInput`].

use fluid_core::VelocityStep;
use fluid_rendering::FrameInput;
use macroquad::input::{
    is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
};

const DIGIT_KEYS: [KeyCode; 10] = [
    KeyCode::Key0,
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
    KeyCode::Key9,
];

/// Snapshot of edge-triggered shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the loop.
    pub(crate) quit_requested: bool,
    /// `Space` or `Enter` toggles the population direction.
    pub(crate) toggle: bool,
    /// `Up` / `Down` step the noise velocity.
    pub(crate) velocity_step: Option<VelocityStep>,
    /// Digit keys pick a normalised velocity.
    pub(crate) digit: Option<u8>,
}

impl KeyboardShortcuts {
    pub(crate) fn poll() -> Self {
        let quit_requested = is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q);
        let toggle = is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Enter);
        let velocity_step = if is_key_pressed(KeyCode::Up) {
            Some(VelocityStep::Increase)
        } else if is_key_pressed(KeyCode::Down) {
            Some(VelocityStep::Decrease)
        } else {
            None
        };
        let digit = DIGIT_KEYS
            .iter()
            .position(|key| is_key_pressed(*key))
            .and_then(|index| u8::try_from(index).ok());

        Self {
            quit_requested,
            toggle,
            velocity_step,
            digit,
        }
    }
}

/// Builds the frame input from polled shortcuts and the mouse slider.
pub(crate) fn gather_frame_input(keyboard: KeyboardShortcuts, screen_width: f32) -> FrameInput {
    let dragged = if is_mouse_button_down(MouseButton::Left) {
        normalized_velocity_for_cursor(mouse_position().0, screen_width)
    } else {
        None
    };

    FrameInput {
        toggle: keyboard.toggle,
        velocity_step: keyboard.velocity_step,
        velocity_normalized: keyboard
            .digit
            .map(normalized_velocity_for_digit)
            .or(dragged),
    }
}

/// Normalised velocity selected by a digit key; `0` is the slowest and `9` the fastest.
#[doc(hidden)]
#[must_use]
pub fn normalized_velocity_for_digit(digit: u8) -> f32 {
    f32::from(digit.min(9)) / 9.0
}

/// Normalised velocity selected by dragging across the window width.
///
/// Returns `None` for a zero-width window.
#[doc(hidden)]
#[must_use]
pub fn normalized_velocity_for_cursor(cursor_x: f32, screen_width: f32) -> Option<f32> {
    if screen_width <= f32::EPSILON {
        return None;
    }
    Some((cursor_x / screen_width).clamp(0.0, 1.0))
}
