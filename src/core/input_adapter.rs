use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::controller::{Button, Controller};

/// Pixel-based wheel deltas (touchpads) are converted at this many pixels per line
const PIXELS_PER_LINE: f32 = 40.0;

/// Window events reduced to what the controller tracks
#[derive(Debug, Clone, Copy, PartialEq)]
enum InputEvent {
    Button(Button, ElementState),
    CursorMoved(f32, f32),
    CursorLeft,
    Wheel(f32),
    FocusLost,
}

/// Adapter that bridges Winit events to the Controller trait
#[derive(Debug, Clone, Default)]
pub struct WinitController {
    /// Currently pressed buttons
    pressed_keys: HashSet<Button>,
    /// All pressed buttons as a vec (for efficient get_down_keys)
    pressed_vec: Vec<Button>,
    /// Current mouse position (relative to window)
    mouse_position: Option<(f32, f32)>,
    /// Mouse movement delta since last reset
    mouse_delta: (f32, f32),
    /// Wheel movement since last reset
    scroll_delta: f32,
}

impl WinitController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent and update internal state.
    ///
    /// Presses and wheel input consumed by the UI overlay are dropped.
    /// Releases and cursor motion always apply.
    pub fn process_event(&mut self, event: &WindowEvent, consumed_by_ui: bool) {
        if let Some(input) = Self::translate(event) {
            self.apply(input, consumed_by_ui);
        }
    }

    fn translate(event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(keycode) => Self::keycode_to_button(keycode)
                    .map(|button| InputEvent::Button(button, event.state)),
                _ => None,
            },
            WindowEvent::MouseInput { state, button, .. } => {
                Self::mouse_button_to_button(*button).map(|btn| InputEvent::Button(btn, *state))
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(InputEvent::CursorMoved(position.x as f32, position.y as f32))
            }
            WindowEvent::CursorLeft { .. } => Some(InputEvent::CursorLeft),
            WindowEvent::MouseWheel { delta, .. } => Some(InputEvent::Wheel(match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
            })),
            // Releases are not delivered to unfocused windows
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            _ => None,
        }
    }

    fn apply(&mut self, input: InputEvent, consumed_by_ui: bool) {
        match input {
            InputEvent::Button(_, ElementState::Pressed) | InputEvent::Wheel(_)
                if consumed_by_ui => {}
            InputEvent::Button(button, state) => self.set_button(button, state),
            InputEvent::CursorMoved(x, y) => self.move_cursor(x, y),
            InputEvent::CursorLeft => self.mouse_position = None,
            InputEvent::Wheel(lines) => self.scroll_delta += lines,
            InputEvent::FocusLost => {
                self.pressed_keys.clear();
                self.pressed_vec.clear();
            }
        }
    }

    /// Reset per-frame state (mouse and wheel deltas)
    /// Call this at the end of each frame after processing input
    pub fn reset_deltas(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.scroll_delta = 0.0;
    }

    /// Get current mouse position (if available)
    pub fn mouse_position(&self) -> Option<(f32, f32)> {
        self.mouse_position
    }

    fn move_cursor(&mut self, x: f32, y: f32) {
        if let Some((old_x, old_y)) = self.mouse_position {
            self.mouse_delta.0 += x - old_x;
            self.mouse_delta.1 += y - old_y;
        }
        self.mouse_position = Some((x, y));
    }

    fn set_button(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(button) {
                    self.pressed_vec.push(button);
                }
            }
            ElementState::Released => {
                if self.pressed_keys.remove(&button) {
                    self.pressed_vec.retain(|&b| b != button);
                }
            }
        }
    }

    fn keycode_to_button(keycode: KeyCode) -> Option<Button> {
        match keycode {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Button::Shift),
            KeyCode::Escape => Some(Button::Escape),
            _ => None,
        }
    }

    fn mouse_button_to_button(button: MouseButton) -> Option<Button> {
        match button {
            MouseButton::Left => Some(Button::MouseLeft),
            MouseButton::Right => Some(Button::MouseRight),
            MouseButton::Middle => Some(Button::MouseMiddle),
            _ => None,
        }
    }
}

impl Controller for WinitController {
    fn is_down(&self, button: Button) -> bool {
        self.pressed_keys.contains(&button)
    }

    fn get_down_keys(&self) -> &[Button] {
        &self.pressed_vec
    }

    fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Winit events carry private device ids, so state is driven through the helpers

    #[test]
    fn test_new_controller_empty() {
        let controller = WinitController::new();
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.get_down_keys().len(), 0);
        assert_eq!(controller.mouse_position(), None);
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));
        assert_eq!(controller.scroll_delta(), 0.0);
    }

    #[test]
    fn test_first_cursor_position_has_no_delta() {
        let mut controller = WinitController::new();
        controller.move_cursor(100.0, 50.0);
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));

        controller.move_cursor(110.0, 45.0);
        controller.move_cursor(115.0, 40.0);
        assert_eq!(controller.mouse_delta(), (15.0, -10.0));
    }

    #[test]
    fn test_delta_reset() {
        let mut controller = WinitController::new();
        controller.move_cursor(100.0, 200.0);
        controller.move_cursor(110.0, 205.0);
        controller.scroll_delta = 2.0;

        controller.reset_deltas();
        assert_eq!(controller.mouse_delta(), (0.0, 0.0));
        assert_eq!(controller.scroll_delta(), 0.0);
        assert_eq!(controller.mouse_position(), Some((110.0, 205.0)));
    }

    #[test]
    fn test_button_press_release() {
        let mut controller = WinitController::new();
        controller.set_button(Button::MouseLeft, ElementState::Pressed);
        controller.set_button(Button::MouseLeft, ElementState::Pressed);
        assert!(controller.is_down(Button::MouseLeft));
        assert_eq!(controller.get_down_keys(), &[Button::MouseLeft]);

        controller.set_button(Button::MouseLeft, ElementState::Released);
        assert!(!controller.is_down(Button::MouseLeft));
        assert!(controller.get_down_keys().is_empty());
    }

    #[test]
    fn test_release_over_overlay_ends_drag() {
        let mut controller = WinitController::new();
        controller.apply(InputEvent::CursorMoved(100.0, 100.0), false);
        controller.apply(InputEvent::Button(Button::MouseLeft, ElementState::Pressed), false);
        assert!(controller.is_down(Button::MouseLeft));

        // Cursor drifts onto the overlay and the button is released there
        controller.apply(InputEvent::CursorMoved(20.0, 30.0), true);
        controller.apply(InputEvent::Button(Button::MouseLeft, ElementState::Released), true);
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.mouse_position(), Some((20.0, 30.0)));

        // Leaving the overlay continues from the tracked position
        controller.reset_deltas();
        controller.apply(InputEvent::CursorMoved(25.0, 30.0), false);
        assert_eq!(controller.mouse_delta(), (5.0, 0.0));
    }

    #[test]
    fn test_overlay_swallows_presses_and_wheel() {
        let mut controller = WinitController::new();
        controller.apply(InputEvent::Button(Button::MouseLeft, ElementState::Pressed), true);
        controller.apply(InputEvent::Wheel(3.0), true);
        assert!(!controller.is_down(Button::MouseLeft));
        assert_eq!(controller.scroll_delta(), 0.0);

        controller.apply(InputEvent::Wheel(-1.0), false);
        assert_eq!(controller.scroll_delta(), -1.0);

        controller.apply(InputEvent::Button(Button::MouseRight, ElementState::Pressed), false);
        controller.apply(InputEvent::CursorLeft, true);
        assert_eq!(controller.mouse_position(), None);
        controller.apply(InputEvent::FocusLost, true);
        assert!(controller.get_down_keys().is_empty());
    }

    #[test]
    fn test_mouse_button_mapping() {
        assert_eq!(
            WinitController::mouse_button_to_button(MouseButton::Right),
            Some(Button::MouseRight)
        );
        assert_eq!(WinitController::mouse_button_to_button(MouseButton::Back), None);
        assert_eq!(
            WinitController::keycode_to_button(KeyCode::ShiftRight),
            Some(Button::Shift)
        );
        assert_eq!(
            WinitController::keycode_to_button(KeyCode::Escape),
            Some(Button::Escape)
        );
    }
}
