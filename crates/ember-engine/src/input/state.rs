use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};

/// Current input state for the window.
///
/// Holds "is down" information and the last known cursor position.
/// Per-tick transitions are recorded into an `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Cursor position in physical pixels, `None` while outside the window.
    pub cursor: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,

    frame: InputFrame,
}

impl InputState {
    /// Starts a new tick: forgets the previous tick's transitions.
    pub fn begin_tick(&mut self) {
        self.frame.clear();
    }

    /// Transitions recorded since the last `begin_tick`.
    pub fn frame(&self) -> &InputFrame {
        &self.frame
    }

    /// Applies an input event to the current state and records its transitions.
    pub fn apply(&mut self, ev: &InputEvent) {
        match *ev {
            InputEvent::Focused(focused) => {
                self.focused = focused;
                if !focused {
                    // On focus loss, clear "down" sets to avoid stuck keys.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::CursorMoved { x, y } => {
                self.cursor = Some((x, y));
            }

            InputEvent::CursorLeft => {
                self.cursor = None;
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(key) {
                        self.frame.keys_pressed.insert(key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(&key) {
                        self.frame.keys_released.insert(key);
                    }
                }
            },

            InputEvent::MouseButton { button, state } => match state {
                MouseButtonState::Pressed => {
                    if self.buttons_down.insert(button) {
                        self.frame.buttons_pressed.insert(button);
                    }
                }
                MouseButtonState::Released => {
                    if self.buttons_down.remove(&button) {
                        self.frame.buttons_released.insert(button);
                    }
                }
            },

            InputEvent::MouseWheel(delta) => {
                self.frame.wheel_lines += delta.lines();
            }
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// True when `key` went down during the current tick.
    pub fn key_pressed(&self, key: Key) -> bool {
        self.frame.keys_pressed.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    /// Wheel scroll accumulated during the current tick, in lines.
    pub fn wheel_lines(&self) -> f32 {
        self.frame.wheel_lines
    }
}
