use std::collections::HashSet;

use super::types::{Key, MouseButton};

/// Per-tick input deltas.
///
/// `InputState` provides the current state (held keys/buttons, cursor position).
/// `InputFrame` provides the transitions seen since the last tick.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Keys pressed this tick. Key repeats are not transitions.
    pub keys_pressed: HashSet<Key>,

    pub keys_released: HashSet<Key>,

    pub buttons_pressed: HashSet<MouseButton>,

    pub buttons_released: HashSet<MouseButton>,

    /// Accumulated wheel scroll in lines.
    pub wheel_lines: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.wheel_lines = 0.0;
    }
}
