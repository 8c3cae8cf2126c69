/// Keyboard key identifier.
///
/// Only keys the viewer and camera controller react to have variants. Platform
/// code maps everything else to `Key::Unknown` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

/// Mouse wheel delta.
///
/// `Line` corresponds to "scroll lines" style input; `Pixel` is high precision.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { y: f32 },
    Pixel { y: f32 },
}

impl MouseWheelDelta {
    /// Logical pixels per wheel line, used to normalize pixel deltas.
    pub const PIXELS_PER_LINE: f32 = 40.0;

    /// Vertical scroll in wheel lines. Positive scrolls away from the user.
    pub fn lines(&self) -> f32 {
        match *self {
            MouseWheelDelta::Line { y } => y,
            MouseWheelDelta::Pixel { y } => y / Self::PIXELS_PER_LINE,
        }
    }
}

/// Platform-agnostic input events.
///
/// Cursor coordinates are physical pixels relative to the top-left corner of
/// the viewport, the same space `Platform::set_cursor_position` takes.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    CursorMoved { x: f32, y: f32 },

    MouseButton {
        button: MouseButton,
        state: MouseButtonState,
    },

    MouseWheel(MouseWheelDelta),

    /// Cursor left the window surface.
    CursorLeft,

    /// Window focus change.
    Focused(bool),
}
