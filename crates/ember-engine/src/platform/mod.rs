//! Window/input collaborator.
//!
//! The frame loop and the camera controller only see [`Platform`]. The winit
//! implementation buffers translated window events; [`Runtime`] owns the winit
//! event loop and drives the frame loop from it.

mod runtime;
mod winit;

#[cfg(test)]
pub(crate) mod scripted;

use crate::coords::ViewportSize;
use crate::input::InputEvent;

pub use self::runtime::{Runtime, RuntimeConfig};
pub use self::winit::WinitPlatform;

/// Event drained from the platform queue once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The user asked to close the window. Ends the frame loop.
    Quit,
    Input(InputEvent),
}

/// Viewport queries, event polling and cursor control.
pub trait Platform {
    /// Current drawable size in physical pixels. May be zero (minimized).
    fn viewport_size(&self) -> ViewportSize;

    /// Next pending event, or `None` when the queue is drained.
    fn poll_event(&mut self) -> Option<PlatformEvent>;

    /// Cursor position in physical pixels, `None` when unknown or outside.
    fn cursor_position(&self) -> Option<(f32, f32)>;

    /// Warps the cursor. Subsequent `cursor_position` calls report the new position.
    fn set_cursor_position(&mut self, x: f32, y: f32);

    fn set_cursor_visible(&mut self, visible: bool);

    fn set_title(&mut self, title: &str) {
        let _ = title;
    }
}
