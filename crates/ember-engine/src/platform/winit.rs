use std::collections::VecDeque;
use std::sync::Arc;

use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::coords::ViewportSize;
use crate::input::{InputEvent, Key, KeyState, MouseButton, MouseButtonState, MouseWheelDelta};

use super::{Platform, PlatformEvent};

/// [`Platform`] over a winit window.
///
/// Window events are translated and queued as they arrive; the frame loop
/// drains the queue once per tick.
pub struct WinitPlatform {
    window: Arc<Window>,
    events: VecDeque<PlatformEvent>,
    /// Last known cursor position in physical pixels.
    cursor: Option<(f32, f32)>,
}

impl WinitPlatform {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            events: VecDeque::new(),
            cursor: None,
        }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// Queues the engine events for a winit `WindowEvent`.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::CloseRequested = event {
            self.events.push_back(PlatformEvent::Quit);
            return;
        }

        if let Some(ev) = translate_window_event(event) {
            match ev {
                InputEvent::CursorMoved { x, y } => self.cursor = Some((x, y)),
                InputEvent::CursorLeft => self.cursor = None,
                _ => {}
            }
            self.events.push_back(PlatformEvent::Input(ev));
        }
    }
}

impl Platform for WinitPlatform {
    fn viewport_size(&self) -> ViewportSize {
        self.window.inner_size().into()
    }

    fn poll_event(&mut self) -> Option<PlatformEvent> {
        self.events.pop_front()
    }

    fn cursor_position(&self) -> Option<(f32, f32)> {
        self.cursor
    }

    fn set_cursor_position(&mut self, x: f32, y: f32) {
        let position = PhysicalPosition::new(x as f64, y as f64);
        if let Err(err) = self.window.set_cursor_position(position) {
            log::debug!("cursor warp unsupported: {err}");
        }
        self.cursor = Some((x, y));
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.window.set_cursor_visible(visible);
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Returns `None` for events not represented by the input subsystem.
pub fn translate_window_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::CursorLeft),

        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),

        WindowEvent::MouseInput { state, button, .. } => Some(InputEvent::MouseButton {
            button: map_mouse_button(*button),
            state: match state {
                ElementState::Pressed => MouseButtonState::Pressed,
                ElementState::Released => MouseButtonState::Released,
            },
        }),

        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(_, y) => MouseWheelDelta::Line { y: *y },
                MouseScrollDelta::PixelDelta(p) => MouseWheelDelta::Pixel { y: p.y as f32 },
            };
            Some(InputEvent::MouseWheel(delta))
        }

        WindowEvent::KeyboardInput { event, .. } => Some(InputEvent::Key {
            key: map_key(event.physical_key),
            state: match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            },
            repeat: event.repeat,
        }),

        _ => None,
    }
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Other(3),
        WinitMouseButton::Forward => MouseButton::Other(4),
        WinitMouseButton::Other(v) => MouseButton::Other(v),
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        // NativeKeyCode has no stable numeric in winit 0.30.
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Space => Key::Space,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Control,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::NativeKeyCode;

    use super::*;

    #[test]
    fn camera_keys_are_mapped() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Tab)), Key::Tab);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyC)), Key::C);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftRight)), Key::Shift);
    }

    #[test]
    fn unmapped_keys_keep_a_code() {
        let code = KeyCode::F5;
        assert_eq!(map_key(PhysicalKey::Code(code)), Key::Unknown(code as u32));
        assert_eq!(map_key(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)), Key::Unknown(0));
    }

    #[test]
    fn extra_buttons_fold_into_other() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(map_mouse_button(WinitMouseButton::Back), MouseButton::Other(3));
        assert_eq!(map_mouse_button(WinitMouseButton::Other(9)), MouseButton::Other(9));
    }
}
