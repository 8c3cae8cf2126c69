use glam::Vec3;

use crate::input::{InputState, Key};
use crate::platform::Platform;

use super::{CameraState, OrbitCamera, OrthoCamera};

/// Whether mouse motion drives the camera.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InteractionMode {
    /// Cursor hidden and recentered every tick; offsets from the center rotate the camera.
    Engaged,
    /// Cursor free for the overlay; no recentering and no camera deltas.
    FreeCursor,
}

/// Keys and tuning for [`CameraController`].
#[derive(Debug, Clone)]
pub struct CameraBindings {
    /// Any of these toggles between `Engaged` and `FreeCursor`.
    pub toggle_engage: Vec<Key>,
    /// Swaps the orthographic and orbit cameras.
    pub toggle_projection: Key,
    /// Radians of yaw/pitch per pixel of cursor offset.
    pub sensitivity: f32,
    /// Zoom factor applied per wheel line.
    pub zoom_per_line: f32,
}

impl Default for CameraBindings {
    fn default() -> Self {
        Self {
            toggle_engage: vec![Key::Escape, Key::Tab],
            toggle_projection: Key::C,
            sensitivity: 0.0025,
            zoom_per_line: 1.1,
        }
    }
}

/// Turns per-tick input into camera state.
pub struct CameraController {
    state: CameraState,
    /// The camera not currently in use; swapped in by the projection toggle.
    inactive: CameraState,
    mode: InteractionMode,
    bindings: CameraBindings,
}

impl CameraController {
    pub fn new(state: CameraState, mode: InteractionMode, bindings: CameraBindings) -> Self {
        let inactive = match state {
            CameraState::Ortho(_) => CameraState::Orbit(OrbitCamera::new(Vec3::ZERO, 400.0)),
            CameraState::Orbit(_) => CameraState::Ortho(OrthoCamera::default()),
        };
        Self {
            state,
            inactive,
            mode,
            bindings,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CameraState {
        &mut self.state
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Switches interaction mode and applies its cursor visibility.
    pub fn set_mode(&mut self, mode: InteractionMode, platform: &mut dyn Platform) {
        self.mode = mode;
        platform.set_cursor_visible(mode == InteractionMode::FreeCursor);
        if mode == InteractionMode::Engaged {
            // Start from the center so the first engaged tick has no jump.
            let (cx, cy) = platform.viewport_size().center();
            platform.set_cursor_position(cx, cy);
        }
        log::debug!("camera interaction: {mode:?}");
    }

    /// Applies one tick of input.
    pub fn update(&mut self, input: &InputState, platform: &mut dyn Platform) {
        if self.bindings.toggle_engage.iter().any(|k| input.key_pressed(*k)) {
            let next = match self.mode {
                InteractionMode::Engaged => InteractionMode::FreeCursor,
                InteractionMode::FreeCursor => InteractionMode::Engaged,
            };
            self.set_mode(next, platform);
        }

        if input.key_pressed(self.bindings.toggle_projection) {
            std::mem::swap(&mut self.state, &mut self.inactive);
            log::debug!("camera projection: {:?}", self.state.projection());
        }

        let viewport = platform.viewport_size();
        if let CameraState::Ortho(cam) = &mut self.state {
            cam.aspect_ratio = viewport.aspect_ratio();
        }

        let wheel = input.wheel_lines();
        if wheel != 0.0 {
            self.state.zoom(self.bindings.zoom_per_line.powf(wheel));
        }

        if self.mode != InteractionMode::Engaged || !viewport.is_presentable() {
            return;
        }

        let center = viewport.center();
        let delta = platform
            .cursor_position()
            .map(|cursor| cursor_delta(cursor, center))
            .unwrap_or((0.0, 0.0));
        platform.set_cursor_position(center.0, center.1);

        if let CameraState::Orbit(cam) = &mut self.state {
            let s = self.bindings.sensitivity;
            cam.rotate(delta.0 * s, delta.1 * s);
        }
    }
}

/// Offset of `cursor` from `center`, in pixels.
pub fn cursor_delta(cursor: (f32, f32), center: (f32, f32)) -> (f32, f32) {
    (cursor.0 - center.0, cursor.1 - center.1)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::coords::ViewportSize;
    use crate::input::{InputEvent, KeyState, MouseWheelDelta};
    use crate::platform::scripted::ScriptedPlatform;

    fn orbit_controller(mode: InteractionMode) -> CameraController {
        CameraController::new(
            CameraState::Orbit(OrbitCamera::default()),
            mode,
            CameraBindings {
                sensitivity: 0.01,
                ..CameraBindings::default()
            },
        )
    }

    fn press(input: &mut InputState, key: Key) {
        input.apply(&InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        });
    }

    fn orbit(c: &CameraController) -> OrbitCamera {
        match c.state() {
            CameraState::Orbit(cam) => *cam,
            other => panic!("expected orbit camera, got {other:?}"),
        }
    }

    #[test]
    fn engaged_offset_rotates_and_recenters() {
        let mut platform = ScriptedPlatform::new(ViewportSize::new(800, 600));
        platform.cursor = Some((410.0, 290.0));
        let mut c = orbit_controller(InteractionMode::Engaged);

        c.update(&InputState::default(), &mut platform);

        let cam = orbit(&c);
        assert_relative_eq!(cam.yaw, 0.1, epsilon = 1e-6);
        assert_relative_eq!(cam.pitch, -0.1, epsilon = 1e-6);
        assert_eq!(platform.warps, vec![(400.0, 300.0)]);
        assert_eq!(platform.cursor, Some((400.0, 300.0)));
    }

    #[test]
    fn recentered_cursor_gives_no_delta_next_tick() {
        let mut platform = ScriptedPlatform::new(ViewportSize::new(800, 600));
        platform.cursor = Some((420.0, 300.0));
        let mut c = orbit_controller(InteractionMode::Engaged);

        c.update(&InputState::default(), &mut platform);
        let first = orbit(&c);
        c.update(&InputState::default(), &mut platform);
        assert_eq!(orbit(&c), first);
    }

    #[test]
    fn free_cursor_neither_rotates_nor_recenters() {
        let mut platform = ScriptedPlatform::new(ViewportSize::new(800, 600));
        platform.cursor = Some((10.0, 10.0));
        let mut c = orbit_controller(InteractionMode::FreeCursor);

        c.update(&InputState::default(), &mut platform);

        assert_eq!(orbit(&c), OrbitCamera::default());
        assert!(platform.warps.is_empty());
    }

    #[test]
    fn toggle_key_switches_mode_and_cursor_visibility() {
        let mut platform = ScriptedPlatform::new(ViewportSize::new(800, 600));
        let mut c = orbit_controller(InteractionMode::FreeCursor);
        let mut input = InputState::default();

        press(&mut input, Key::Tab);
        c.update(&input, &mut platform);
        assert_eq!(c.mode(), InteractionMode::Engaged);
        assert!(!platform.cursor_visible);

        input.begin_tick();
        press(&mut input, Key::Escape);
        c.update(&input, &mut platform);
        assert_eq!(c.mode(), InteractionMode::FreeCursor);
        assert!(platform.cursor_visible);
    }

    #[test]
    fn ortho_ignores_deltas_but_tracks_aspect() {
        let mut platform = ScriptedPlatform::new(ViewportSize::new(1000, 500));
        platform.cursor = Some((0.0, 0.0));
        let mut c = CameraController::new(
            CameraState::Ortho(OrthoCamera::default()),
            InteractionMode::Engaged,
            CameraBindings::default(),
        );

        c.update(&InputState::default(), &mut platform);

        match c.state() {
            CameraState::Ortho(cam) => {
                assert_eq!(cam.position, glam::Vec2::ZERO);
                assert_eq!(cam.aspect_ratio, 2.0);
            }
            other => panic!("expected ortho camera, got {other:?}"),
        }
    }

    #[test]
    fn projection_toggle_swaps_and_keeps_the_other_camera() {
        let mut platform = ScriptedPlatform::new(ViewportSize::new(800, 600));
        platform.cursor = Some((500.0, 300.0));
        let mut c = orbit_controller(InteractionMode::Engaged);
        c.update(&InputState::default(), &mut platform);
        let rotated = orbit(&c);

        let mut input = InputState::default();
        press(&mut input, Key::C);
        c.update(&input, &mut platform);
        assert!(matches!(c.state(), CameraState::Ortho(_)));

        input.begin_tick();
        press(&mut input, Key::C);
        c.update(&input, &mut platform);
        assert_eq!(orbit(&c), rotated);
    }

    #[test]
    fn wheel_zooms_the_active_camera() {
        let mut platform = ScriptedPlatform::new(ViewportSize::new(800, 600));
        let mut c = CameraController::new(
            CameraState::Ortho(OrthoCamera::default()),
            InteractionMode::FreeCursor,
            CameraBindings {
                zoom_per_line: 2.0,
                ..CameraBindings::default()
            },
        );
        let mut input = InputState::default();
        input.apply(&InputEvent::MouseWheel(MouseWheelDelta::Line { y: 1.0 }));

        c.update(&input, &mut platform);

        match c.state() {
            CameraState::Ortho(cam) => assert_eq!(cam.scale, 2.0),
            other => panic!("expected ortho camera, got {other:?}"),
        }
    }
}
