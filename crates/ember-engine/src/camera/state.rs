use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};

/// Margin kept between the orbit pitch and the poles.
pub const PITCH_EPSILON: f32 = 0.01;

/// Open bound on the orbit pitch magnitude. Pitch never reaches it.
pub const PITCH_BOUND: f32 = FRAC_PI_2 - PITCH_EPSILON;

/// Largest pitch magnitude an orbit camera can reach, one ulp inside `PITCH_BOUND`.
pub const PITCH_LIMIT: f32 = f32::from_bits(PITCH_BOUND.to_bits() - 1);

/// 2D camera looking down -Z at the XY plane.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrthoCamera {
    /// World position at the center of the viewport.
    pub position: Vec2,
    /// Pixels per world unit. Larger values zoom in.
    pub scale: f32,
    /// Width over height of the last viewport this camera was updated for.
    pub aspect_ratio: f32,
}

impl OrthoCamera {
    pub const MIN_SCALE: f32 = 0.05;
    pub const MAX_SCALE: f32 = 64.0;

    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            scale: 1.0,
            aspect_ratio: 1.0,
        }
    }

    /// Multiplies the scale, keeping it within `[MIN_SCALE, MAX_SCALE]`.
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.scale = (self.scale * factor).clamp(Self::MIN_SCALE, Self::MAX_SCALE);
        }
    }
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

/// Perspective camera orbiting `target` on a sphere of radius `distance`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    /// Rotation around +Y in radians, always in `[0, 2π)`.
    pub yaw: f32,
    /// Elevation in radians, always within `±PITCH_LIMIT`.
    pub pitch: f32,
    pub distance: f32,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl OrbitCamera {
    pub const MIN_DISTANCE: f32 = 0.5;
    pub const MAX_DISTANCE: f32 = 500.0;

    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: distance.clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE),
            target,
            fov_y: 60f32.to_radians(),
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    /// Camera position derived from the spherical coordinates.
    ///
    /// The direction is `(sin yaw, tan pitch, cos yaw)` normalized, so pitch never
    /// reaches the poles where `tan` diverges.
    pub fn position(&self) -> Vec3 {
        let dir = Vec3::new(self.yaw.sin(), self.pitch.tan(), self.yaw.cos()).normalize();
        self.target + dir * self.distance
    }

    /// Accumulates yaw/pitch deltas (radians). Yaw wraps, pitch clamps.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = wrap_yaw(self.yaw + delta_yaw);
        self.pitch = clamp_pitch(self.pitch + delta_pitch);
    }

    /// Divides the distance by `factor` (zoom in for factors above 1).
    pub fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance / factor).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 10.0)
    }
}

/// Wraps an angle into `[0, 2π)`. Non-finite input resets to 0.
pub fn wrap_yaw(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Clamps a pitch into the open interval `(-PITCH_BOUND, PITCH_BOUND)`.
/// Non-finite input resets to 0.
pub fn clamp_pitch(pitch: f32) -> f32 {
    if !pitch.is_finite() {
        return 0.0;
    }
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Which projection a camera uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Projection {
    Orthographic,
    Orbit,
}

/// Camera state consumed by the transform: either 2D orthographic or 3D orbit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraState {
    Ortho(OrthoCamera),
    Orbit(OrbitCamera),
}

impl CameraState {
    pub fn projection(&self) -> Projection {
        match self {
            CameraState::Ortho(_) => Projection::Orthographic,
            CameraState::Orbit(_) => Projection::Orbit,
        }
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        match self {
            CameraState::Ortho(cam) => cam.position.extend(0.0),
            CameraState::Orbit(cam) => cam.position(),
        }
    }

    /// Applies a zoom step to whichever camera is active.
    pub fn zoom(&mut self, factor: f32) {
        match self {
            CameraState::Ortho(cam) => cam.zoom(factor),
            CameraState::Orbit(cam) => cam.zoom(factor),
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState::Ortho(OrthoCamera::default())
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn orbit_position_on_axes() {
        let mut cam = OrbitCamera::new(Vec3::ZERO, 10.0);
        let p = cam.position();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 10.0, epsilon = 1e-5);

        cam.yaw = FRAC_PI_2;
        let p = cam.position();
        assert_relative_eq!(p.x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn orbit_position_is_offset_by_target() {
        let mut cam = OrbitCamera::new(Vec3::new(1.0, 2.0, 3.0), 4.0);
        cam.rotate(0.7, 0.4);
        let offset = cam.position() - cam.target;
        assert_relative_eq!(offset.length(), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn positive_pitch_raises_the_camera() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 0.5);
        assert!(cam.position().y > 0.0);
    }

    #[test]
    fn yaw_wraps_instead_of_clamping() {
        let mut cam = OrbitCamera::default();
        cam.rotate(2.0 * PI + 0.25, 0.0);
        assert_relative_eq!(cam.yaw, 0.25, epsilon = 1e-5);

        cam.rotate(-0.5, 0.0);
        assert_relative_eq!(cam.yaw, 2.0 * PI - 0.25, epsilon = 1e-5);
    }

    #[test]
    fn tiny_negative_yaw_stays_below_tau() {
        assert!(wrap_yaw(-1e-9) < TAU);
        assert!(wrap_yaw(-f32::MIN_POSITIVE) < TAU);
    }

    #[test]
    fn non_finite_angles_reset() {
        assert_eq!(wrap_yaw(f32::NAN), 0.0);
        assert_eq!(clamp_pitch(f32::INFINITY), 0.0);
    }

    #[test]
    fn zoom_keeps_distance_in_range() {
        let mut cam = OrbitCamera::default();
        for _ in 0..100 {
            cam.zoom(2.0);
        }
        assert_eq!(cam.distance, OrbitCamera::MIN_DISTANCE);
        cam.zoom(0.0);
        assert_eq!(cam.distance, OrbitCamera::MIN_DISTANCE);
    }

    #[test]
    fn pitch_clamp_excludes_the_bound() {
        assert!(clamp_pitch(10.0) < PITCH_BOUND);
        assert!(clamp_pitch(-10.0) > -PITCH_BOUND);
        assert!(clamp_pitch(PITCH_BOUND) < PITCH_BOUND);
        assert!(clamp_pitch(-PITCH_BOUND) > -PITCH_BOUND);
        assert_eq!(clamp_pitch(0.25), 0.25);
    }

    proptest! {
        #[test]
        fn pitch_stays_off_the_poles(deltas in prop::collection::vec(-10.0f32..10.0, 0..64)) {
            let mut cam = OrbitCamera::default();
            for d in deltas {
                cam.rotate(0.0, d);
                prop_assert!(cam.pitch > -PITCH_BOUND && cam.pitch < PITCH_BOUND);
                prop_assert!(cam.position().is_finite());
            }
        }

        #[test]
        fn yaw_stays_in_one_turn(deltas in prop::collection::vec(-1.0e4f32..1.0e4, 0..64)) {
            let mut cam = OrbitCamera::default();
            for d in deltas {
                cam.rotate(d, 0.0);
                prop_assert!(cam.yaw >= 0.0 && cam.yaw < TAU);
            }
        }
    }
}
