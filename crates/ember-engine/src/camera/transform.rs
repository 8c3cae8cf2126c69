use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::coords::ViewportSize;

use super::{CameraState, OrbitCamera, OrthoCamera};

/// Clip-space depth reached by world `z = 1` under the orthographic camera.
///
/// 2D content only uses `[0, ORTHO_DEPTH_MAX]`; the rest of the depth range is
/// left for later layers.
pub const ORTHO_DEPTH_MAX: f32 = 0.5;

/// World-space edges of the orthographic view volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl OrthoCamera {
    /// View bounds for `viewport`: half the viewport (in world units) around the position.
    pub fn bounds(&self, viewport: ViewportSize) -> OrthoBounds {
        let half_w = viewport.width as f32 * 0.5 / self.scale;
        let half_h = viewport.height as f32 * 0.5 / self.scale;
        OrthoBounds {
            left: self.position.x - half_w,
            right: self.position.x + half_w,
            top: self.position.y + half_h,
            bottom: self.position.y - half_h,
        }
    }

    pub fn matrix(&self, viewport: ViewportSize) -> Mat4 {
        let OrthoBounds {
            left,
            right,
            top,
            bottom,
        } = self.bounds(viewport);

        let sx = 2.0 / (right - left);
        let sy = 2.0 / (top - bottom);
        let tx = -(right + left) / (right - left);
        let ty = -(top + bottom) / (top - bottom);

        Mat4::from_cols(
            Vec4::new(sx, 0.0, 0.0, 0.0),
            Vec4::new(0.0, sy, 0.0, 0.0),
            Vec4::new(0.0, 0.0, ORTHO_DEPTH_MAX, 0.0),
            Vec4::new(tx, ty, 0.0, 1.0),
        )
    }
}

impl OrbitCamera {
    pub fn matrix(&self, viewport: ViewportSize) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, viewport.aspect_ratio(), self.z_near, self.z_far);
        let view = Mat4::look_at_rh(self.position(), self.target, Vec3::Y);
        proj * view
    }
}

/// View-projection matrix for `camera` at `viewport`.
///
/// A non-presentable viewport has no meaningful projection and yields identity.
pub fn compute_matrix(camera: &CameraState, viewport: ViewportSize) -> Mat4 {
    if !viewport.is_presentable() {
        return Mat4::IDENTITY;
    }
    match camera {
        CameraState::Ortho(cam) => cam.matrix(viewport),
        CameraState::Orbit(cam) => cam.matrix(viewport),
    }
}

/// Constant-buffer layout read by the vertex shader (group 0, binding 0).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl From<Mat4> for CameraUniform {
    fn from(m: Mat4) -> Self {
        Self {
            view_proj: m.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Mat4::IDENTITY.into()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{Vec2, Vec3};

    use super::*;

    fn project(m: Mat4, p: Vec3) -> Vec3 {
        let clip = m * p.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn ortho_bounds_center_on_position() {
        let cam = OrthoCamera::new(Vec2::ZERO);
        let b = cam.bounds(ViewportSize::new(800, 600));
        assert_eq!((b.left, b.right, b.top, b.bottom), (-400.0, 400.0, 300.0, -300.0));
    }

    #[test]
    fn ortho_maps_corners_to_clip_corners() {
        let m = compute_matrix(&CameraState::Ortho(OrthoCamera::new(Vec2::ZERO)), ViewportSize::new(800, 600));

        let top_right = project(m, Vec3::new(400.0, 300.0, 0.0));
        assert_relative_eq!(top_right.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(top_right.y, 1.0, epsilon = 1e-6);

        let bottom_left = project(m, Vec3::new(-400.0, -300.0, 0.0));
        assert_relative_eq!(bottom_left.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(bottom_left.y, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn ortho_depth_uses_half_range() {
        let m = OrthoCamera::default().matrix(ViewportSize::new(100, 100));
        assert_relative_eq!(project(m, Vec3::new(0.0, 0.0, 0.0)).z, 0.0);
        assert_relative_eq!(project(m, Vec3::new(0.0, 0.0, 1.0)).z, ORTHO_DEPTH_MAX);
    }

    #[test]
    fn ortho_follows_position_and_scale() {
        let mut cam = OrthoCamera::new(Vec2::new(100.0, -50.0));
        cam.scale = 2.0;
        let b = cam.bounds(ViewportSize::new(800, 600));
        assert_eq!((b.left, b.right, b.top, b.bottom), (-100.0, 300.0, 100.0, -200.0));

        let m = cam.matrix(ViewportSize::new(800, 600));
        let center = project(m, Vec3::new(100.0, -50.0, 0.0));
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn orbit_projects_target_to_screen_center() {
        let mut cam = OrbitCamera::new(Vec3::new(3.0, 1.0, -2.0), 12.0);
        cam.rotate(1.1, -0.6);
        let m = compute_matrix(&CameraState::Orbit(cam), ViewportSize::new(1024, 768));

        let p = project(m, cam.target);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-4);
        assert!(p.z > 0.0 && p.z < 1.0);
    }

    #[test]
    fn zero_viewport_yields_identity() {
        let cam = CameraState::Orbit(OrbitCamera::default());
        assert_eq!(compute_matrix(&cam, ViewportSize::ZERO), Mat4::IDENTITY);
    }

    #[test]
    fn uniform_is_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let u = CameraUniform::from(m);
        assert_eq!(u.view_proj[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
    }
}
