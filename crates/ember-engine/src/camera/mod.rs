//! Camera state, its per-tick controller and the view-projection transform.

mod controller;
mod state;
mod transform;

pub use controller::{cursor_delta, CameraBindings, CameraController, InteractionMode};
pub use state::{clamp_pitch, wrap_yaw, CameraState, OrbitCamera, OrthoCamera, Projection, PITCH_BOUND, PITCH_EPSILON, PITCH_LIMIT};
pub use transform::{compute_matrix, CameraUniform, OrthoBounds, ORTHO_DEPTH_MAX};
