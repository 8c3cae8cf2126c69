use anyhow::Result;

use crate::backend::GpuBackend;
use crate::camera::CameraState;
use crate::coords::ViewportSize;
use crate::device::DeviceContext;
use crate::input::InputState;
use crate::platform::Platform;
use crate::stream::Mesh;
use crate::time::FrameTime;

/// What the application sees when asked for a frame's geometry.
pub struct FrameInfo<'a> {
    pub time: FrameTime,
    pub viewport: ViewportSize,
    pub camera: &'a CameraState,
    pub input: &'a InputState,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Meshes to draw this frame, in draw order.
    ///
    /// Only called for frames that will be presented.
    fn frame(&mut self, info: &FrameInfo<'_>) -> &[Mesh];
}

/// Per-frame numbers handed to the overlay.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameStats {
    pub frame_index: u64,
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Smoothed frames per second.
    pub fps: f32,
    pub viewport: ViewportSize,
    /// Vertices drawn in the previous presented frame.
    pub last_vertex_count: usize,
}

/// Immediate-mode overlay hooks.
///
/// `begin_frame` runs after the pipeline bind; `render` runs after the frame's
/// vertices are flushed and before the draw and present.
pub trait Overlay<B: GpuBackend> {
    fn init(&mut self, device: &mut DeviceContext<B>) -> Result<()> {
        let _ = device;
        Ok(())
    }

    fn begin_frame(&mut self, stats: &FrameStats) {
        let _ = stats;
    }

    fn render(&mut self, device: &mut DeviceContext<B>, platform: &mut dyn Platform) {
        let _ = (device, platform);
    }
}

/// Overlay that does nothing.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoOverlay;

impl<B: GpuBackend> Overlay<B> for NoOverlay {}
