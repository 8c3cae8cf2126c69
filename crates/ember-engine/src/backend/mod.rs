//! GPU backend seam.
//!
//! Every GPU call the render context issues goes through [`GpuBackend`]. The
//! production implementation is [`WgpuBackend`]; tests use an in-memory backend
//! that records calls and resource lifetimes.
//!
//! Resources are owned values (associated types). Dropping one releases the GPU
//! object, so every component releases what it owns on every exit path.

mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

use anyhow::Result;

use crate::coords::ViewportSize;
use crate::device::{DeviceStatus, PresentOutcome, RenderError, SurfaceStatus};
use crate::pipeline::ShaderBlob;
use crate::texture::DecodedImage;

pub use wgpu_backend::{WgpuBackend, WgpuBackbuffer, WgpuBuffer, WgpuDepthView, WgpuPipeline, WgpuTexture};

/// What a dynamic buffer is bound as.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    /// Per-frame vertex data, bound to slot 0.
    Vertex,
    /// Per-frame constants read by the vertex stage (group 0).
    Constant,
}

/// Dynamic buffer creation parameters. Contents are fully rewritten every frame.
#[derive(Debug, Copy, Clone)]
pub struct BufferDesc {
    pub label: &'static str,
    pub kind: BufferKind,
    pub size: u64,
}

/// Everything needed to build the fixed pipeline objects.
pub struct PipelineDesc<'a, B: GpuBackend> {
    pub label: &'static str,
    pub vertex_shader: &'a ShaderBlob,
    pub pixel_shader: &'a ShaderBlob,
    /// Texture sampled by the pixel stage; bound together with the sampler.
    pub texture: &'a B::Texture,
}

/// Target clear values applied when the output-merger stage is bound.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClearValues {
    pub color: [f64; 4],
    pub depth: f32,
}

impl Default for ClearValues {
    fn default() -> Self {
        Self {
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 1.0,
        }
    }
}

/// One stage of the fixed pipeline.
///
/// A full bind is always the five steps in declaration order; backends receive
/// the whole sequence at once and must apply all of it.
pub enum BindStep<'a, B: GpuBackend> {
    /// Input layout, triangle-list topology and the vertex buffer.
    InputAssembly {
        pipeline: &'a B::Pipeline,
        vertex_buffer: &'a B::Buffer,
    },
    /// Constant buffer and vertex shader.
    VertexStage { constants: &'a B::Buffer },
    /// Viewport rectangle and rasterizer state.
    Rasterizer { viewport: ViewportSize },
    /// Sampler, texture and pixel shader.
    PixelStage { pipeline: &'a B::Pipeline },
    /// Blend state, depth-stencil state and render targets.
    OutputMerger {
        backbuffer: &'a B::BackbufferView,
        depth: &'a B::DepthView,
        clear: ClearValues,
    },
}

impl<B: GpuBackend> BindStep<'_, B> {
    pub fn name(&self) -> &'static str {
        match self {
            BindStep::InputAssembly { .. } => "input-assembly",
            BindStep::VertexStage { .. } => "vertex-stage",
            BindStep::Rasterizer { .. } => "rasterizer",
            BindStep::PixelStage { .. } => "pixel-stage",
            BindStep::OutputMerger { .. } => "output-merger",
        }
    }
}

/// Device + presentation operations used by the render context.
///
/// Single-threaded: one owner issues every call in frame order.
pub trait GpuBackend: Sized {
    /// Render-target view of the presentation surface.
    type BackbufferView;
    /// Depth-stencil view matching the back buffer size.
    type DepthView;
    type Buffer;
    type Texture;
    /// Input layout, shader pair, sampler, rasterizer/blend/depth-stencil state.
    type Pipeline;

    /// Human-readable adapter/backend description for logs.
    fn describe(&self) -> String;

    /// Resizes the underlying presentation surface. Never called with a zero size.
    fn resize_surface(&mut self, size: ViewportSize) -> Result<()>;

    /// Creates the render-target view of the current back buffer.
    fn create_backbuffer_view(&mut self, size: ViewportSize) -> Result<Self::BackbufferView>;

    /// Creates a depth-only view of `size`.
    fn create_depth_view(&mut self, size: ViewportSize) -> Result<Self::DepthView>;

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Self::Buffer>;

    /// Overwrites the start of `buffer` with `bytes`, discarding previous contents.
    fn write_buffer(&mut self, buffer: &Self::Buffer, bytes: &[u8]) -> Result<()>;

    fn create_texture(&mut self, label: &'static str, image: &DecodedImage) -> Result<Self::Texture>;

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_, Self>) -> Result<Self::Pipeline>;

    /// Prepares the back buffer for this frame's commands.
    fn acquire(&mut self, backbuffer: &Self::BackbufferView) -> Result<SurfaceStatus, RenderError>;

    /// Applies a complete pipeline bind.
    fn bind(&mut self, steps: &[BindStep<'_, Self>]) -> Result<()>;

    fn draw(&mut self, vertex_count: u32, first_vertex: u32);

    /// Submits the frame's commands and presents the back buffer.
    fn present(&mut self) -> Result<PresentOutcome, RenderError>;

    /// Removal state of the device, queried after each present.
    fn device_status(&self) -> DeviceStatus;
}
