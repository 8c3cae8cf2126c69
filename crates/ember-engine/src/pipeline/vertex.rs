use bytemuck::{Pod, Zeroable};

/// One vertex of the per-frame stream.
///
/// Field order and byte offsets must match [`Vertex::layout`] and the vertex
/// shader inputs: position at 0, uv at 12, color at 20, stride 36.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// Linear RGBA.
    pub color: [f32; 4],
}

impl Vertex {
    pub const SIZE: u64 = std::mem::size_of::<Vertex>() as u64;

    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    pub const fn new(position: [f32; 3], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, uv, color }
    }

    /// 2D vertex on the `z = 0` plane.
    pub const fn flat(x: f32, y: f32, uv: [f32; 2], color: [f32; 4]) -> Self {
        Self::new([x, y, 0.0], uv, color)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::SIZE,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
