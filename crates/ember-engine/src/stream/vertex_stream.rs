use anyhow::{Context, Result};

use crate::backend::{BufferDesc, BufferKind, GpuBackend};
use crate::device::DeviceContext;
use crate::pipeline::Vertex;

use super::{Mesh, StreamError, VertexArena};

/// Default number of vertices a frame can hold.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Per-frame dynamic vertex buffer.
///
/// Frame protocol: `reset`, any number of `enqueue`, one `flush`, then draw
/// `len()` vertices from `buffer()`. Capacity is fixed for the lifetime of the stream.
pub struct FrameVertexStream<B: GpuBackend> {
    arena: VertexArena,
    buffer: B::Buffer,
    flushed: bool,
    warned_overflow: bool,
}

impl<B: GpuBackend> FrameVertexStream<B> {
    pub fn new(device: &mut DeviceContext<B>, capacity: usize) -> Result<Self> {
        let size = (capacity.max(1) as u64) * Vertex::SIZE;
        let buffer = device
            .backend_mut()
            .create_buffer(BufferDesc {
                label: "ember vertex stream",
                kind: BufferKind::Vertex,
                size,
            })
            .context("failed to create dynamic vertex buffer")?;

        log::debug!("vertex stream: {capacity} vertices ({size} bytes)");

        Ok(Self {
            arena: VertexArena::with_capacity(capacity),
            buffer,
            flushed: false,
            warned_overflow: false,
        })
    }

    /// Starts a new frame: cursor back to 0, overflow flag cleared.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.flushed = false;
        self.warned_overflow = false;
    }

    /// Queues `mesh` for this frame. See [`VertexArena::extend`] for the overflow policy.
    pub fn enqueue(&mut self, mesh: &Mesh) -> Result<usize, StreamError> {
        debug_assert!(!self.flushed, "enqueue after flush; call reset first");

        let result = self.arena.extend(mesh);
        if let Err(err @ StreamError::Overflow { .. }) = &result {
            if !self.warned_overflow {
                log::warn!("{err}; excess vertices dropped this frame");
                self.warned_overflow = true;
            }
        }
        result
    }

    /// Uploads the queued vertices, replacing the buffer contents.
    pub fn flush(&mut self, device: &mut DeviceContext<B>) -> Result<()> {
        self.flushed = true;
        if self.arena.is_empty() {
            return Ok(());
        }
        device
            .backend_mut()
            .write_buffer(&self.buffer, bytemuck::cast_slice(self.arena.as_slice()))
            .context("failed to upload vertex stream")?;
        log::trace!("flushed {} vertices", self.arena.len());
        Ok(())
    }

    /// Vertices queued this frame.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn overflowed(&self) -> bool {
        self.arena.overflowed()
    }

    pub fn buffer(&self) -> &B::Buffer {
        &self.buffer
    }
}
