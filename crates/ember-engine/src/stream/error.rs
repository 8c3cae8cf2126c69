use thiserror::Error;

/// Caller-input errors from [`super::FrameVertexStream::enqueue`].
///
/// Neither ends the frame: the stream stays consistent and the frame can still
/// be flushed and drawn.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum StreamError {
    /// The mesh did not fit. `accepted` leading vertices (whole triangles) were kept.
    #[error("vertex stream overflow: {requested} vertices requested, {accepted} accepted (capacity {capacity})")]
    Overflow {
        requested: usize,
        accepted: usize,
        capacity: usize,
    },

    /// An index referenced a vertex the mesh does not have. Nothing was enqueued.
    #[error("mesh index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}
