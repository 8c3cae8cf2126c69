//! Per-frame GPU data: the dynamic vertex stream and the camera constants.

mod arena;
mod constants;
mod error;
mod mesh;
mod vertex_stream;

pub use arena::VertexArena;
pub use constants::ConstantBuffer;
pub use error::StreamError;
pub use mesh::Mesh;
pub use vertex_stream::{FrameVertexStream, DEFAULT_CAPACITY};
