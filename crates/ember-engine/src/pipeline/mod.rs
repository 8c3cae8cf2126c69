//! Fixed graphics pipeline: vertex layout, shader blobs and the per-frame binder.

mod binder;
mod shader;
mod vertex;

pub use binder::PipelineStateBinder;
pub use shader::{ShaderBlob, ShaderFormat, ShaderStage};
pub use vertex::Vertex;
