//! Per-tick orchestration of the render context.

mod frame_loop;
mod state;

pub use frame_loop::{FrameLoop, LoopConfig, LoopResources};
pub use state::{LoopState, TickOutcome};
