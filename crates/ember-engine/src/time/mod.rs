//! Time subsystem.
//!
//! - `FrameClock`: one per frame loop, `tick()` once per loop iteration
//! - `FpsCounter`: smoothed rate for overlays

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
