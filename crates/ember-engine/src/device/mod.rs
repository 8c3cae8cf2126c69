//! GPU device ownership.
//!
//! - `DeviceContext`: the single owner of the device and its queue
//! - `DeviceInit`: creation parameters
//! - error/status types shared by the swapchain and the frame loop

mod context;
mod error;
mod init;
mod status;

pub use context::DeviceContext;
pub use error::RenderError;
pub use init::DeviceInit;
pub use status::{DeviceStatus, PresentOutcome, SurfaceStatus};
