use thiserror::Error;

use crate::coords::ViewportSize;

/// Runtime failures that end the frame loop.
///
/// Anything not listed here (occlusion, a skipped frame) is handled in place and
/// never reaches the caller as an error.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("GPU device lost after {operation}: {reason}")]
    DeviceLost {
        operation: &'static str,
        reason: String,
    },

    #[error("failed to present swap chain: {0}")]
    PresentFailed(String),

    #[error("failed to resize swap chain to {size}: {reason}")]
    ResizeFailed { size: ViewportSize, reason: String },

    #[error("out of GPU memory during {0}")]
    OutOfMemory(&'static str),
}

impl RenderError {
    /// True when the device itself is unusable (the loop enters `Lost`).
    pub fn is_device_loss(&self) -> bool {
        matches!(self, RenderError::DeviceLost { .. } | RenderError::OutOfMemory(_))
    }
}
