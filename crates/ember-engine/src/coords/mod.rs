//! Screen-space size types shared by the swapchain, camera and platform layers.
//!
//! Everything is in physical pixels, origin top-left, +Y down. World-space math
//! uses `glam`.

mod viewport;

pub use viewport::ViewportSize;
