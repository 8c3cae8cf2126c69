//! Ember engine crate.
//!
//! A single-window real-time render context: device bring-up, swapchain
//! management, a fixed-function pipeline, a per-frame vertex stream and a
//! camera, driven by a frame loop that survives resizes and device loss.

pub mod backend;
pub mod camera;
pub mod coords;
pub mod core;
pub mod device;
pub mod frame;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod platform;
pub mod stream;
pub mod swapchain;
pub mod texture;
pub mod time;
