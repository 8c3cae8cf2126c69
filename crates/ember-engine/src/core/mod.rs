//! Core engine-facing contracts.
//!
//! This module defines the interface between the frame loop and higher layers
//! (the viewer, overlays, tools) without leaking runtime internals into user code.

mod app;

pub use app::{App, FrameInfo, FrameStats, NoOverlay, Overlay};
