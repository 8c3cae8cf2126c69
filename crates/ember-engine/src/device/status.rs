/// Result of preparing the back buffer for a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceStatus {
    /// Back buffer acquired; record and present.
    Ready,
    /// Surface not visible (minimized, covered). Not an error.
    Occluded,
    /// Transient problem; skip this frame and try again next tick.
    Skipped,
}

/// Result of a present call that did not fail outright.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentOutcome {
    Presented,
    Occluded,
}

/// Device removal state as reported by the backend.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DeviceStatus {
    /// Not removed.
    Ok,
    /// Presentation is blocked but the device is intact.
    Occluded,
    /// Device removed; carries the backend's reason text.
    Lost { reason: String },
}
