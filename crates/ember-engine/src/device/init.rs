/// Initialization parameters for the device and its presentation surface.
///
/// Add flags only when a concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct DeviceInit {
    /// Adapter preference. Only one adapter is requested; there is no retry.
    pub power_preference: wgpu::PowerPreference,

    /// Explicitly request a software adapter. Never chosen implicitly.
    pub force_fallback_adapter: bool,

    /// Prefer an sRGB back buffer format when available.
    pub prefer_srgb: bool,

    /// Present with vsync (`Fifo`) or without (`AutoNoVsync`).
    pub vsync: bool,

    /// Alpha mode preference; falls back to the first supported mode.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Frames in flight. 2 keeps the swap chain double buffered.
    pub desired_maximum_frame_latency: u32,

    /// Attach API validation that turns GPU errors into an immediate panic.
    ///
    /// Has no effect in release builds.
    pub diagnostics: bool,
}

impl Default for DeviceInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            prefer_srgb: true,
            vsync: true,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
            diagnostics: true,
        }
    }
}

impl DeviceInit {
    pub(crate) fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    /// Instance flags for this build.
    #[cfg(debug_assertions)]
    pub(crate) fn instance_flags(&self) -> wgpu::InstanceFlags {
        if self.diagnostics {
            wgpu::InstanceFlags::debugging()
        } else {
            wgpu::InstanceFlags::empty()
        }
    }

    /// Instance flags for this build.
    #[cfg(not(debug_assertions))]
    pub(crate) fn instance_flags(&self) -> wgpu::InstanceFlags {
        wgpu::InstanceFlags::empty()
    }
}
