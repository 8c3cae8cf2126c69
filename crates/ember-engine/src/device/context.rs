use std::sync::Arc;

use anyhow::{Context, Result};
use winit::window::Window;

use crate::backend::{GpuBackend, WgpuBackend};

use super::{DeviceInit, DeviceStatus, RenderError};

/// Owns the GPU device and its command submission queue.
///
/// Created once at startup and kept for the lifetime of the process. Creation
/// failure is fatal: there is no implicit software fallback.
pub struct DeviceContext<B: GpuBackend> {
    backend: B,
}

impl DeviceContext<WgpuBackend> {
    /// Creates the device for `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; this blocks on it.
    pub fn init(window: Arc<Window>, init: DeviceInit) -> Result<Self> {
        let backend = pollster::block_on(WgpuBackend::new(window, init))
            .context("failed to create GPU device")?;
        Ok(Self::from_backend(backend))
    }
}

impl<B: GpuBackend> DeviceContext<B> {
    pub fn from_backend(backend: B) -> Self {
        log::info!("device ready: {}", backend.describe());
        Self { backend }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Classifies the device removal state after `operation`.
    ///
    /// Occlusion is reported and tolerated; any other removal is fatal.
    pub fn check_removed(&self, operation: &'static str) -> Result<DeviceStatus, RenderError> {
        match self.backend.device_status() {
            DeviceStatus::Ok => Ok(DeviceStatus::Ok),
            DeviceStatus::Occluded => {
                log::debug!("surface occluded after {operation}");
                Ok(DeviceStatus::Occluded)
            }
            DeviceStatus::Lost { reason } => {
                log::error!("device removed after {operation}: {reason}");
                Err(RenderError::DeviceLost { operation, reason })
            }
        }
    }
}

impl<B: GpuBackend> Drop for DeviceContext<B> {
    fn drop(&mut self) {
        log::debug!("releasing device");
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::recording::RecordingBackend;

    use super::*;

    #[test]
    fn healthy_device_reports_ok() {
        let device = DeviceContext::from_backend(RecordingBackend::new());
        assert_eq!(device.check_removed("present").unwrap(), DeviceStatus::Ok);
    }

    #[test]
    fn occlusion_is_not_an_error() {
        let backend = RecordingBackend::new();
        backend.set_status(DeviceStatus::Occluded);
        let device = DeviceContext::from_backend(backend);
        assert_eq!(device.check_removed("present").unwrap(), DeviceStatus::Occluded);
    }

    #[test]
    fn removal_is_fatal_and_names_the_operation() {
        let backend = RecordingBackend::new();
        backend.set_status(DeviceStatus::Lost {
            reason: "driver reset".into(),
        });
        let device = DeviceContext::from_backend(backend);

        let err = device.check_removed("present").unwrap_err();
        assert!(err.is_device_loss());
        let msg = err.to_string();
        assert!(msg.contains("present"), "{msg}");
        assert!(msg.contains("driver reset"), "{msg}");
    }
}
