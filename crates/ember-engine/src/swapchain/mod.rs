//! Presentation surface and its size-dependent views.
//!
//! `SwapchainManager` owns the back-buffer render-target view and the matching
//! depth view. Both exist exactly when the viewport is presentable, and always
//! have the same size as the surface.

use anyhow::{Context, Result};

use crate::backend::GpuBackend;
use crate::coords::ViewportSize;
use crate::device::{DeviceContext, RenderError};

/// Size-dependent views, recreated together on every resize.
pub struct SwapchainViews<B: GpuBackend> {
    // Drop order: depth before back buffer.
    pub depth: B::DepthView,
    pub backbuffer: B::BackbufferView,
}

pub struct SwapchainManager<B: GpuBackend> {
    views: Option<SwapchainViews<B>>,
    size: ViewportSize,
}

impl<B: GpuBackend> SwapchainManager<B> {
    /// Creates the swap chain for the window's current size.
    ///
    /// A zero size is accepted; views are created on the first presentable resize.
    pub fn create_for_window(device: &mut DeviceContext<B>, size: ViewportSize) -> Result<Self> {
        let views = if size.is_presentable() {
            Some(create_views(device, size)?)
        } else {
            None
        };
        log::info!("swapchain created at {size}");
        Ok(Self { views, size })
    }

    /// Brings the views in line with `requested`.
    ///
    /// No-op when the size is unchanged. Otherwise the old views are released
    /// first, and new ones are created only for a presentable size. Returns
    /// whether anything changed.
    pub fn resize(&mut self, device: &mut DeviceContext<B>, requested: ViewportSize) -> Result<bool, RenderError> {
        if requested == self.size && self.views.is_some() == requested.is_presentable() {
            return Ok(false);
        }

        // Release before resizing: the surface cannot resize while views reference it.
        self.views = None;
        self.size = requested;

        if !requested.is_presentable() {
            log::debug!("swapchain released views at {requested}");
            return Ok(true);
        }

        let views = create_views(device, requested).map_err(|e| RenderError::ResizeFailed {
            size: requested,
            reason: format!("{e:#}"),
        })?;
        self.views = Some(views);

        log::debug!("swapchain resized to {requested}");
        Ok(true)
    }

    /// Drops the current views. The next presentable `resize` recreates them.
    pub fn release_views(&mut self) {
        if self.views.take().is_some() {
            log::debug!("swapchain views released");
        }
    }

    /// Current views, `None` while the viewport is not presentable.
    pub fn views(&self) -> Option<&SwapchainViews<B>> {
        self.views.as_ref()
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn is_presentable(&self) -> bool {
        self.views.is_some()
    }
}

fn create_views<B: GpuBackend>(device: &mut DeviceContext<B>, size: ViewportSize) -> Result<SwapchainViews<B>> {
    let backend = device.backend_mut();
    backend
        .resize_surface(size)
        .with_context(|| format!("failed to resize surface to {size}"))?;
    let backbuffer = backend
        .create_backbuffer_view(size)
        .context("failed to recreate render-target view")?;
    let depth = backend
        .create_depth_view(size)
        .context("failed to recreate depth-stencil view")?;
    Ok(SwapchainViews { depth, backbuffer })
}

impl<B: GpuBackend> Drop for SwapchainManager<B> {
    fn drop(&mut self) {
        log::debug!("releasing swapchain ({})", self.size);
    }
}
