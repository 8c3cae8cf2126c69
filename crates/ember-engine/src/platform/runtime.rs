use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::WgpuBackend;
use crate::core::App;
use crate::device::{DeviceContext, DeviceInit};
use crate::frame::{FrameLoop, LoopConfig, LoopResources, TickOutcome};

use super::{Platform, WinitPlatform};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub device: DeviceInit,
    pub frame_loop: LoopConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "ember".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            device: DeviceInit::default(),
            frame_loop: LoopConfig::default(),
        }
    }
}

/// Entry point for the runtime.
///
/// Owns the winit event loop; the window, device and frame loop are created on
/// the first `resumed` and torn down when the frame loop exits.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, resources: LoopResources<WgpuBackend>, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState {
            config,
            resources: Some(resources),
            app,
            active: None,
            error: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Window-bound state. The frame loop is dropped before the window.
struct Active {
    frame_loop: FrameLoop<WgpuBackend>,
    platform: WinitPlatform,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    resources: Option<LoopResources<WgpuBackend>>,
    app: A,
    active: Option<Active>,
    error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn create_active(&mut self, event_loop: &ActiveEventLoop) -> Result<Active> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let mut platform = WinitPlatform::new(Arc::clone(&window));
        let device = DeviceContext::init(window, self.config.device.clone())?;

        let resources = self
            .resources
            .take()
            .ok_or_else(|| anyhow!("frame loop resources already consumed"))?;
        let mut frame_loop = FrameLoop::new(
            device,
            platform.viewport_size(),
            resources,
            self.config.frame_loop.clone(),
        )?;

        // Apply the initial interaction mode's cursor state.
        let mode = frame_loop.camera().mode();
        frame_loop.camera_mut().set_mode(mode, &mut platform);

        Ok(Active {
            frame_loop,
            platform,
        })
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(active) = self.active.take() {
            active.frame_loop.shutdown();
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        // A lost loop is dropped as-is; its fields still release in order.
        self.active = None;
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.active.is_some() || self.error.is_some() {
            return;
        }

        match self.create_active(event_loop) {
            Ok(active) => self.active = Some(active),
            Err(err) => self.fail(event_loop, err.context("failed to start render context")),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.platform.window().id() != window_id {
            return;
        }
        active.platform.handle_window_event(&event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        let Some(active) = self.active.as_mut() else {
            return;
        };

        match active.frame_loop.tick(&mut active.platform, &mut self.app) {
            Ok(TickOutcome::Continue) => {}
            Ok(TickOutcome::Exit) => self.shutdown(event_loop),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(active) = self.active.take() {
            active.frame_loop.shutdown();
        }
    }
}
