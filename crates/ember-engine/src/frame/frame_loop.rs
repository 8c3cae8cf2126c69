use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::backend::{ClearValues, GpuBackend};
use crate::camera::{compute_matrix, CameraController, CameraUniform};
use crate::core::{App, FrameInfo, FrameStats, Overlay};
use crate::coords::ViewportSize;
use crate::device::{DeviceContext, DeviceStatus, PresentOutcome, SurfaceStatus};
use crate::input::InputState;
use crate::pipeline::{PipelineStateBinder, ShaderBlob};
use crate::platform::{Platform, PlatformEvent};
use crate::stream::{ConstantBuffer, FrameVertexStream, StreamError, DEFAULT_CAPACITY};
use crate::swapchain::SwapchainManager;
use crate::texture::DecodedImage;
use crate::time::{FpsCounter, FrameClock};

use super::state::{transition, LoopState, TickOutcome};

/// Frame loop tuning.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Target clear values applied by every pipeline bind.
    pub clear: ClearValues,
    /// How long a paused tick sleeps instead of spinning.
    pub paused_sleep: Duration,
    /// Vertex stream capacity, fixed for the lifetime of the loop.
    pub stream_capacity: usize,
    /// Refresh interval of the FPS readout.
    pub fps_display_delay: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            clear: ClearValues::default(),
            paused_sleep: Duration::from_millis(10),
            stream_capacity: DEFAULT_CAPACITY,
            fps_display_delay: Duration::from_millis(50),
        }
    }
}

/// Everything the loop creates its GPU objects from.
pub struct LoopResources<B: GpuBackend> {
    pub vertex_shader: ShaderBlob,
    pub pixel_shader: ShaderBlob,
    pub texture: DecodedImage,
    pub camera: CameraController,
    pub overlay: Box<dyn Overlay<B>>,
}

/// Owns the render context and drives one frame per tick.
///
/// GPU objects are released in reverse creation order. Fields are declared in
/// reverse init order; swap chain views recreated after init are newer than
/// everything else and are released first.
pub struct FrameLoop<B: GpuBackend> {
    overlay: Box<dyn Overlay<B>>,
    stream: FrameVertexStream<B>,
    constants: ConstantBuffer<B, CameraUniform>,
    binder: PipelineStateBinder<B>,
    swapchain: SwapchainManager<B>,
    device: DeviceContext<B>,

    camera: CameraController,
    clock: FrameClock,
    fps: FpsCounter,
    input: InputState,
    last_vertex_count: usize,
    /// Set once the swap chain views have been created after init.
    views_recreated: bool,
    state: LoopState,
    config: LoopConfig,
}

impl<B: GpuBackend> FrameLoop<B> {
    /// Creates the swap chain, pipeline, constants and vertex stream on `device`.
    pub fn new(
        mut device: DeviceContext<B>,
        viewport: ViewportSize,
        resources: LoopResources<B>,
        config: LoopConfig,
    ) -> Result<Self> {
        let LoopResources {
            vertex_shader,
            pixel_shader,
            texture,
            camera,
            mut overlay,
        } = resources;

        let swapchain = SwapchainManager::create_for_window(&mut device, viewport)
            .context("failed to create swapchain")?;
        let binder = PipelineStateBinder::new(&mut device, &vertex_shader, &pixel_shader, &texture)?;
        let constants = ConstantBuffer::new(&mut device, "ember camera constants")?;
        let stream = FrameVertexStream::new(&mut device, config.stream_capacity)?;

        overlay.init(&mut device).context("failed to initialize overlay")?;

        let state = if swapchain.is_presentable() {
            LoopState::Running
        } else {
            LoopState::Paused
        };
        log::info!("frame loop ready ({state}, {viewport})");

        Ok(Self {
            overlay,
            stream,
            constants,
            binder,
            swapchain,
            device,
            camera,
            clock: FrameClock::new(),
            fps: FpsCounter::new(config.fps_display_delay),
            input: InputState::default(),
            last_vertex_count: 0,
            views_recreated: false,
            state,
            config,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn device(&self) -> &DeviceContext<B> {
        &self.device
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Runs one iteration: events, timing, camera, resize, then at most one frame.
    ///
    /// Any error is fatal: the loop enters `Lost` and every later tick fails.
    pub fn tick(&mut self, platform: &mut dyn Platform, app: &mut dyn App) -> Result<TickOutcome> {
        if self.state == LoopState::Lost {
            bail!("frame loop is lost");
        }
        match self.step(platform, app) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                transition(&mut self.state, LoopState::Lost);
                log::error!("frame failed: {err:#}");
                Err(err)
            }
        }
    }

    /// Ticks until a quit event, then shuts down.
    pub fn run(mut self, platform: &mut dyn Platform, app: &mut dyn App) -> Result<()> {
        loop {
            if self.tick(platform, app)? == TickOutcome::Exit {
                break;
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Releases every GPU object in reverse creation order.
    pub fn shutdown(self) {
        log::info!("shutting down");
        drop(self);
    }

    fn step(&mut self, platform: &mut dyn Platform, app: &mut dyn App) -> Result<TickOutcome> {
        self.input.begin_tick();
        while let Some(event) = platform.poll_event() {
            match event {
                PlatformEvent::Quit => {
                    log::info!("quit requested");
                    return Ok(TickOutcome::Exit);
                }
                PlatformEvent::Input(ev) => self.input.apply(&ev),
            }
        }

        let time = self.clock.tick();
        self.fps.record(time.dt);
        self.camera.update(&self.input, platform);

        let viewport = platform.viewport_size();
        if self.swapchain.resize(&mut self.device, viewport)? {
            self.views_recreated = true;
        }
        self.stream.reset();

        let Some(views) = self.swapchain.views() else {
            transition(&mut self.state, LoopState::Paused);
            std::thread::sleep(self.config.paused_sleep);
            return Ok(TickOutcome::Continue);
        };

        match self.device.backend_mut().acquire(&views.backbuffer)? {
            SurfaceStatus::Ready => {}
            SurfaceStatus::Occluded => {
                log::debug!("surface occluded; pausing");
                transition(&mut self.state, LoopState::Paused);
                self.device.check_removed("acquire")?;
                std::thread::sleep(self.config.paused_sleep);
                return Ok(TickOutcome::Continue);
            }
            SurfaceStatus::Skipped => {
                log::debug!("frame {} skipped", time.frame_index);
                return Ok(TickOutcome::Continue);
            }
        }

        self.binder.bind_all(
            &mut self.device,
            views,
            self.stream.buffer(),
            self.constants.buffer(),
            viewport,
            self.config.clear,
        )?;

        let view_proj = compute_matrix(self.camera.state(), viewport);
        self.constants
            .upload(&mut self.device, &CameraUniform::from(view_proj))?;

        self.overlay.begin_frame(&FrameStats {
            frame_index: time.frame_index,
            dt: time.dt,
            fps: self.fps.fps(),
            viewport,
            last_vertex_count: self.last_vertex_count,
        });

        let info = FrameInfo {
            time,
            viewport,
            camera: self.camera.state(),
            input: &self.input,
        };
        for mesh in app.frame(&info) {
            match self.stream.enqueue(mesh) {
                Ok(_) | Err(StreamError::Overflow { .. }) => {}
                Err(err @ StreamError::IndexOutOfRange { .. }) => log::warn!("mesh skipped: {err}"),
            }
        }
        self.stream.flush(&mut self.device)?;

        self.overlay.render(&mut self.device, platform);

        if !self.stream.is_empty() {
            self.device.backend_mut().draw(self.stream.len() as u32, 0);
        }
        self.last_vertex_count = self.stream.len();

        let outcome = self.device.backend_mut().present()?;
        let status = self.device.check_removed("present")?;

        if outcome == PresentOutcome::Occluded || status == DeviceStatus::Occluded {
            transition(&mut self.state, LoopState::Paused);
            std::thread::sleep(self.config.paused_sleep);
        } else {
            transition(&mut self.state, LoopState::Running);
        }
        log::trace!("frame {} presented ({} vertices)", time.frame_index, self.last_vertex_count);

        Ok(TickOutcome::Continue)
    }
}

impl<B: GpuBackend> Drop for FrameLoop<B> {
    fn drop(&mut self) {
        if self.views_recreated {
            self.swapchain.release_views();
        }
    }
}
