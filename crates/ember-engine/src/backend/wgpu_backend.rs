use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use anyhow::{bail, ensure, Context, Result};
use winit::window::Window;

use crate::camera::CameraUniform;
use crate::coords::ViewportSize;
use crate::device::{DeviceInit, DeviceStatus, PresentOutcome, RenderError, SurfaceStatus};
use crate::pipeline::{ShaderBlob, ShaderFormat, Vertex};
use crate::texture::DecodedImage;

use super::{BindStep, BufferDesc, BufferKind, ClearValues, GpuBackend, PipelineDesc};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Configured-surface token. wgpu hands out the actual texture view per frame.
pub struct WgpuBackbuffer {
    size: ViewportSize,
}

impl WgpuBackbuffer {
    pub fn size(&self) -> ViewportSize {
        self.size
    }
}

pub struct WgpuDepthView {
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

pub struct WgpuBuffer {
    /// Group 0 bind group for constant buffers.
    bind_group: Option<wgpu::BindGroup>,
    buffer: wgpu::Buffer,
}

pub struct WgpuTexture {
    sampler: wgpu::Sampler,
    view: wgpu::TextureView,
    _texture: wgpu::Texture,
}

pub struct WgpuPipeline {
    /// Group 1: texture + sampler.
    texture_bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

/// Frame between `acquire` and `present`.
///
/// Field order is drop order: the pass must end before the encoder finishes.
struct ActiveFrame {
    pass: Option<wgpu::RenderPass<'static>>,
    encoder: wgpu::CommandEncoder,
    view: wgpu::TextureView,
    surface_texture: wgpu::SurfaceTexture,
}

/// Owns wgpu core objects and the surface configuration.
///
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - records one render pass per acquired frame
pub struct WgpuBackend {
    frame: Option<ActiveFrame>,

    camera_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Surface bound to the window. The `Arc<Window>` keeps the window alive.
    surface: wgpu::Surface<'static>,

    queue: wgpu::Queue,
    device: wgpu::Device,
    adapter: wgpu::Adapter,
    _instance: wgpu::Instance,

    window: Arc<Window>,

    /// Set by the device-lost callback.
    lost: Arc<Mutex<Option<String>>>,
}

impl WgpuBackend {
    /// Creates the device and an (unconfigured) surface for `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: Arc<Window>, init: DeviceInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: init.instance_flags(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("ember device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let lost = Arc::new(Mutex::new(None));
        let latch = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            if let Ok(mut slot) = latch.lock() {
                slot.get_or_insert_with(|| format!("{reason:?}: {message}"));
            }
        });

        let surface_caps = surface.get_capabilities(&adapter);
        let format = choose_surface_format(&surface_caps, init.prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = choose_alpha_mode(&surface_caps, init.alpha_mode);

        let size = ViewportSize::from(window.inner_size());

        // Configured on the first presentable resize.
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode(),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ember camera bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<CameraUniform>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ember texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        Ok(Self {
            frame: None,
            camera_layout,
            texture_layout,
            config,
            surface,
            queue,
            device,
            adapter,
            _instance: instance,
            window,
            lost,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn reconfigure(&self) {
        if self.config.width > 0 && self.config.height > 0 {
            self.surface.configure(&self.device, &self.config);
        }
    }
}

impl GpuBackend for WgpuBackend {
    type BackbufferView = WgpuBackbuffer;
    type DepthView = WgpuDepthView;
    type Buffer = WgpuBuffer;
    type Texture = WgpuTexture;
    type Pipeline = WgpuPipeline;

    fn describe(&self) -> String {
        let info = self.adapter.get_info();
        format!(
            "{} ({:?}, {:?}), surface {:?}",
            info.name, info.backend, info.device_type, self.config.format
        )
    }

    fn resize_surface(&mut self, size: ViewportSize) -> Result<()> {
        ensure!(size.is_presentable(), "cannot configure a {size} surface");
        // A frame still holding the old surface texture blocks reconfiguration.
        self.frame = None;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        Ok(())
    }

    fn create_backbuffer_view(&mut self, size: ViewportSize) -> Result<WgpuBackbuffer> {
        ensure!(
            size.width == self.config.width && size.height == self.config.height,
            "back buffer {size} does not match the {}x{} surface",
            self.config.width,
            self.config.height
        );
        Ok(WgpuBackbuffer { size })
    }

    fn create_depth_view(&mut self, size: ViewportSize) -> Result<WgpuDepthView> {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ember depth"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(WgpuDepthView {
            view,
            _texture: texture,
        })
    }

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<WgpuBuffer> {
        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            BufferKind::Constant => wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        };
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(desc.label),
            size: desc.size,
            usage,
            mapped_at_creation: false,
        });

        let bind_group = match desc.kind {
            BufferKind::Constant => Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(desc.label),
                layout: &self.camera_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })),
            BufferKind::Vertex => None,
        };

        Ok(WgpuBuffer { bind_group, buffer })
    }

    fn write_buffer(&mut self, buffer: &WgpuBuffer, bytes: &[u8]) -> Result<()> {
        let len = bytes.len() as u64;
        ensure!(
            len <= buffer.buffer.size(),
            "write of {len} bytes exceeds buffer size {}",
            buffer.buffer.size()
        );
        ensure!(len % wgpu::COPY_BUFFER_ALIGNMENT == 0, "write of {len} bytes is not 4-byte aligned");
        self.queue.write_buffer(&buffer.buffer, 0, bytes);
        Ok(())
    }

    fn create_texture(&mut self, label: &'static str, image: &DecodedImage) -> Result<WgpuTexture> {
        ensure!(
            image.pixels.len() == (image.row_bytes() * image.height) as usize,
            "{label}: pixel data does not match {}x{} RGBA",
            image.width,
            image.height
        );

        let extent = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.row_bytes()),
                rows_per_image: Some(image.height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ember sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Ok(WgpuTexture {
            sampler,
            view,
            _texture: texture,
        })
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_, Self>) -> Result<WgpuPipeline> {
        let vs = shader_module(&self.device, desc.vertex_shader)?;
        let fs = shader_module(&self.device, desc.pixel_shader)?;

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ember pipeline layout"),
            bind_group_layouts: &[&self.camera_layout, &self.texture_layout],
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(desc.vertex_shader.entry_point()),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(desc.pixel_shader.entry_point()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let texture_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ember texture bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&desc.texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&desc.texture.sampler),
                },
            ],
        });

        Ok(WgpuPipeline {
            texture_bind_group,
            pipeline,
        })
    }

    fn acquire(&mut self, backbuffer: &WgpuBackbuffer) -> Result<SurfaceStatus, RenderError> {
        if self.frame.take().is_some() {
            log::warn!("previous frame was never presented; dropped");
        }
        if backbuffer.size.width != self.config.width || backbuffer.size.height != self.config.height {
            log::debug!("stale back buffer {}; skipping frame", backbuffer.size);
            return Ok(SurfaceStatus::Skipped);
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => return map_surface_error(self, err),
        };
        if surface_texture.suboptimal {
            log::trace!("surface texture is suboptimal");
        }

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ember frame encoder"),
            });

        self.frame = Some(ActiveFrame {
            pass: None,
            encoder,
            view,
            surface_texture,
        });
        Ok(SurfaceStatus::Ready)
    }

    fn bind(&mut self, steps: &[BindStep<'_, Self>]) -> Result<()> {
        let Some(frame) = self.frame.as_mut() else {
            bail!("bind outside an acquired frame");
        };

        let targets = steps.iter().find_map(|s| match s {
            BindStep::OutputMerger { depth, clear, .. } => Some((*depth, *clear)),
            _ => None,
        });
        let Some((depth, clear)) = targets else {
            bail!("bind without an output-merger step");
        };

        // Output-merger state opens the pass; everything else is set on it in order.
        frame.pass = None;
        let mut pass = begin_pass(&mut frame.encoder, &frame.view, &depth.view, clear);

        for step in steps {
            match step {
                BindStep::InputAssembly {
                    pipeline,
                    vertex_buffer,
                } => {
                    pass.set_pipeline(&pipeline.pipeline);
                    pass.set_vertex_buffer(0, vertex_buffer.buffer.slice(..));
                }
                BindStep::VertexStage { constants } => {
                    let Some(group) = constants.bind_group.as_ref() else {
                        bail!("vertex-stage constants must be a constant buffer");
                    };
                    pass.set_bind_group(0, group, &[]);
                }
                BindStep::Rasterizer { viewport } => {
                    pass.set_viewport(0.0, 0.0, viewport.width as f32, viewport.height as f32, 0.0, 1.0);
                }
                BindStep::PixelStage { pipeline } => {
                    pass.set_bind_group(1, &pipeline.texture_bind_group, &[]);
                }
                BindStep::OutputMerger { .. } => {}
            }
        }

        frame.pass = Some(pass);
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) {
        match self.frame.as_mut().and_then(|f| f.pass.as_mut()) {
            Some(pass) => pass.draw(first_vertex..first_vertex + vertex_count, 0..1),
            None => log::warn!("draw without a bound pipeline; ignored"),
        }
    }

    fn present(&mut self) -> Result<PresentOutcome, RenderError> {
        let Some(frame) = self.frame.take() else {
            return Err(RenderError::PresentFailed("no acquired frame".to_string()));
        };
        let ActiveFrame {
            pass,
            encoder,
            view,
            surface_texture,
        } = frame;

        drop(pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);

        self.window.pre_present_notify();
        surface_texture.present();
        Ok(PresentOutcome::Presented)
    }

    fn device_status(&self) -> DeviceStatus {
        let reason = match self.lost.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        match reason {
            Some(reason) => DeviceStatus::Lost { reason },
            None => DeviceStatus::Ok,
        }
    }
}

fn begin_pass(
    encoder: &mut wgpu::CommandEncoder,
    color: &wgpu::TextureView,
    depth: &wgpu::TextureView,
    clear: ClearValues,
) -> wgpu::RenderPass<'static> {
    let [r, g, b, a] = clear.color;
    encoder
        .begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ember frame pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear.depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
        .forget_lifetime()
}

fn shader_module(device: &wgpu::Device, blob: &ShaderBlob) -> Result<wgpu::ShaderModule> {
    let source = match blob.format() {
        ShaderFormat::Wgsl => {
            let text = blob
                .wgsl_source()
                .with_context(|| format!("{} is not WGSL text", blob.origin()))?;
            wgpu::ShaderSource::Wgsl(Cow::Borrowed(text))
        }
        ShaderFormat::SpirV => wgpu::util::make_spirv(blob.bytes()),
    };
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(blob.origin()),
        source,
    }))
}

/// Classifies an acquire failure.
fn map_surface_error(backend: &WgpuBackend, err: wgpu::SurfaceError) -> Result<SurfaceStatus, RenderError> {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            log::debug!("surface {err}; reconfiguring");
            backend.reconfigure();
            Ok(SurfaceStatus::Skipped)
        }
        wgpu::SurfaceError::Timeout => Ok(SurfaceStatus::Occluded),
        wgpu::SurfaceError::OutOfMemory => Err(RenderError::OutOfMemory("surface acquire")),
        wgpu::SurfaceError::Other => {
            log::warn!("surface acquire failed: {err}; skipping frame");
            Ok(SurfaceStatus::Skipped)
        }
    }
}

fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    if caps.formats.is_empty() {
        return None;
    }

    if prefer_srgb {
        let preferred = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Rgba8UnormSrgb,
        ];
        for f in preferred {
            if caps.formats.contains(&f) {
                return Some(f);
            }
        }
    }

    Some(caps.formats[0])
}

fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}
