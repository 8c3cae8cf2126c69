use anyhow::{ensure, Context, Result};

use crate::backend::{BindStep, ClearValues, GpuBackend, PipelineDesc};
use crate::coords::ViewportSize;
use crate::device::DeviceContext;
use crate::swapchain::SwapchainViews;
use crate::texture::DecodedImage;

use super::{ShaderBlob, ShaderStage};

/// Owns the static pipeline objects and rebinds all of them every frame.
///
/// Nothing here is rebuilt after init; only the per-frame bindings (vertex
/// buffer, constants, viewport, targets) change between binds.
pub struct PipelineStateBinder<B: GpuBackend> {
    // Drop order: pipeline before the texture it samples.
    pipeline: B::Pipeline,
    _texture: B::Texture,
}

impl<B: GpuBackend> PipelineStateBinder<B> {
    pub fn new(
        device: &mut DeviceContext<B>,
        vertex_shader: &ShaderBlob,
        pixel_shader: &ShaderBlob,
        image: &DecodedImage,
    ) -> Result<Self> {
        ensure!(
            vertex_shader.stage() == ShaderStage::Vertex,
            "{} is a {} shader, expected vertex",
            vertex_shader.origin(),
            vertex_shader.stage()
        );
        ensure!(
            pixel_shader.stage() == ShaderStage::Pixel,
            "{} is a {} shader, expected pixel",
            pixel_shader.origin(),
            pixel_shader.stage()
        );

        let backend = device.backend_mut();

        let texture = backend
            .create_texture("ember diffuse texture", image)
            .context("failed to create texture")?;

        let pipeline = backend
            .create_pipeline(&PipelineDesc {
                label: "ember pipeline",
                vertex_shader,
                pixel_shader,
                texture: &texture,
            })
            .context("failed to create pipeline state")?;

        log::info!(
            "pipeline ready (vs: {}, ps: {}, texture {}x{})",
            vertex_shader.origin(),
            pixel_shader.origin(),
            image.width,
            image.height
        );

        Ok(Self {
            pipeline,
            _texture: texture,
        })
    }

    /// Binds the complete fixed pipeline for one frame, targeting `views`.
    ///
    /// The output-merger step clears the targets to `clear`.
    pub fn bind_all(
        &self,
        device: &mut DeviceContext<B>,
        views: &SwapchainViews<B>,
        vertex_buffer: &B::Buffer,
        constants: &B::Buffer,
        viewport: ViewportSize,
        clear: ClearValues,
    ) -> Result<()> {
        let steps = [
            BindStep::InputAssembly {
                pipeline: &self.pipeline,
                vertex_buffer,
            },
            BindStep::VertexStage { constants },
            BindStep::Rasterizer { viewport },
            BindStep::PixelStage {
                pipeline: &self.pipeline,
            },
            BindStep::OutputMerger {
                backbuffer: &views.backbuffer,
                depth: &views.depth,
                clear,
            },
        ];
        device
            .backend_mut()
            .bind(&steps)
            .context("failed to bind pipeline")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::{Call, RecordingBackend, ResourceKind};
    use crate::backend::{BufferDesc, BufferKind};
    use crate::swapchain::SwapchainManager;

    #[test]
    fn bind_all_sets_every_stage_in_order() {
        let mut device = DeviceContext::from_backend(RecordingBackend::new());
        let recorder = device.backend().recorder();
        let size = ViewportSize::new(640, 480);

        let swapchain = SwapchainManager::create_for_window(&mut device, size).unwrap();
        let binder = PipelineStateBinder::new(
            &mut device,
            &ShaderBlob::builtin(ShaderStage::Vertex),
            &ShaderBlob::builtin(ShaderStage::Pixel),
            &DecodedImage::white(),
        )
        .unwrap();
        let desc = |kind| BufferDesc {
            label: "test",
            kind,
            size: 64,
        };
        let vb = device.backend_mut().create_buffer(desc(BufferKind::Vertex)).unwrap();
        let cb = device.backend_mut().create_buffer(desc(BufferKind::Constant)).unwrap();

        for _ in 0..2 {
            let views = swapchain.views().unwrap();
            device.backend_mut().acquire(&views.backbuffer).unwrap();
            binder
                .bind_all(&mut device, views, &vb, &cb, size, ClearValues::default())
                .unwrap();
            device.backend_mut().present().unwrap();
        }

        let binds: Vec<Call> = recorder
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Bind(_)))
            .collect();
        let full = Call::Bind(vec![
            "input-assembly",
            "vertex-stage",
            "rasterizer",
            "pixel-stage",
            "output-merger",
        ]);
        assert_eq!(binds, vec![full.clone(), full]);

        // No pipeline objects are created after init.
        assert_eq!(recorder.count(|c| matches!(c, Call::Create { kind: ResourceKind::Pipeline, .. })), 1);
    }

    #[test]
    fn texture_outlives_pipeline() {
        let mut device = DeviceContext::from_backend(RecordingBackend::new());
        let recorder = device.backend().recorder();
        let binder = PipelineStateBinder::new(
            &mut device,
            &ShaderBlob::builtin(ShaderStage::Vertex),
            &ShaderBlob::builtin(ShaderStage::Pixel),
            &DecodedImage::white(),
        )
        .unwrap();
        drop(binder);

        let releases: Vec<ResourceKind> = recorder
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Release { kind, .. } => Some(kind),
                _ => None,
            })
            .collect();
        assert_eq!(releases, vec![ResourceKind::Pipeline, ResourceKind::Texture]);
    }

    #[test]
    fn swapped_shader_stages_are_rejected() {
        let mut device = DeviceContext::from_backend(RecordingBackend::new());
        let result = PipelineStateBinder::new(
            &mut device,
            &ShaderBlob::builtin(ShaderStage::Pixel),
            &ShaderBlob::builtin(ShaderStage::Vertex),
            &DecodedImage::white(),
        );
        assert!(result.is_err());
    }
}
