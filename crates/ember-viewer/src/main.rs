use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use ember_engine::backend::{ClearValues, WgpuBackend};
use ember_engine::camera::{CameraBindings, CameraController, CameraState, InteractionMode, OrthoCamera};
use ember_engine::core::{App, FrameInfo, FrameStats, Overlay};
use ember_engine::device::DeviceContext;
use ember_engine::frame::{LoopConfig, LoopResources};
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::pipeline::{ShaderBlob, ShaderStage};
use ember_engine::platform::{Platform, Runtime, RuntimeConfig};
use ember_engine::stream::{Mesh, DEFAULT_CAPACITY};
use ember_engine::texture::{DecodedImage, ImageFileSource, TextureSource};

/// Command line of the viewer.
#[derive(Parser, Debug)]
#[command(
    name = "ember-viewer",
    about = "Draws a demo scene with the ember render context",
    version
)]
struct Args {
    /// Texture sampled by the pixel stage. A 1x1 white texture is used when omitted.
    texture: Option<PathBuf>,

    /// Precompiled vertex shader (`.spv` SPIR-V, anything else WGSL).
    #[arg(long, requires = "pixel_shader")]
    vertex_shader: Option<PathBuf>,

    /// Precompiled pixel shader, same formats as the vertex shader.
    #[arg(long, requires = "vertex_shader")]
    pixel_shader: Option<PathBuf>,

    /// Window title.
    #[arg(long, default_value = "ember viewer")]
    title: String,

    /// Initial window width (logical pixels).
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Initial window height (logical pixels).
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Vertex stream capacity, fixed for the run.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Start with the cursor captured by the camera.
    #[arg(long)]
    engaged: bool,
}

/// Viewer settings resolved from the command line.
#[derive(Debug, Clone)]
struct ViewerConfig {
    title: String,
    width: f64,
    height: f64,
    vertex_shader: Option<PathBuf>,
    pixel_shader: Option<PathBuf>,
    texture: Option<PathBuf>,
    stream_capacity: usize,
    clear_color: [f64; 4],
    camera_mode: InteractionMode,
}

impl From<Args> for ViewerConfig {
    fn from(args: Args) -> Self {
        Self {
            title: args.title,
            width: args.width,
            height: args.height,
            vertex_shader: args.vertex_shader,
            pixel_shader: args.pixel_shader,
            texture: args.texture,
            stream_capacity: args.capacity,
            clear_color: [0.05, 0.06, 0.08, 1.0],
            camera_mode: if args.engaged {
                InteractionMode::Engaged
            } else {
                InteractionMode::FreeCursor
            },
        }
    }
}

/// A spinning triangle over a row of quads.
struct Demo {
    started: Instant,
    meshes: Vec<Mesh>,
}

impl App for Demo {
    fn frame(&mut self, info: &FrameInfo<'_>) -> &[Mesh] {
        self.meshes.clear();

        let t = info.time.now.duration_since(self.started).as_secs_f32();
        let r = 120.0;
        let corner = |i: f32| {
            let a = t + i * std::f32::consts::TAU / 3.0;
            [a.cos() * r, a.sin() * r]
        };
        self.meshes.push(Mesh::triangle(
            [corner(0.0), corner(1.0), corner(2.0)],
            [1.0, 0.55, 0.2, 1.0],
        ));

        for i in 0..5 {
            let x = -300.0 + i as f32 * 130.0;
            let shade = 0.3 + i as f32 * 0.15;
            self.meshes
                .push(Mesh::quad(x, -260.0, 100.0, 60.0, [shade, shade, 0.9, 1.0]));
        }

        &self.meshes
    }
}

/// Shows frame rate and vertex count in the window title.
struct TitleOverlay {
    base: String,
    stats: Option<FrameStats>,
}

impl Overlay<WgpuBackend> for TitleOverlay {
    fn begin_frame(&mut self, stats: &FrameStats) {
        self.stats = Some(*stats);
    }

    fn render(&mut self, _device: &mut DeviceContext<WgpuBackend>, platform: &mut dyn Platform) {
        let Some(stats) = self.stats else {
            return;
        };
        // Titles are slow on some platforms.
        if stats.frame_index % 30 != 0 {
            return;
        }
        platform.set_title(&format!(
            "{} | {:.0} fps | {} | {} verts",
            self.base, stats.fps, stats.viewport, stats.last_vertex_count
        ));
    }
}

fn load_shader(path: Option<&PathBuf>, stage: ShaderStage) -> Result<ShaderBlob> {
    match path {
        Some(path) => ShaderBlob::load(path, stage),
        None => Ok(ShaderBlob::builtin(stage)),
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = ViewerConfig::from(Args::parse());
    log::info!("viewer config: {config:?}");

    let vertex_shader = load_shader(config.vertex_shader.as_ref(), ShaderStage::Vertex)?;
    let pixel_shader = load_shader(config.pixel_shader.as_ref(), ShaderStage::Pixel)?;
    let texture = match &config.texture {
        Some(path) => ImageFileSource::new(path).load()?,
        None => DecodedImage::white(),
    };

    let camera = CameraController::new(
        CameraState::Ortho(OrthoCamera::default()),
        config.camera_mode,
        CameraBindings::default(),
    );

    let resources = LoopResources {
        vertex_shader,
        pixel_shader,
        texture,
        camera,
        overlay: Box::new(TitleOverlay {
            base: config.title.clone(),
            stats: None,
        }),
    };

    let runtime = RuntimeConfig {
        title: config.title.clone(),
        initial_size: (config.width, config.height).into(),
        frame_loop: LoopConfig {
            clear: ClearValues {
                color: config.clear_color,
                ..ClearValues::default()
            },
            stream_capacity: config.stream_capacity,
            ..LoopConfig::default()
        },
        ..RuntimeConfig::default()
    };

    Runtime::run(
        runtime,
        resources,
        Demo {
            started: Instant::now(),
            meshes: Vec::new(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ViewerConfig, clap::Error> {
        let argv = std::iter::once("ember-viewer").chain(args.iter().copied());
        Args::try_parse_from(argv).map(ViewerConfig::from)
    }

    #[test]
    fn no_args_uses_builtins() {
        let config = parse(&[]).unwrap();
        assert!(config.vertex_shader.is_none());
        assert!(config.pixel_shader.is_none());
        assert!(config.texture.is_none());
        assert_eq!(config.stream_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.camera_mode, InteractionMode::FreeCursor);
    }

    #[test]
    fn positional_path_is_the_texture() {
        let config = parse(&["crate.png", "--engaged"]).unwrap();
        assert_eq!(config.texture, Some(PathBuf::from("crate.png")));
        assert_eq!(config.camera_mode, InteractionMode::Engaged);
    }

    #[test]
    fn shader_pair_and_texture() {
        let config = parse(&["--vertex-shader", "a.spv", "--pixel-shader", "b.spv", "c.png"]).unwrap();
        assert_eq!(config.vertex_shader, Some(PathBuf::from("a.spv")));
        assert_eq!(config.pixel_shader, Some(PathBuf::from("b.spv")));
        assert_eq!(config.texture, Some(PathBuf::from("c.png")));
    }

    #[test]
    fn half_a_shader_pair_is_rejected() {
        assert!(parse(&["--vertex-shader", "a.spv"]).is_err());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(parse(&["--fast"]).is_err());
    }

    #[test]
    fn capacity_and_size_are_configurable() {
        let config = parse(&["--capacity", "96", "--width", "640", "--height", "480"]).unwrap();
        assert_eq!(config.stream_capacity, 96);
        assert_eq!((config.width, config.height), (640.0, 480.0));
    }
}
