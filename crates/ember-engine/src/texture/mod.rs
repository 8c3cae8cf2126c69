//! Texture decode collaborator.
//!
//! The render context only consumes the decoded shape ([`DecodedImage`]) to build
//! its one GPU texture at init time. Decoding lives behind [`TextureSource`].

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Decoded pixels, always expanded to tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file (informational; `pixels` is RGBA).
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// 1x1 opaque white. Sampling it leaves vertex colors unchanged.
    pub fn white() -> Self {
        Self::solid([255, 255, 255, 255])
    }

    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            channels: 4,
            pixels: rgba.to_vec(),
        }
    }

    /// Bytes per row of `pixels`.
    pub fn row_bytes(&self) -> u32 {
        self.width * 4
    }
}

/// Produces decoded images for the render context.
pub trait TextureSource {
    fn load(&self) -> Result<DecodedImage>;
}

/// Decodes an image file with the `image` crate.
#[derive(Debug, Clone)]
pub struct ImageFileSource {
    path: PathBuf,
}

impl ImageFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextureSource for ImageFileSource {
    fn load(&self) -> Result<DecodedImage> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("failed to read texture {}", self.path.display()))?;
        decode(&bytes).with_context(|| format!("failed to decode texture {}", self.path.display()))
    }
}

/// Uses a fixed in-memory image; the default when no texture is configured.
#[derive(Debug, Clone)]
pub struct SolidSource(pub [u8; 4]);

impl TextureSource for SolidSource {
    fn load(&self) -> Result<DecodedImage> {
        Ok(DecodedImage::solid(self.0))
    }
}

/// Decodes an encoded image (PNG, JPEG, BMP, TGA) from memory.
pub fn decode(bytes: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory(bytes).context("unsupported or corrupt image data")?;
    let channels = img.color().channel_count();
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    anyhow::ensure!(width > 0 && height > 0, "image has zero size");

    log::debug!("decoded {width}x{height} image ({channels} channels)");

    Ok(DecodedImage {
        width,
        height,
        channels,
        pixels: rgba.into_raw(),
    })
}
