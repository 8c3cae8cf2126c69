use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};

const BUILTIN_WGSL: &str = include_str!("shaders/default.wgsl");

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Pipeline stage a blob is bound to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    /// Entry point used when the blob does not name one.
    pub fn default_entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Pixel => "fs_main",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Pixel => f.write_str("pixel"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderFormat {
    Wgsl,
    SpirV,
}

/// Precompiled shader bytes, loaded whole and handed to the backend unchanged.
#[derive(Debug, Clone)]
pub struct ShaderBlob {
    stage: ShaderStage,
    format: ShaderFormat,
    entry_point: String,
    bytes: Cow<'static, [u8]>,
    /// Where the bytes came from, for logs and errors.
    origin: String,
}

impl ShaderBlob {
    /// Reads `path` fully. `.spv` files are SPIR-V, anything else is WGSL text.
    pub fn load(path: impl AsRef<Path>, stage: ShaderStage) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {stage} shader {}", path.display()))?;

        let is_spirv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("spv"));
        let format = if is_spirv {
            ShaderFormat::SpirV
        } else {
            ShaderFormat::Wgsl
        };

        let blob = Self {
            stage,
            format,
            entry_point: stage.default_entry_point().to_string(),
            bytes: Cow::Owned(bytes),
            origin: path.display().to_string(),
        };
        blob.validate()?;

        log::debug!("loaded {stage} shader {} ({} bytes)", blob.origin, blob.bytes.len());
        Ok(blob)
    }

    /// Built-in WGSL shader matching [`crate::pipeline::Vertex`] and the camera constants.
    pub fn builtin(stage: ShaderStage) -> Self {
        Self {
            stage,
            format: ShaderFormat::Wgsl,
            entry_point: stage.default_entry_point().to_string(),
            bytes: Cow::Borrowed(BUILTIN_WGSL.as_bytes()),
            origin: "builtin".to_string(),
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn format(&self) -> ShaderFormat {
        self.format
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// WGSL source text. `None` for SPIR-V blobs.
    pub fn wgsl_source(&self) -> Option<&str> {
        match self.format {
            ShaderFormat::Wgsl => std::str::from_utf8(&self.bytes).ok(),
            ShaderFormat::SpirV => None,
        }
    }

    fn validate(&self) -> Result<()> {
        match self.format {
            ShaderFormat::Wgsl => {
                if std::str::from_utf8(&self.bytes).is_err() {
                    bail!("{} shader {} is not valid UTF-8 WGSL", self.stage, self.origin);
                }
            }
            ShaderFormat::SpirV => {
                ensure!(
                    self.bytes.len() >= 4 && self.bytes.len() % 4 == 0,
                    "{} shader {} is not a whole number of SPIR-V words ({} bytes)",
                    self.stage,
                    self.origin,
                    self.bytes.len()
                );
                let magic = u32::from_le_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
                ensure!(
                    magic == SPIRV_MAGIC,
                    "{} shader {} has no SPIR-V magic number",
                    self.stage,
                    self.origin
                );
            }
        }
        Ok(())
    }
}
