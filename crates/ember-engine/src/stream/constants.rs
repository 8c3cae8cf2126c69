use std::marker::PhantomData;

use anyhow::{Context, Result};
use bytemuck::Pod;

use crate::backend::{BufferDesc, BufferKind, GpuBackend};
use crate::device::DeviceContext;

/// Constant buffer holding one `T`, rewritten whole every frame.
pub struct ConstantBuffer<B: GpuBackend, T: Pod> {
    buffer: B::Buffer,
    _value: PhantomData<T>,
}

impl<B: GpuBackend, T: Pod> ConstantBuffer<B, T> {
    pub fn new(device: &mut DeviceContext<B>, label: &'static str) -> Result<Self> {
        let buffer = device
            .backend_mut()
            .create_buffer(BufferDesc {
                label,
                kind: BufferKind::Constant,
                size: std::mem::size_of::<T>() as u64,
            })
            .with_context(|| format!("failed to create constant buffer {label}"))?;
        Ok(Self {
            buffer,
            _value: PhantomData,
        })
    }

    pub fn upload(&self, device: &mut DeviceContext<B>, value: &T) -> Result<()> {
        device
            .backend_mut()
            .write_buffer(&self.buffer, bytemuck::bytes_of(value))
            .context("failed to upload constants")
    }

    pub fn buffer(&self) -> &B::Buffer {
        &self.buffer
    }
}
