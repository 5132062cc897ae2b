//! Constant Buffers
//!
//! Thin typed wrapper over a uniform buffer. Callers upload a whole CPU-side
//! struct and then bind the buffer; partial updates are not supported.

use std::marker::PhantomData;

use bytemuck::Pod;

/// A GPU uniform buffer holding exactly one `T`.
///
/// The buffer is sized at creation and refilled wholesale with
/// [`update`](ConstantBuffer::update). `T` must be `Pod` so the raw bytes can
/// be uploaded directly.
pub struct ConstantBuffer<T: Pod> {
    buffer: wgpu::Buffer,
    _marker: PhantomData<T>,
}

impl<T: Pod> ConstantBuffer<T> {
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: size_of::<T>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            _marker: PhantomData,
        }
    }

    /// Replaces the buffer contents with `data`.
    pub fn update(&self, queue: &wgpu::Queue, data: &T) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(data));
    }

    /// The binding resource for bind group creation.
    #[must_use]
    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }

    #[inline]
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
