//! GPU Mesh Upload
//!
//! Vertex/index buffer upload for [`StaticMesh`] data, plus a keyed cache so
//! every pass drawing the same mesh shares one upload. Meshes are keyed by
//! the shared allocation's address; a mesh survives in the cache as long as
//! it keeps being drawn.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::renderer::core::ResourceCache;
use crate::scene::{Model, StaticMesh};

/// Uploaded vertex and index buffers for one mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub start_index: u32,
    pub index_count: u32,
}

impl GpuMesh {
    #[must_use]
    pub fn new(device: &wgpu::Device, mesh: &StaticMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            start_index: mesh.start_index,
            index_count: mesh.index_count,
        }
    }

    /// Binds the buffers and issues the indexed draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(self.start_index..self.start_index + self.index_count, 0, 0..1);
    }
}

/// Shared-mesh upload cache keyed by allocation identity.
#[derive(Default)]
pub struct MeshCache {
    cache: ResourceCache<usize, GpuMesh>,
}

impl MeshCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads every mesh the frame will draw. Called once per frame before
    /// any pass opens, so lookups during passes can borrow the cache shared.
    pub fn prepare(&mut self, device: &wgpu::Device, models: &[Model]) {
        for model in models {
            let key = Arc::as_ptr(&model.mesh) as usize;
            self.cache
                .get_or_create(key, || GpuMesh::new(device, &model.mesh));
        }
    }

    /// The uploaded buffers for `mesh`. Present for any mesh passed to
    /// [`prepare`](Self::prepare) this frame.
    #[must_use]
    pub fn get(&self, mesh: &Arc<StaticMesh>) -> Option<&GpuMesh> {
        self.cache.peek(&(Arc::as_ptr(mesh) as usize))
    }

    /// Frame-boundary maintenance: ages entries and drops meshes unseen for
    /// `max_idle_frames`.
    pub fn end_frame(&mut self, max_idle_frames: u64) {
        self.cache.tick();
        self.cache.prune(max_idle_frames);
    }
}
