//! Render Passes
//!
//! One module per GPU pass. Each pass owns its pipelines and bind group
//! layouts, created eagerly at construction; per frame it only rebuilds bind
//! groups whose inputs changed and issues its draws/dispatches. Rebinding
//! fixed state twice in a row is always safe.
//!
//! Shared plumbing lives here: the group-0 frame bindings every shading pass
//! consumes, and the dynamic-offset model uniform array the geometry passes
//! index per draw.

pub mod aa;
pub mod back_buffer;
pub mod component;
pub mod deferred;
pub mod depth;
pub mod dof;
pub mod forward;
pub mod gbuffer;
pub mod lbuffer;
pub mod overlay;
pub mod sky;
pub mod sprite;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::renderer::core::{CameraUniforms, ConstantBuffer, FrameUniforms};
use crate::scene::{Material, Model};

use lbuffer::LightUniforms;

/// Per-draw constants for one model.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniforms {
    pub world: Mat4,
    pub base_color: Vec4,
    /// roughness, metallic, zw unused.
    pub material: Vec4,
    pub emissive: Vec4,
}

impl ModelUniforms {
    #[must_use]
    pub fn new(model: &Model) -> Self {
        let m: &Material = &model.material;
        Self {
            world: Mat4::from(model.transform),
            base_color: m.base_color,
            material: Vec4::new(m.roughness, m.metallic, 0.0, 0.0),
            emissive: m.emissive.extend(0.0),
        }
    }
}

/// Group 0 for every shading pass: frame constants, camera constants, and
/// the light buffer.
pub struct FrameBindings {
    pub frame: ConstantBuffer<FrameUniforms>,
    pub camera: ConstantBuffer<CameraUniforms>,
    pub lights: ConstantBuffer<LightUniforms>,
    pub layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = ConstantBuffer::new(device, "Frame Constants");
        let camera = ConstantBuffer::new(device, "Camera Constants");
        let lights = ConstantBuffer::new(device, "Light Constants");

        let uniform = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT.union(wgpu::ShaderStages::COMPUTE),
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame BindGroup Layout"),
            entries: &[uniform(0), uniform(1), uniform(2)],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame BindGroup"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: frame.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: camera.binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: lights.binding(),
                },
            ],
        });

        Self {
            frame,
            camera,
            lights,
            layout,
            bind_group,
        }
    }

    /// Binds group 0 on a render pass.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
    }

    /// Binds group 0 on a compute pass.
    pub fn bind_compute(&self, pass: &mut wgpu::ComputePass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

/// Maximum models uploadable per frame.
pub const MAX_MODELS: usize = 1024;
/// Uniform offset alignment required by the dynamic-offset bind group.
const MODEL_STRIDE: u64 = 256;

/// Dynamic-offset uniform array holding one [`ModelUniforms`] per draw.
///
/// All model constants for a frame are written up front; each draw then binds
/// group 1 at its own offset instead of rewriting a shared buffer mid-frame.
pub struct ModelUniformArray {
    buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    count: usize,
}

impl ModelUniformArray {
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Constants"),
            size: MODEL_STRIDE * MAX_MODELS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<ModelUniforms>() as u64),
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model BindGroup"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<ModelUniforms>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            layout,
            bind_group,
            count: 0,
        }
    }

    /// Uploads the constants for every model, in scene order. Models beyond
    /// [`MAX_MODELS`] are dropped with a warning.
    pub fn upload(&mut self, queue: &wgpu::Queue, models: &[Model]) {
        if models.len() > MAX_MODELS {
            log::warn!(
                "model count {} exceeds capacity {MAX_MODELS}; extra models skipped",
                models.len()
            );
        }
        self.count = models.len().min(MAX_MODELS);
        let mut staging = vec![0u8; self.count * MODEL_STRIDE as usize];
        for (i, model) in models[..self.count].iter().enumerate() {
            let uniforms = ModelUniforms::new(model);
            let offset = i * MODEL_STRIDE as usize;
            staging[offset..offset + size_of::<ModelUniforms>()]
                .copy_from_slice(bytemuck::bytes_of(&uniforms));
        }
        if !staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, &staging);
        }
    }

    /// Number of uploaded models this frame.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Binds group 1 at model index `i`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, i: usize) {
        let offset = (i as u64 * MODEL_STRIDE) as u32;
        pass.set_bind_group(1, &self.bind_group, &[offset]);
    }
}

/// Builds a pass shader module with the shared frame bindings prepended.
macro_rules! shader_source {
    ($file:literal) => {
        concat!(
            include_str!("../shaders/common.wgsl"),
            include_str!(concat!("../shaders/", $file))
        )
    };
}
pub(crate) use shader_source;

/// Workgroup grid covering `width x height` at the 8x8 dispatch size.
#[must_use]
pub(crate) fn dispatch_extent(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(8), height.div_ceil(8))
}

/// Opens a compute pass, binds the frame group and the pass bind group, and
/// dispatches over `extent`.
pub(crate) fn dispatch_entry(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::ComputePipeline,
    bind_group: &wgpu::BindGroup,
    frame: &FrameBindings,
    extent: (u32, u32),
) {
    let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some(label),
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    frame.bind_compute(&mut pass);
    pass.set_bind_group(1, bind_group, &[]);
    pass.dispatch_workgroups(extent.0, extent.1, 1);
}

impl ModelUniformArray {
    /// Uploads pre-built uniform entries, for passes that synthesize their
    /// own transforms (overlays) instead of mirroring the scene's models.
    pub fn upload_raw(&mut self, queue: &wgpu::Queue, entries: &[ModelUniforms]) {
        if entries.len() > MAX_MODELS {
            log::warn!(
                "uniform entry count {} exceeds capacity {MAX_MODELS}; extra entries skipped",
                entries.len()
            );
        }
        self.count = entries.len().min(MAX_MODELS);
        let mut staging = vec![0u8; self.count * MODEL_STRIDE as usize];
        for (i, uniforms) in entries[..self.count].iter().enumerate() {
            let offset = i * MODEL_STRIDE as usize;
            staging[offset..offset + size_of::<ModelUniforms>()]
                .copy_from_slice(bytemuck::bytes_of(uniforms));
        }
        if !staging.is_empty() {
            queue.write_buffer(&self.buffer, 0, &staging);
        }
    }
}
