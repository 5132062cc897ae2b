//! Sprite Pass
//!
//! 2D overlay drawn once per frame after every camera has composited, over
//! the maximal back-buffer viewport. Sprites are instanced quads in pixel
//! coordinates, alpha blended in ascending layer order.

use bytemuck::{Pod, Zeroable};

use crate::scene::Sprite;

use super::{FrameBindings, shader_source};

/// Maximum sprites drawable per frame.
pub const MAX_SPRITES: usize = 1024;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SpriteInstance {
    position: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
    layer: f32,
}

impl SpriteInstance {
    const fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x2,
            1 => Float32x2,
            2 => Float32x4,
            3 => Float32,
        ];
        wgpu::VertexBufferLayout {
            array_stride: size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

pub struct SpritePass {
    pipeline: wgpu::RenderPipeline,
    instances: wgpu::Buffer,
    count: u32,
}

impl SpritePass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Instances"),
            size: (MAX_SPRITES * size_of::<SpriteInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("sprite.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&frame.layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[SpriteInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });
        Self {
            pipeline,
            instances,
            count: 0,
        }
    }

    /// Uploads the frame's sprites in ascending layer order. Sprites beyond
    /// [`MAX_SPRITES`] are dropped with a warning.
    pub fn prepare(&mut self, queue: &wgpu::Queue, sprites: &[Sprite]) {
        if sprites.len() > MAX_SPRITES {
            log::warn!(
                "sprite count {} exceeds capacity {MAX_SPRITES}; extra sprites skipped",
                sprites.len()
            );
        }
        let mut ordered: Vec<&Sprite> = sprites.iter().collect();
        ordered.sort_by(|a, b| a.layer.total_cmp(&b.layer));
        let staging: Vec<SpriteInstance> = ordered
            .iter()
            .take(MAX_SPRITES)
            .map(|sprite| SpriteInstance {
                position: sprite.position.to_array(),
                size: sprite.size.to_array(),
                color: sprite.color.to_array(),
                layer: sprite.layer,
            })
            .collect();
        self.count = staging.len() as u32;
        if !staging.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(&staging));
        }
    }

    /// Draws the uploaded sprites over the whole back buffer.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        back_buffer_view: &wgpu::TextureView,
        frame: &FrameBindings,
    ) {
        if self.count == 0 {
            return;
        }
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sprite Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: back_buffer_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);
        frame.bind(&mut pass);
        pass.set_vertex_buffer(0, self.instances.slice(..));
        pass.draw(0..4, 0..self.count);
    }
}
