//! G-Buffer Pass
//!
//! Rasterizes opaque geometry into the three G-buffer channels (base color,
//! material, normal) plus depth. Transparent models are excluded; they render
//! in the forward transparent sub-pass after deferred shading.

use crate::renderer::mesh::MeshCache;
use crate::renderer::output::layout::{
    BASE_COLOR_FORMAT, DEPTH_FORMAT, MATERIAL_FORMAT, NORMAL_FORMAT,
};
use crate::scene::{Model, Vertex, Viewport};

use super::{FrameBindings, ModelUniformArray, shader_source};

pub struct GBufferPass {
    pipeline: wgpu::RenderPipeline,
}

impl GBufferPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        sample_count: u32,
    ) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("GBuffer Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("gbuffer.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("GBuffer Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &models.layout],
            immediate_size: 0,
        });
        let target = |format| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("GBuffer Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[
                    target(BASE_COLOR_FORMAT),
                    target(MATERIAL_FORMAT),
                    target(NORMAL_FORMAT),
                ],
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        });
        Self { pipeline }
    }

    /// Packs opaque geometry into the G-buffer.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_views: [&wgpu::TextureView; 3],
        depth_view: &wgpu::TextureView,
        clear: bool,
        viewport: Viewport,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        meshes: &MeshCache,
        scene_models: &[Model],
    ) {
        let color_load = if clear {
            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if clear {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };
        let attachment = |view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GBuffer Pass"),
            color_attachments: &[
                attachment(color_views[0]),
                attachment(color_views[1]),
                attachment(color_views[2]),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        viewport.bind(&mut pass);
        pass.set_pipeline(&self.pipeline);
        frame.bind(&mut pass);
        for (i, model) in scene_models.iter().enumerate().take(models.len()) {
            if model.material.transparent {
                continue;
            }
            if let Some(mesh) = meshes.get(&model.mesh) {
                models.bind(&mut pass, i);
                mesh.draw(&mut pass);
            }
        }
    }
}
