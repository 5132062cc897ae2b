//! Depth Pre-Pass
//!
//! Depth-only rasterization of opaque geometry, run before the shading
//! pipeline in the depth-and-X modes. Pure optimization: it must not change
//! what the subsequent shading pass produces, only prime the depth buffer.

use crate::renderer::mesh::MeshCache;
use crate::renderer::output::layout::DEPTH_FORMAT;
use crate::scene::{Model, Vertex, Viewport};

use super::{FrameBindings, ModelUniformArray, shader_source};

pub struct DepthPass {
    pipeline: wgpu::RenderPipeline,
}

impl DepthPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        sample_count: u32,
    ) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Depth Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("depth.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &models.layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Depth Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
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

    /// Rasterizes depth for every opaque model.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        depth_view: &wgpu::TextureView,
        clear_depth: bool,
        viewport: Viewport,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        meshes: &MeshCache,
        scene_models: &[Model],
    ) {
        let load = if clear_depth {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Depth Pre-Pass"),
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load,
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
