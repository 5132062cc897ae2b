//! Component Visualization Pass
//!
//! Debug rendering of exactly one surface channel (base color, material,
//! distance, shading normal, ...) with no lighting step. The channel is
//! selected per frame through a small uniform.

use bytemuck::{Pod, Zeroable};

use crate::renderer::core::ConstantBuffer;
use crate::renderer::mesh::MeshCache;
use crate::renderer::output::layout::{DEPTH_FORMAT, HDR_FORMAT};
use crate::scene::camera::ComponentView;
use crate::scene::{Model, Vertex, Viewport};

use super::{FrameBindings, ModelUniformArray, shader_source};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ComponentUniforms {
    mode: u32,
    _padding: [u32; 3],
}

const fn mode_index(view: ComponentView) -> u32 {
    match view {
        ComponentView::BaseColor => 0,
        ComponentView::Material => 1,
        ComponentView::NormalTexture => 2,
        ComponentView::UvTexture => 3,
        ComponentView::Distance => 4,
        ComponentView::ShadingNormal => 5,
        ComponentView::TsnmShadingNormal => 6,
    }
}

pub struct ComponentPass {
    pipeline: wgpu::RenderPipeline,
    uniforms: ConstantBuffer<ComponentUniforms>,
    bind_group: wgpu::BindGroup,
}

impl ComponentPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        sample_count: u32,
    ) -> Self {
        let uniforms = ConstantBuffer::new(device, "Component Constants");
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Component BindGroup Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Component BindGroup"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding(),
            }],
        });
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Component Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("component.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Component Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &models.layout, &layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Component Pipeline"),
            layout: Some(&pipeline_layout),
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
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
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
        Self {
            pipeline,
            uniforms,
            bind_group,
        }
    }

    /// Selects the channel to visualize.
    pub fn update(&self, queue: &wgpu::Queue, view: ComponentView) {
        self.uniforms.update(
            queue,
            &ComponentUniforms {
                mode: mode_index(view),
                _padding: [0; 3],
            },
        );
    }

    /// Draws all models with the selected channel as flat output.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        hdr_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        clear: bool,
        viewport: Viewport,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        meshes: &MeshCache,
        scene_models: &[Model],
    ) {
        let color_load = if clear {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if clear {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Component Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: hdr_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
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
        pass.set_bind_group(2, &self.bind_group, &[]);
        for (i, model) in scene_models.iter().enumerate().take(models.len()) {
            if let Some(mesh) = meshes.get(&model.mesh) {
                models.bind(&mut pass, i);
                mesh.draw(&mut pass);
            }
        }
    }
}
