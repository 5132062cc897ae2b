//! Forward Shading Passes
//!
//! The variable (PBR) forward pipeline with its opaque, emissive, and
//! transparent sub-passes, plus the constant (non-PBR) solid pipeline. All
//! four share the forward color targets: HDR plus the G-buffer normal
//! channel, with the shared depth buffer.

use crate::renderer::mesh::MeshCache;
use crate::renderer::output::layout::{DEPTH_FORMAT, HDR_FORMAT, NORMAL_FORMAT};
use crate::scene::{Model, Vertex, Viewport};

use super::{FrameBindings, ModelUniformArray, shader_source};

/// Which models a sub-pass draws and how its pipeline blends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardSubPass {
    /// Opaque, depth-writing PBR shading.
    Opaque,
    /// Emissive surfaces layered over the deferred result.
    Emissive,
    /// Alpha-blended, drawn last with depth writes off.
    Transparent,
    /// Constant shading; draws everything opaque.
    Solid,
}

pub struct ForwardPass {
    opaque: wgpu::RenderPipeline,
    emissive: wgpu::RenderPipeline,
    transparent: wgpu::RenderPipeline,
    solid: wgpu::RenderPipeline,
}

impl ForwardPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        sample_count: u32,
    ) -> Self {
        let forward_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Forward Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("forward.wgsl").into()),
        });
        let solid_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Solid Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("solid.wgsl").into()),
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Forward Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &models.layout],
            immediate_size: 0,
        });

        let build = |label: &str,
                     module: &wgpu::ShaderModule,
                     entry: &str,
                     blend: Option<wgpu::BlendState>,
                     depth_write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some(entry),
                    compilation_options: Default::default(),
                    targets: &[
                        Some(wgpu::ColorTargetState {
                            format: HDR_FORMAT,
                            blend,
                            write_mask: wgpu::ColorWrites::ALL,
                        }),
                        Some(wgpu::ColorTargetState {
                            format: NORMAL_FORMAT,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        }),
                    ],
                }),
                primitive: wgpu::PrimitiveState {
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
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
            })
        };

        Self {
            opaque: build("Forward Opaque Pipeline", &forward_module, "fs_main", None, true),
            emissive: build(
                "Forward Emissive Pipeline",
                &forward_module,
                "fs_emissive",
                None,
                true,
            ),
            transparent: build(
                "Forward Transparent Pipeline",
                &forward_module,
                "fs_main",
                Some(wgpu::BlendState::ALPHA_BLENDING),
                false,
            ),
            solid: build("Solid Pipeline", &solid_module, "fs_main", None, true),
        }
    }

    fn selects(sub_pass: ForwardSubPass, model: &Model) -> bool {
        match sub_pass {
            ForwardSubPass::Opaque | ForwardSubPass::Solid => !model.material.transparent,
            ForwardSubPass::Emissive => {
                !model.material.transparent && model.material.is_emissive()
            }
            ForwardSubPass::Transparent => model.material.transparent,
        }
    }

    /// Draws one forward sub-pass over the models it selects.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        sub_pass: ForwardSubPass,
        hdr_view: &wgpu::TextureView,
        normal_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        clear_hdr: bool,
        viewport: Viewport,
        frame: &FrameBindings,
        models: &ModelUniformArray,
        meshes: &MeshCache,
        scene_models: &[Model],
    ) {
        let pipeline = match sub_pass {
            ForwardSubPass::Opaque => &self.opaque,
            ForwardSubPass::Emissive => &self.emissive,
            ForwardSubPass::Transparent => &self.transparent,
            ForwardSubPass::Solid => &self.solid,
        };
        let hdr_load = if clear_hdr {
            wgpu::LoadOp::Clear(wgpu::Color::BLACK)
        } else {
            wgpu::LoadOp::Load
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Forward Pass"),
            color_attachments: &[
                Some(wgpu::RenderPassColorAttachment {
                    view: hdr_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: hdr_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
                Some(wgpu::RenderPassColorAttachment {
                    view: normal_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                }),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        viewport.bind(&mut pass);
        pass.set_pipeline(pipeline);
        frame.bind(&mut pass);
        for (i, model) in scene_models.iter().enumerate().take(models.len()) {
            if !Self::selects(sub_pass, model) {
                continue;
            }
            if let Some(mesh) = meshes.get(&model.mesh) {
                models.bind(&mut pass, i);
                mesh.draw(&mut pass);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, StaticMesh};
    use glam::Vec3;
    use std::sync::Arc;

    fn model_with(material: Material) -> Model {
        Model {
            material,
            ..Model::new(Arc::new(StaticMesh::cube()))
        }
    }

    #[test]
    fn sub_passes_partition_models() {
        let opaque = model_with(Material::default());
        let emissive = model_with(Material {
            emissive: Vec3::ONE,
            ..Material::default()
        });
        let transparent = model_with(Material {
            transparent: true,
            ..Material::default()
        });

        assert!(ForwardPass::selects(ForwardSubPass::Opaque, &opaque));
        assert!(!ForwardPass::selects(ForwardSubPass::Opaque, &transparent));
        assert!(ForwardPass::selects(ForwardSubPass::Emissive, &emissive));
        assert!(!ForwardPass::selects(ForwardSubPass::Emissive, &opaque));
        assert!(ForwardPass::selects(ForwardSubPass::Transparent, &transparent));
        assert!(ForwardPass::selects(ForwardSubPass::Solid, &emissive));
    }
}
