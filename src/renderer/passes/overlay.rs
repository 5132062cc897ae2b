//! Overlay Passes
//!
//! Optional wireframe and bounding-volume overlays drawn after the primary
//! pipeline, in that order. Both are flat-color line renderings into the HDR
//! surface with depth testing left on and depth writes off.

use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::renderer::mesh::MeshCache;
use crate::renderer::output::layout::{DEPTH_FORMAT, HDR_FORMAT};
use crate::scene::{Model, Vertex, Viewport};

use super::{FrameBindings, ModelUniforms, ModelUniformArray, shader_source};

const WIREFRAME_COLOR: Vec4 = Vec4::new(0.0, 0.35, 1.0, 1.0);
const AABB_COLOR: Vec4 = Vec4::new(1.0, 0.85, 0.0, 1.0);

/// Unit cube edges centered at the origin, as a line list.
const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];
const CUBE_EDGES: [u32; 24] = [
    0, 1, 1, 2, 2, 3, 3, 0, // bottom face
    4, 5, 5, 6, 6, 7, 7, 4, // top face
    0, 4, 1, 5, 2, 6, 3, 7, // verticals
];

pub struct OverlayPass {
    wireframe_pipeline: wgpu::RenderPipeline,
    aabb_pipeline: wgpu::RenderPipeline,
    cube_vertices: wgpu::Buffer,
    cube_indices: wgpu::Buffer,
    uniforms: ModelUniformArray,
}

impl OverlayPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, frame: &FrameBindings, sample_count: u32) -> Self {
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("overlay.wgsl").into()),
        });
        let uniforms = ModelUniformArray::new(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &uniforms.layout],
            immediate_size: 0,
        });

        let build = |label: &str, primitive: wgpu::PrimitiveState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
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
                    targets: &[Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: false,
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

        // Line rasterization of the triangle meshes themselves.
        let wireframe_pipeline = build(
            "Wireframe Pipeline",
            wgpu::PrimitiveState {
                polygon_mode: wgpu::PolygonMode::Line,
                ..Default::default()
            },
        );
        let aabb_pipeline = build(
            "AABB Pipeline",
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
        );

        let cube: Vec<Vertex> = CUBE_CORNERS
            .iter()
            .map(|&position| Vertex {
                position,
                normal: [0.0; 3],
                uv: [0.0; 2],
            })
            .collect();
        let cube_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("AABB Cube Vertices"),
            contents: bytemuck::cast_slice(&cube),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("AABB Cube Indices"),
            contents: bytemuck::cast_slice(&CUBE_EDGES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            wireframe_pipeline,
            aabb_pipeline,
            cube_vertices,
            cube_indices,
            uniforms,
        }
    }

    /// Uploads the overlay transforms: one wireframe entry per model followed
    /// by one box entry per model.
    pub fn prepare(&mut self, queue: &wgpu::Queue, scene_models: &[Model]) {
        let mut entries = Vec::with_capacity(scene_models.len() * 2);
        for model in scene_models {
            entries.push(ModelUniforms {
                world: Mat4::from(model.transform),
                base_color: WIREFRAME_COLOR,
                material: Vec4::ZERO,
                emissive: Vec4::ZERO,
            });
        }
        for model in scene_models {
            let aabb = &model.mesh.aabb;
            let center = (aabb.min + aabb.max) * 0.5;
            let extent = aabb.max - aabb.min;
            entries.push(ModelUniforms {
                world: Mat4::from(model.transform)
                    * Mat4::from_translation(center)
                    * Mat4::from_scale(extent),
                base_color: AABB_COLOR,
                material: Vec4::ZERO,
                emissive: Vec4::ZERO,
            });
        }
        self.uniforms.upload_raw(queue, &entries);
    }

    /// Draws the wireframe overlay over every model.
    pub fn render_wireframe(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        hdr_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        viewport: Viewport,
        frame: &FrameBindings,
        meshes: &MeshCache,
        scene_models: &[Model],
    ) {
        let mut pass = self.open(encoder, hdr_view, depth_view, viewport);
        pass.set_pipeline(&self.wireframe_pipeline);
        frame.bind(&mut pass);
        for (i, model) in scene_models.iter().enumerate() {
            if i >= self.uniforms.len() {
                break;
            }
            if let Some(mesh) = meshes.get(&model.mesh) {
                self.uniforms.bind(&mut pass, i);
                mesh.draw(&mut pass);
            }
        }
    }

    /// Draws the bounding-box overlay over every model.
    pub fn render_aabb(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        hdr_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        viewport: Viewport,
        frame: &FrameBindings,
        scene_models: &[Model],
    ) {
        let mut pass = self.open(encoder, hdr_view, depth_view, viewport);
        pass.set_pipeline(&self.aabb_pipeline);
        frame.bind(&mut pass);
        pass.set_vertex_buffer(0, self.cube_vertices.slice(..));
        pass.set_index_buffer(self.cube_indices.slice(..), wgpu::IndexFormat::Uint32);
        let boxes_start = scene_models.len();
        for i in 0..scene_models.len() {
            let entry = boxes_start + i;
            if entry >= self.uniforms.len() {
                break;
            }
            self.uniforms.bind(&mut pass, entry);
            pass.draw_indexed(0..CUBE_EDGES.len() as u32, 0, 0..1);
        }
    }

    fn open<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        hdr_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        viewport: Viewport,
    ) -> wgpu::RenderPass<'e> {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: hdr_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
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
        pass
    }
}
