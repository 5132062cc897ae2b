//! Sky Pass
//!
//! Full-screen gradient sky drawn at the far plane between the opaque and
//! transparent forward sub-passes. Runs against the forward targets; the
//! normal target's writes are masked off so only the HDR channel changes.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

use crate::renderer::core::ConstantBuffer;
use crate::renderer::output::layout::{DEPTH_FORMAT, HDR_FORMAT, NORMAL_FORMAT};
use crate::scene::camera::Sky;
use crate::scene::Viewport;

use super::{FrameBindings, shader_source};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SkyUniforms {
    zenith_color: Vec4,
    /// Intensity in w.
    horizon_color: Vec4,
}

pub struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    uniforms: ConstantBuffer<SkyUniforms>,
    bind_group: wgpu::BindGroup,
}

impl SkyPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, frame: &FrameBindings, sample_count: u32) -> Self {
        let uniforms = ConstantBuffer::new(device, "Sky Constants");
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sky BindGroup Layout"),
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
            label: Some("Sky BindGroup"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.binding(),
            }],
        });
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sky Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("sky.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sky Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sky Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[
                    Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                    // Present for attachment compatibility, never written.
                    Some(wgpu::ColorTargetState {
                        format: NORMAL_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::empty(),
                    }),
                ],
            }),
            primitive: wgpu::PrimitiveState::default(),
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
        });
        Self {
            pipeline,
            uniforms,
            bind_group,
        }
    }

    /// Uploads the camera's sky settings for this frame.
    pub fn update(&self, queue: &wgpu::Queue, sky: &Sky) {
        self.uniforms.update(
            queue,
            &SkyUniforms {
                zenith_color: sky.zenith_color.extend(0.0),
                horizon_color: sky.horizon_color.extend(sky.intensity),
            },
        );
    }

    /// Draws the sky behind all shaded geometry.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        hdr_view: &wgpu::TextureView,
        normal_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        viewport: Viewport,
        frame: &FrameBindings,
    ) {
        let attachment = |view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sky Pass"),
            color_attachments: &[attachment(hdr_view), attachment(normal_view)],
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
        pass.set_pipeline(&self.pipeline);
        frame.bind(&mut pass);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
