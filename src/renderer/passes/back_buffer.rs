//! Back-Buffer Composite Pass
//!
//! Final full-screen draw into the swap-chain surface: samples the current
//! post-processing source, tone maps the HDR radiance, and applies the
//! inverse gamma. Runs once per camera, into the camera's display viewport.

use crate::renderer::output::{OutputManager, SurfaceId};
use crate::scene::Viewport;

use super::{FrameBindings, shader_source};

pub struct BackBufferPass {
    pipeline: wgpu::RenderPipeline,
    /// Indexed by ping-pong source: [reads hdr0, reads hdr1].
    bind_groups: [wgpu::BindGroup; 2],
}

impl BackBufferPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        output: &OutputManager,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Back Buffer Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Back Buffer BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let bind = |label, source: SurfaceId| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(output.view(source)),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&sampler),
                    },
                ],
            })
        };
        let bind_groups = [
            bind("Back Buffer BindGroup 0", SurfaceId::PostProcessHdr0),
            bind("Back Buffer BindGroup 1", SurfaceId::PostProcessHdr1),
        ];

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Back Buffer Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("back_buffer.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Back Buffer Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &layout],
            immediate_size: 0,
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Back Buffer Pipeline"),
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
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_groups,
        }
    }

    /// Composites `source` into the back buffer over the camera's display
    /// viewport. `clear` is set for the first camera of the frame.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        back_buffer_view: &wgpu::TextureView,
        clear: Option<wgpu::Color>,
        viewport: Viewport,
        frame: &FrameBindings,
        source: SurfaceId,
    ) {
        let load = match clear {
            Some(color) => wgpu::LoadOp::Clear(color),
            None => wgpu::LoadOp::Load,
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Back Buffer Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: back_buffer_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        viewport.bind(&mut pass);
        pass.set_pipeline(&self.pipeline);
        frame.bind(&mut pass);
        let bind_group = if source == SurfaceId::PostProcessHdr0 {
            &self.bind_groups[0]
        } else {
            &self.bind_groups[1]
        };
        pass.set_bind_group(1, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}
