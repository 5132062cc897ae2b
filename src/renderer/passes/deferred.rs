//! Deferred Shading Pass
//!
//! Shades the G-buffer into the HDR surface. Two variants, chosen at
//! construction from the anti-aliasing descriptor: a full-screen compute
//! dispatch writing the HDR storage view, or (with MSAA, whose surfaces
//! cannot back storage bindings) a full-screen graphics draw targeting the
//! HDR attachment with per-sample shading.

use crate::renderer::output::layout::HDR_FORMAT;
use crate::renderer::output::{OutputManager, SurfaceId};
use crate::scene::Viewport;

use super::{FrameBindings, dispatch_extent, shader_source};

enum Variant {
    Compute {
        pipeline: wgpu::ComputePipeline,
        bind_group: wgpu::BindGroup,
        extent: (u32, u32),
    },
    Graphics {
        pipeline: wgpu::RenderPipeline,
        bind_group: wgpu::BindGroup,
    },
}

pub struct DeferredShadingPass {
    variant: Variant,
}

impl DeferredShadingPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        output: &OutputManager,
        uses_msaa: bool,
    ) -> Self {
        let variant = if uses_msaa {
            Self::graphics_variant(device, frame, output)
        } else {
            Self::compute_variant(device, frame, output)
        };
        Self { variant }
    }

    fn gbuffer_entries(multisampled: bool) -> [wgpu::BindGroupLayoutEntry; 4] {
        let texture = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT.union(wgpu::ShaderStages::COMPUTE),
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled,
            },
            count: None,
        };
        let mut entries = [texture(0), texture(1), texture(2), texture(3)];
        entries[3].ty = wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled,
        };
        entries
    }

    /// Compute variant reading the packer's channels instead of the output
    /// manager's. Used by the legacy scene renderer path; `hdr_view` must be
    /// storage capable, so this never applies under MSAA.
    #[must_use]
    pub fn for_packer(
        device: &wgpu::Device,
        frame: &FrameBindings,
        gbuffer: &crate::renderer::output::GBuffer,
        hdr_view: &wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        let variant = Self::compute_variant_for(
            device,
            frame,
            [
                gbuffer.view(SurfaceId::GBufferBaseColor),
                gbuffer.view(SurfaceId::GBufferMaterial),
                gbuffer.view(SurfaceId::GBufferNormal),
                gbuffer.view(SurfaceId::GBufferDepth),
            ],
            hdr_view,
            dispatch_extent(width, height),
        );
        Self { variant }
    }

    fn compute_variant(
        device: &wgpu::Device,
        frame: &FrameBindings,
        output: &OutputManager,
    ) -> Variant {
        let desc = output.layout().desc(SurfaceId::Hdr);
        Self::compute_variant_for(
            device,
            frame,
            [
                output.view(SurfaceId::GBufferBaseColor),
                output.view(SurfaceId::GBufferMaterial),
                output.view(SurfaceId::GBufferNormal),
                output.view(SurfaceId::GBufferDepth),
            ],
            output.view(SurfaceId::Hdr),
            dispatch_extent(desc.width, desc.height),
        )
    }

    fn compute_variant_for(
        device: &wgpu::Device,
        frame: &FrameBindings,
        gbuffer_views: [&wgpu::TextureView; 4],
        hdr_view: &wgpu::TextureView,
        extent: (u32, u32),
    ) -> Variant {
        let mut entries = Self::gbuffer_entries(false).to_vec();
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 4,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format: HDR_FORMAT,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Deferred Compute BindGroup Layout"),
            entries: &entries,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Deferred Compute BindGroup"),
            layout: &layout,
            entries: &[
                bind_view(0, gbuffer_views[0]),
                bind_view(1, gbuffer_views[1]),
                bind_view(2, gbuffer_views[2]),
                bind_view(3, gbuffer_views[3]),
                bind_view(4, hdr_view),
            ],
        });
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Deferred Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("deferred.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Deferred Compute Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &layout],
            immediate_size: 0,
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Deferred Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        });
        Variant::Compute {
            pipeline,
            bind_group,
            extent,
        }
    }

    fn graphics_variant(
        device: &wgpu::Device,
        frame: &FrameBindings,
        output: &OutputManager,
    ) -> Variant {
        let entries = Self::gbuffer_entries(true);
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Deferred Draw BindGroup Layout"),
            entries: &entries,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Deferred Draw BindGroup"),
            layout: &layout,
            entries: &[
                bind_view(0, output.view(SurfaceId::GBufferBaseColor)),
                bind_view(1, output.view(SurfaceId::GBufferMaterial)),
                bind_view(2, output.view(SurfaceId::GBufferNormal)),
                bind_view(3, output.view(SurfaceId::GBufferDepth)),
            ],
        });
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Deferred Draw Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("deferred_msaa.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Deferred Draw Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &layout],
            immediate_size: 0,
        });
        let sample_count = output.layout().desc(SurfaceId::Hdr).sample_count;
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Deferred Draw Pipeline"),
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
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview_mask: None,
            cache: None,
        });
        Variant::Graphics {
            pipeline,
            bind_group,
        }
    }

    /// Shades via compute dispatch. Valid only without MSAA.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, frame: &FrameBindings) {
        let Variant::Compute {
            pipeline,
            bind_group,
            extent,
        } = &self.variant
        else {
            log::error!("deferred compute dispatch requested on the MSAA graphics variant");
            return;
        };
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Deferred Shading Dispatch"),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        frame.bind_compute(&mut pass);
        pass.set_bind_group(1, bind_group, &[]);
        pass.dispatch_workgroups(extent.0, extent.1, 1);
    }

    /// Shades via full-screen draw into the HDR attachment. Valid only with
    /// MSAA.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        hdr_view: &wgpu::TextureView,
        viewport: Viewport,
        frame: &FrameBindings,
    ) {
        let Variant::Graphics {
            pipeline,
            bind_group,
        } = &self.variant
        else {
            log::error!("deferred graphics draw requested on the compute variant");
            return;
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Deferred Shading Draw"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: hdr_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
        viewport.bind(&mut pass);
        pass.set_pipeline(pipeline);
        frame.bind(&mut pass);
        pass.set_bind_group(1, bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn bind_view<'a>(binding: u32, view: &'a wgpu::TextureView) -> wgpu::BindGroupEntry<'a> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}
