//! Depth-of-Field Pass
//!
//! Gather blur over the ping-pong pair, with a per-pixel circle of confusion
//! from the camera's thin-lens parameters and the resolved depth surface.
//! Only dispatched for cameras whose lens has a finite aperture.

use crate::renderer::output::{OutputManager, SurfaceId};

use super::{FrameBindings, dispatch_entry, dispatch_extent, shader_source};

pub struct DofPass {
    pipeline: wgpu::ComputePipeline,
    /// Indexed by ping-pong source: [hdr0 to hdr1, hdr1 to hdr0].
    bind_groups: [wgpu::BindGroup; 2],
    extent: (u32, u32),
}

impl DofPass {
    #[must_use]
    pub fn new(device: &wgpu::Device, frame: &FrameBindings, output: &OutputManager) -> Self {
        let texture = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("DOF BindGroup Layout"),
            entries: &[
                texture(0),
                texture(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba16Float,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pair = |label, source: SurfaceId, target: SurfaceId| {
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
                        resource: wgpu::BindingResource::TextureView(
                            output.view(SurfaceId::PostProcessDepth),
                        ),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(output.view(target)),
                    },
                ],
            })
        };
        let bind_groups = [
            pair(
                "DOF BindGroup 0to1",
                SurfaceId::PostProcessHdr0,
                SurfaceId::PostProcessHdr1,
            ),
            pair(
                "DOF BindGroup 1to0",
                SurfaceId::PostProcessHdr1,
                SurfaceId::PostProcessHdr0,
            ),
        ];

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("DOF Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source!("dof.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("DOF Pipeline Layout"),
            bind_group_layouts: &[&frame.layout, &layout],
            immediate_size: 0,
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("DOF Pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let desc = output.layout().desc(SurfaceId::PostProcessHdr1);
        Self {
            pipeline,
            bind_groups,
            extent: dispatch_extent(desc.width, desc.height),
        }
    }

    /// Blurs `source` into the opposite ping-pong surface, where `source` is
    /// the flag's value at call time.
    pub fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameBindings,
        source: SurfaceId,
    ) {
        let bind_group = if source == SurfaceId::PostProcessHdr0 {
            &self.bind_groups[0]
        } else {
            &self.bind_groups[1]
        };
        dispatch_entry(
            encoder,
            "DOF Dispatch",
            &self.pipeline,
            bind_group,
            frame,
            self.extent,
        );
    }
}
