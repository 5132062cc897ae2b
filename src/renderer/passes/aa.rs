//! Anti-Aliasing Passes
//!
//! The resolve and FXAA dispatches, specialized at construction from the
//! anti-aliasing descriptor:
//! - MSAA/SSAA: one compute dispatch collapsing the super-sampled HDR,
//!   normal, and depth surfaces into the single-sampled post-processing set.
//! - FXAA: a preprocess dispatch (radiance copy with luma in alpha) followed
//!   by the FXAA dispatch over the ping-pong pair.

use bytemuck::{Pod, Zeroable};

use crate::config::AaDescriptor;
use crate::renderer::core::ConstantBuffer;
use crate::renderer::output::layout::HDR_FORMAT;
use crate::renderer::output::{OutputManager, SurfaceId};

use super::{FrameBindings, dispatch_entry, dispatch_extent, shader_source};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ResolveUniforms {
    /// Sample count (MSAA) or resolution multiplier (SSAA).
    factor: u32,
    _padding: [u32; 3],
}

enum Variant {
    /// No AA configured; nothing to do.
    None,
    Resolve {
        pipeline: wgpu::ComputePipeline,
        bind_group: wgpu::BindGroup,
        uniforms: ConstantBuffer<ResolveUniforms>,
        factor: u32,
    },
    Fxaa {
        preprocess_pipeline: wgpu::ComputePipeline,
        preprocess_bind_group: wgpu::BindGroup,
        fxaa_pipeline: wgpu::ComputePipeline,
        /// Indexed by ping-pong source: [hdr0 to hdr1, hdr1 to hdr0].
        fxaa_bind_groups: [wgpu::BindGroup; 2],
    },
}

pub struct AaPass {
    variant: Variant,
    extent: (u32, u32),
}

impl AaPass {
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        frame: &FrameBindings,
        output: &OutputManager,
        aa: AaDescriptor,
    ) -> Self {
        let desc = output.layout().desc(SurfaceId::PostProcessHdr0);
        let extent = dispatch_extent(desc.width, desc.height);
        let variant = match aa {
            AaDescriptor::None => Variant::None,
            AaDescriptor::Fxaa => Self::fxaa_variant(device, frame, output),
            _ => Self::resolve_variant(device, frame, output, aa),
        };
        Self { variant, extent }
    }

    fn resolve_variant(
        device: &wgpu::Device,
        frame: &FrameBindings,
        output: &OutputManager,
        aa: AaDescriptor,
    ) -> Variant {
        let msaa = aa.uses_msaa();
        let factor = if msaa {
            aa.sample_count()
        } else {
            aa.resolution_multiplier()
        };
        let uniforms = ConstantBuffer::new(device, "Resolve Constants");

        let texture = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: msaa,
            },
            count: None,
        };
        let storage = |binding, format| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
            count: None,
        };
        let mut entries = vec![
            texture(0),
            texture(1),
            texture(2),
            storage(3, wgpu::TextureFormat::Rgba16Float),
            storage(4, wgpu::TextureFormat::Rgba16Float),
            storage(5, wgpu::TextureFormat::R32Float),
            wgpu::BindGroupLayoutEntry {
                binding: 6,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ];
        entries[2].ty = wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: msaa,
        };

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Resolve BindGroup Layout"),
            entries: &entries,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Resolve BindGroup"),
            layout: &layout,
            entries: &[
                view_entry(0, output.view(SurfaceId::Hdr)),
                view_entry(1, output.view(SurfaceId::GBufferNormal)),
                view_entry(2, output.view(SurfaceId::GBufferDepth)),
                view_entry(3, output.view(SurfaceId::PostProcessHdr0)),
                view_entry(4, output.view(SurfaceId::PostProcessNormal)),
                view_entry(5, output.view(SurfaceId::PostProcessDepth)),
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: uniforms.binding(),
                },
            ],
        });

        let source: &str = if msaa {
            shader_source!("resolve_msaa.wgsl")
        } else {
            shader_source!("resolve_ssaa.wgsl")
        };
        let pipeline = compute_pipeline(device, frame, &layout, "Resolve", source);
        Variant::Resolve {
            pipeline,
            bind_group,
            uniforms,
            factor,
        }
    }

    fn fxaa_variant(
        device: &wgpu::Device,
        frame: &FrameBindings,
        output: &OutputManager,
    ) -> Variant {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("FXAA BindGroup Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: HDR_FORMAT,
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
                    view_entry(0, output.view(source)),
                    view_entry(1, output.view(target)),
                ],
            })
        };

        let preprocess_bind_group = pair(
            "FXAA Preprocess BindGroup",
            SurfaceId::Hdr,
            SurfaceId::PostProcessHdr0,
        );
        let fxaa_bind_groups = [
            pair(
                "FXAA BindGroup 0to1",
                SurfaceId::PostProcessHdr0,
                SurfaceId::PostProcessHdr1,
            ),
            pair(
                "FXAA BindGroup 1to0",
                SurfaceId::PostProcessHdr1,
                SurfaceId::PostProcessHdr0,
            ),
        ];

        let preprocess_pipeline = compute_pipeline(
            device,
            frame,
            &layout,
            "FXAA Preprocess",
            shader_source!("fxaa_preprocess.wgsl"),
        );
        let fxaa_pipeline =
            compute_pipeline(device, frame, &layout, "FXAA", shader_source!("fxaa.wgsl"));

        Variant::Fxaa {
            preprocess_pipeline,
            preprocess_bind_group,
            fxaa_pipeline,
            fxaa_bind_groups,
        }
    }

    /// The luma preprocess dispatch. FXAA only; must run before
    /// [`dispatch_resolve`](Self::dispatch_resolve).
    pub fn dispatch_preprocess(&self, encoder: &mut wgpu::CommandEncoder, frame: &FrameBindings) {
        let Variant::Fxaa {
            preprocess_pipeline,
            preprocess_bind_group,
            ..
        } = &self.variant
        else {
            log::error!("FXAA preprocess requested without the FXAA descriptor");
            return;
        };
        dispatch_entry(
            encoder,
            "FXAA Preprocess Dispatch",
            preprocess_pipeline,
            preprocess_bind_group,
            frame,
            self.extent,
        );
    }

    /// The main AA dispatch. For MSAA/SSAA this is the resolve; for FXAA it
    /// is the edge-blend dispatch over the ping-pong pair, whose direction is
    /// `source` at call time.
    pub fn dispatch_resolve(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        frame: &FrameBindings,
        source: SurfaceId,
    ) {
        match &self.variant {
            Variant::None => {}
            Variant::Resolve {
                pipeline,
                bind_group,
                uniforms,
                factor,
            } => {
                uniforms.update(
                    queue,
                    &ResolveUniforms {
                        factor: *factor,
                        _padding: [0; 3],
                    },
                );
                dispatch_entry(encoder, "AA Resolve Dispatch", pipeline, bind_group, frame, self.extent);
            }
            Variant::Fxaa {
                fxaa_pipeline,
                fxaa_bind_groups,
                ..
            } => {
                let bind_group = if source == SurfaceId::PostProcessHdr0 {
                    &fxaa_bind_groups[0]
                } else {
                    &fxaa_bind_groups[1]
                };
                dispatch_entry(encoder, "FXAA Dispatch", fxaa_pipeline, bind_group, frame, self.extent);
            }
        }
    }
}

fn compute_pipeline(
    device: &wgpu::Device,
    frame: &FrameBindings,
    bind_group_layout: &wgpu::BindGroupLayout,
    label: &str,
    source: &str,
) -> wgpu::ComputePipeline {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[&frame.layout, bind_group_layout],
        immediate_size: 0,
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        module: &module,
        entry_point: Some("cs_main"),
        compilation_options: Default::default(),
        cache: None,
    })
}

fn view_entry<'a>(binding: u32, view: &'a wgpu::TextureView) -> wgpu::BindGroupEntry<'a> {
    wgpu::BindGroupEntry {
        binding,
        resource: wgpu::BindingResource::TextureView(view),
    }
}
