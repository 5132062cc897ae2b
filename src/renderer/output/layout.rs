//! Frame Surface Layout
//!
//! Pure description of every intermediate surface a frame needs: dimensions,
//! sample count, format, and aliasing. The layout is derived once from the
//! display configuration and drives allocation in the output manager; keeping
//! it free of GPU handles makes the sizing and aliasing rules unit testable.
//!
//! Sizing rules per anti-aliasing descriptor:
//!
//! | AA        | dimensions      | samples |
//! |-----------|-----------------|---------|
//! | None/FXAA | display         | 1       |
//! | MSAA_Nx   | display         | N       |
//! | SSAA_Nx   | display times N | 1       |
//!
//! Aliasing rules (no redundant allocations):
//! - AA = None: `PostProcessHdr0` aliases `Hdr` (the shaded image already sits
//!   at display resolution, so the first post-processing source is free).
//! - AA in {None, FXAA}: `PostProcessDepth`/`PostProcessNormal` alias
//!   `GBufferDepth`/`GBufferNormal` (no resolve step rewrites them).

use crate::config::DisplayConfig;

pub const BASE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
pub const MATERIAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg11b10Ufloat;
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Single-sampled depth copy written by the resolve dispatch.
pub const RESOLVED_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;
/// Single-sampled normal copy written by the resolve dispatch. RG11B10 is not
/// a writable storage format, so the resolved copy widens to RGBA16F.
pub const RESOLVED_NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Logical identity of an intermediate frame surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    GBufferBaseColor,
    GBufferMaterial,
    GBufferNormal,
    GBufferDepth,
    /// Shaded scene radiance before post-processing.
    Hdr,
    /// Post-processing ping-pong pair, display resolution.
    PostProcessHdr0,
    PostProcessHdr1,
    /// Single-sampled depth/normal inputs for post-processing.
    PostProcessDepth,
    PostProcessNormal,
}

impl SurfaceId {
    pub const ALL: [Self; 9] = [
        Self::GBufferBaseColor,
        Self::GBufferMaterial,
        Self::GBufferNormal,
        Self::GBufferDepth,
        Self::Hdr,
        Self::PostProcessHdr0,
        Self::PostProcessHdr1,
        Self::PostProcessDepth,
        Self::PostProcessNormal,
    ];

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::GBufferBaseColor => "GBuffer Base Color",
            Self::GBufferMaterial => "GBuffer Material",
            Self::GBufferNormal => "GBuffer Normal",
            Self::GBufferDepth => "GBuffer Depth",
            Self::Hdr => "HDR",
            Self::PostProcessHdr0 => "Post Process HDR 0",
            Self::PostProcessHdr1 => "Post Process HDR 1",
            Self::PostProcessDepth => "Post Process Depth",
            Self::PostProcessNormal => "Post Process Normal",
        }
    }
}

/// Allocation parameters for one concrete surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub format: wgpu::TextureFormat,
    /// Whether a compute pass writes this surface through a storage binding.
    pub compute_writable: bool,
}

impl SurfaceDesc {
    #[must_use]
    pub fn usage(&self) -> wgpu::TextureUsages {
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;
        if self.compute_writable {
            usage |= wgpu::TextureUsages::STORAGE_BINDING;
        }
        usage
    }
}

/// One entry of the layout: its own allocation or another surface's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceSlot {
    Concrete(SurfaceDesc),
    Alias(SurfaceId),
}

/// The complete surface layout for one display configuration.
///
/// Immutable for its lifetime; a display configuration change requires
/// rebuilding the layout and reallocating every surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    slots: [SurfaceSlot; SurfaceId::ALL.len()],
}

impl FrameLayout {
    #[must_use]
    pub fn new(display: &DisplayConfig) -> Self {
        let aa = display.aa;
        let (w, h) = (display.width, display.height);
        let (ssw, ssh) = (display.ss_width(), display.ss_height());
        let samples = aa.sample_count();

        let ss_target = |format| {
            SurfaceSlot::Concrete(SurfaceDesc {
                width: ssw,
                height: ssh,
                sample_count: samples,
                format,
                compute_writable: false,
            })
        };
        let display_storage = |format| {
            SurfaceSlot::Concrete(SurfaceDesc {
                width: w,
                height: h,
                sample_count: 1,
                format,
                compute_writable: true,
            })
        };

        // MSAA surfaces cannot back a storage binding, so the deferred pass
        // shades them with a graphics draw instead of a compute dispatch.
        let hdr = SurfaceSlot::Concrete(SurfaceDesc {
            width: ssw,
            height: ssh,
            sample_count: samples,
            format: HDR_FORMAT,
            compute_writable: !aa.uses_msaa(),
        });

        let post_hdr0 = if aa.uses_aa() {
            display_storage(HDR_FORMAT)
        } else {
            SurfaceSlot::Alias(SurfaceId::Hdr)
        };

        let needs_resolve = aa.requires_resolve();
        let post_depth = if needs_resolve {
            display_storage(RESOLVED_DEPTH_FORMAT)
        } else {
            SurfaceSlot::Alias(SurfaceId::GBufferDepth)
        };
        let post_normal = if needs_resolve {
            display_storage(RESOLVED_NORMAL_FORMAT)
        } else {
            SurfaceSlot::Alias(SurfaceId::GBufferNormal)
        };

        Self {
            slots: [
                ss_target(BASE_COLOR_FORMAT),
                ss_target(MATERIAL_FORMAT),
                ss_target(NORMAL_FORMAT),
                ss_target(DEPTH_FORMAT),
                hdr,
                post_hdr0,
                display_storage(HDR_FORMAT),
                post_depth,
                post_normal,
            ],
        }
    }

    #[inline]
    #[must_use]
    pub fn slot(&self, id: SurfaceId) -> SurfaceSlot {
        self.slots[id.index()]
    }

    /// Follows aliases to the surface that owns the allocation.
    #[must_use]
    pub fn resolve(&self, id: SurfaceId) -> SurfaceId {
        match self.slot(id) {
            SurfaceSlot::Concrete(_) => id,
            SurfaceSlot::Alias(target) => self.resolve(target),
        }
    }

    /// The allocation parameters of `id`, following aliases.
    #[must_use]
    pub fn desc(&self, id: SurfaceId) -> SurfaceDesc {
        match self.slot(id) {
            SurfaceSlot::Concrete(desc) => desc,
            SurfaceSlot::Alias(target) => self.desc(target),
        }
    }

    #[must_use]
    pub fn is_alias(&self, id: SurfaceId) -> bool {
        matches!(self.slot(id), SurfaceSlot::Alias(_))
    }

    /// Surfaces owning an allocation, in declaration order.
    pub fn concrete_surfaces(&self) -> impl Iterator<Item = (SurfaceId, SurfaceDesc)> + '_ {
        SurfaceId::ALL.iter().filter_map(|&id| match self.slot(id) {
            SurfaceSlot::Concrete(desc) => Some((id, desc)),
            SurfaceSlot::Alias(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AaDescriptor;

    fn display(aa: AaDescriptor) -> DisplayConfig {
        DisplayConfig {
            width: 1280,
            height: 720,
            gamma: 2.2,
            aa,
            vsync: false,
        }
    }

    #[test]
    fn gbuffer_sizing_per_descriptor() {
        let cases = [
            (AaDescriptor::None, 1280, 720, 1),
            (AaDescriptor::Fxaa, 1280, 720, 1),
            (AaDescriptor::Msaa2x, 1280, 720, 2),
            (AaDescriptor::Msaa4x, 1280, 720, 4),
            (AaDescriptor::Msaa8x, 1280, 720, 8),
            (AaDescriptor::Ssaa2x, 2560, 1440, 1),
            (AaDescriptor::Ssaa3x, 3840, 2160, 1),
            (AaDescriptor::Ssaa4x, 5120, 2880, 1),
        ];
        for (aa, w, h, samples) in cases {
            let layout = FrameLayout::new(&display(aa));
            for id in [
                SurfaceId::GBufferBaseColor,
                SurfaceId::GBufferMaterial,
                SurfaceId::GBufferNormal,
                SurfaceId::GBufferDepth,
            ] {
                let desc = layout.desc(id);
                assert_eq!((desc.width, desc.height), (w, h), "{aa:?} {id:?}");
                assert_eq!(desc.sample_count, samples, "{aa:?} {id:?}");
            }
        }
    }

    #[test]
    fn no_aa_aliases_post_hdr0_to_hdr() {
        let layout = FrameLayout::new(&display(AaDescriptor::None));
        assert_eq!(layout.resolve(SurfaceId::PostProcessHdr0), SurfaceId::Hdr);

        // Any AA descriptor forces a separate allocation.
        for aa in [AaDescriptor::Fxaa, AaDescriptor::Msaa4x, AaDescriptor::Ssaa2x] {
            let layout = FrameLayout::new(&display(aa));
            assert_eq!(
                layout.resolve(SurfaceId::PostProcessHdr0),
                SurfaceId::PostProcessHdr0,
                "{aa:?}"
            );
        }
    }

    #[test]
    fn fxaa_and_none_alias_post_depth_normal_to_gbuffer() {
        for aa in [AaDescriptor::None, AaDescriptor::Fxaa] {
            let layout = FrameLayout::new(&display(aa));
            assert_eq!(
                layout.resolve(SurfaceId::PostProcessDepth),
                SurfaceId::GBufferDepth,
                "{aa:?}"
            );
            assert_eq!(
                layout.resolve(SurfaceId::PostProcessNormal),
                SurfaceId::GBufferNormal,
                "{aa:?}"
            );
        }
        for aa in [AaDescriptor::Msaa2x, AaDescriptor::Ssaa4x] {
            let layout = FrameLayout::new(&display(aa));
            assert!(!layout.is_alias(SurfaceId::PostProcessDepth), "{aa:?}");
            assert!(!layout.is_alias(SurfaceId::PostProcessNormal), "{aa:?}");
            assert_eq!(layout.desc(SurfaceId::PostProcessDepth).sample_count, 1);
        }
    }

    #[test]
    fn msaa_hdr_is_not_compute_writable() {
        let layout = FrameLayout::new(&display(AaDescriptor::Msaa4x));
        assert!(!layout.desc(SurfaceId::Hdr).compute_writable);

        let layout = FrameLayout::new(&display(AaDescriptor::Ssaa2x));
        assert!(layout.desc(SurfaceId::Hdr).compute_writable);
    }

    #[test]
    fn post_hdr1_is_always_its_own_allocation() {
        for aa in [AaDescriptor::None, AaDescriptor::Fxaa, AaDescriptor::Msaa8x] {
            let layout = FrameLayout::new(&display(aa));
            let desc = layout.desc(SurfaceId::PostProcessHdr1);
            assert!(!layout.is_alias(SurfaceId::PostProcessHdr1));
            assert_eq!((desc.width, desc.height), (1280, 720), "{aa:?}");
            assert!(desc.compute_writable);
        }
    }
}
