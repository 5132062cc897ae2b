//! Surface layout rules across every anti-aliasing descriptor.

use ember::renderer::output::layout::{
    DEPTH_FORMAT, HDR_FORMAT, RESOLVED_DEPTH_FORMAT, RESOLVED_NORMAL_FORMAT,
};
use ember::{AaDescriptor, DisplayConfig, FrameLayout, SurfaceId};

const ALL_AA: [AaDescriptor; 8] = [
    AaDescriptor::None,
    AaDescriptor::Fxaa,
    AaDescriptor::Msaa2x,
    AaDescriptor::Msaa4x,
    AaDescriptor::Msaa8x,
    AaDescriptor::Ssaa2x,
    AaDescriptor::Ssaa3x,
    AaDescriptor::Ssaa4x,
];

fn layout_for(aa: AaDescriptor) -> FrameLayout {
    FrameLayout::new(&DisplayConfig {
        width: 1280,
        height: 720,
        aa,
        ..Default::default()
    })
}

const GBUFFER_COLORS: [SurfaceId; 3] = [
    SurfaceId::GBufferBaseColor,
    SurfaceId::GBufferMaterial,
    SurfaceId::GBufferNormal,
];

#[test]
fn every_descriptor_sizes_the_geometry_surfaces_consistently() {
    for aa in ALL_AA {
        let layout = layout_for(aa);
        let expected_dims = (1280 * aa.resolution_multiplier(), 720 * aa.resolution_multiplier());
        let expected_samples = aa.sample_count();

        for id in GBUFFER_COLORS {
            let desc = layout.desc(id);
            assert_eq!((desc.width, desc.height), expected_dims, "{aa:?} {id:?}");
            assert_eq!(desc.sample_count, expected_samples, "{aa:?} {id:?}");
        }
        let depth = layout.desc(SurfaceId::GBufferDepth);
        assert_eq!((depth.width, depth.height), expected_dims, "{aa:?}");
        assert_eq!(depth.sample_count, expected_samples, "{aa:?}");
        assert_eq!(depth.format, DEPTH_FORMAT);
    }
}

#[test]
fn exactly_one_depth_surface_exists() {
    for aa in ALL_AA {
        let layout = layout_for(aa);
        let depth_count = layout
            .concrete_surfaces()
            .filter(|(_, desc)| desc.format == DEPTH_FORMAT)
            .count();
        assert_eq!(depth_count, 1, "{aa:?}");
    }
}

#[test]
fn aa_none_aliases_the_first_post_surface_to_hdr() {
    let layout = layout_for(AaDescriptor::None);
    assert!(layout.is_alias(SurfaceId::PostProcessHdr0));
    assert_eq!(layout.resolve(SurfaceId::PostProcessHdr0), SurfaceId::Hdr);

    for aa in ALL_AA.into_iter().filter(|aa| aa.uses_aa()) {
        assert!(
            !layout_for(aa).is_alias(SurfaceId::PostProcessHdr0),
            "{aa:?}"
        );
    }
}

#[test]
fn depth_and_normal_alias_unless_a_resolve_runs() {
    for aa in [AaDescriptor::None, AaDescriptor::Fxaa] {
        let layout = layout_for(aa);
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

    for aa in ALL_AA.into_iter().filter(|aa| aa.requires_resolve()) {
        let layout = layout_for(aa);
        let depth = layout.desc(SurfaceId::PostProcessDepth);
        let normal = layout.desc(SurfaceId::PostProcessNormal);
        assert_eq!(depth.format, RESOLVED_DEPTH_FORMAT, "{aa:?}");
        assert_eq!(normal.format, RESOLVED_NORMAL_FORMAT, "{aa:?}");
        // Resolved copies land at display resolution, single sampled.
        assert_eq!((depth.width, depth.height), (1280, 720), "{aa:?}");
        assert_eq!(depth.sample_count, 1, "{aa:?}");
    }
}

#[test]
fn hdr_is_storage_capable_except_under_msaa() {
    for aa in ALL_AA {
        let layout = layout_for(aa);
        let usage = layout.desc(SurfaceId::Hdr).usage();
        assert_eq!(
            usage.contains(wgpu::TextureUsages::STORAGE_BINDING),
            !aa.uses_msaa(),
            "{aa:?}"
        );
        assert_eq!(layout.desc(SurfaceId::Hdr).format, HDR_FORMAT);
    }
}

#[test]
fn post_processing_surfaces_stay_at_display_resolution() {
    for aa in ALL_AA {
        let layout = layout_for(aa);
        let ping = layout.desc(SurfaceId::PostProcessHdr1);
        assert_eq!((ping.width, ping.height), (1280, 720), "{aa:?}");
        assert_eq!(ping.sample_count, 1, "{aa:?}");
        if aa.uses_aa() {
            let pong = layout.desc(SurfaceId::PostProcessHdr0);
            assert_eq!((pong.width, pong.height), (1280, 720), "{aa:?}");
        }
    }
}
