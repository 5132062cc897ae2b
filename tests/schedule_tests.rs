//! Per-camera schedule derivation across the full mode matrix.

use ember::renderer::schedule::{CameraStep, DeferredDispatch, schedule};
use ember::scene::camera::{ComponentView, Lens, RenderLayer};
use ember::{AaDescriptor, RenderMode};

fn steps_for(mode: RenderMode, aa: AaDescriptor) -> Vec<CameraStep> {
    schedule(mode, RenderLayer::empty(), aa, &Lens::pinhole()).to_vec()
}

#[test]
fn every_mode_ends_with_the_composite() {
    let modes = [
        RenderMode::Forward,
        RenderMode::Deferred,
        RenderMode::Solid,
        RenderMode::DepthAndForward,
        RenderMode::DepthAndSolid,
        RenderMode::BaseColor,
        RenderMode::Material,
        RenderMode::NormalTexture,
        RenderMode::UvTexture,
        RenderMode::Distance,
        RenderMode::ShadingNormal,
        RenderMode::TsnmShadingNormal,
        RenderMode::None,
    ];
    for mode in modes {
        let steps = steps_for(mode, AaDescriptor::None);
        assert_eq!(
            steps.last(),
            Some(&CameraStep::BackBufferComposite),
            "{mode:?}"
        );
        assert_eq!(
            steps
                .iter()
                .filter(|s| **s == CameraStep::BackBufferComposite)
                .count(),
            1,
            "{mode:?}"
        );
    }
}

#[test]
fn depth_modes_prefix_their_plain_counterparts() {
    for (depth_mode, plain) in [
        (RenderMode::DepthAndForward, RenderMode::Forward),
        (RenderMode::DepthAndSolid, RenderMode::Solid),
    ] {
        let with_prepass = steps_for(depth_mode, AaDescriptor::None);
        let without = steps_for(plain, AaDescriptor::None);
        assert_eq!(with_prepass[0], CameraStep::DepthPrePass, "{depth_mode:?}");
        assert_eq!(&with_prepass[1..], without.as_slice(), "{depth_mode:?}");
    }
}

#[test]
fn deferred_layers_emissive_sky_transparent_after_shading() {
    let steps = steps_for(RenderMode::Deferred, AaDescriptor::Ssaa2x);
    let position = |step| steps.iter().position(|s| *s == step).unwrap();
    let shading = position(CameraStep::DeferredShading(DeferredDispatch::Compute));
    assert!(position(CameraStep::GBufferPass) < shading);
    assert!(shading < position(CameraStep::ForwardEmissive));
    assert!(position(CameraStep::ForwardEmissive) < position(CameraStep::Sky));
    assert!(position(CameraStep::Sky) < position(CameraStep::ForwardTransparent));
    assert!(position(CameraStep::ForwardTransparent) < position(CameraStep::AaResolve));
}

#[test]
fn msaa_switches_only_the_deferred_dispatch() {
    let compute = steps_for(RenderMode::Deferred, AaDescriptor::Ssaa2x);
    let graphics = steps_for(RenderMode::Deferred, AaDescriptor::Msaa4x);
    assert_eq!(compute.len(), graphics.len());
    for (a, b) in compute.iter().zip(graphics.iter()) {
        match (a, b) {
            (
                CameraStep::DeferredShading(DeferredDispatch::Compute),
                CameraStep::DeferredShading(DeferredDispatch::GraphicsDraw),
            ) => {}
            _ => assert_eq!(a, b),
        }
    }
}

#[test]
fn overlays_run_between_shading_and_resolve() {
    let steps = schedule(
        RenderMode::Forward,
        RenderLayer::WIREFRAME | RenderLayer::AABB,
        AaDescriptor::Msaa2x,
        &Lens::pinhole(),
    );
    let position = |step| steps.iter().position(|s| *s == step).unwrap();
    assert!(position(CameraStep::ForwardTransparent) < position(CameraStep::WireframeOverlay));
    assert!(position(CameraStep::WireframeOverlay) < position(CameraStep::AabbOverlay));
    assert!(position(CameraStep::AabbOverlay) < position(CameraStep::AaResolve));
}

#[test]
fn depth_of_field_follows_the_resolve() {
    let lens = Lens {
        aperture_radius: 1.2,
        ..Lens::pinhole()
    };
    for aa in [AaDescriptor::Fxaa, AaDescriptor::Msaa4x, AaDescriptor::Ssaa3x] {
        let steps = schedule(RenderMode::Deferred, RenderLayer::empty(), aa, &lens);
        let position = |step| steps.iter().position(|s| *s == step).unwrap();
        assert!(position(CameraStep::AaResolve) < position(CameraStep::DepthOfField), "{aa:?}");
        assert!(
            position(CameraStep::DepthOfField) < position(CameraStep::BackBufferComposite),
            "{aa:?}"
        );
    }
}

#[test]
fn component_modes_emit_a_single_shading_step() {
    let steps = steps_for(RenderMode::UvTexture, AaDescriptor::None);
    assert_eq!(
        steps.as_slice(),
        &[
            CameraStep::Component(ComponentView::UvTexture),
            CameraStep::BackBufferComposite,
        ]
    );
}
