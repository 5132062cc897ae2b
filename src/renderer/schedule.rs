//! Camera Schedule
//!
//! Pure derivation of the per-camera pass sequence from the render mode,
//! overlay flags, anti-aliasing descriptor, and lens. The renderer executes
//! the resulting step list in order; keeping the derivation side-effect free
//! makes the ordering invariants testable without a device.

use smallvec::SmallVec;

use crate::config::AaDescriptor;
use crate::scene::camera::{BasePipeline, ComponentView, Lens, RenderLayer, RenderMode};

/// How the deferred shading step is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredDispatch {
    /// Full-screen compute dispatch writing the HDR storage view.
    Compute,
    /// Full-screen graphics draw targeting the HDR attachment. Used with
    /// MSAA, where the HDR surface cannot back a storage binding.
    GraphicsDraw,
}

/// One step of a camera's frame, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStep {
    /// Rebuild the light buffer for this camera's view.
    LightingUpdate,
    /// Depth-only pre-pass over opaque geometry.
    DepthPrePass,
    /// Opaque geometry into the G-buffer channels.
    GBufferPass,
    DeferredShading(DeferredDispatch),
    /// Variable (PBR) shading of opaque geometry.
    ForwardOpaque,
    /// Emissive geometry layered over the deferred result.
    ForwardEmissive,
    Sky,
    ForwardTransparent,
    /// Constant (non-PBR) shading.
    SolidForward,
    /// Exactly one debug channel, no lighting.
    Component(ComponentView),
    WireframeOverlay,
    AabbOverlay,
    /// Luma preprocess required before the FXAA dispatch.
    FxaaPreprocess,
    AaResolve,
    DepthOfField,
    BackBufferComposite,
}

/// Derives the ordered step list for one camera.
#[must_use]
pub fn schedule(
    mode: RenderMode,
    layers: RenderLayer,
    aa: AaDescriptor,
    lens: &Lens,
) -> SmallVec<[CameraStep; 12]> {
    let mut steps = SmallVec::new();

    if mode.depth_prepass() {
        steps.push(CameraStep::DepthPrePass);
    }

    match mode.base_pipeline() {
        BasePipeline::Forward => {
            steps.push(CameraStep::LightingUpdate);
            steps.push(CameraStep::ForwardOpaque);
            steps.push(CameraStep::Sky);
            steps.push(CameraStep::ForwardTransparent);
        }
        BasePipeline::Deferred => {
            steps.push(CameraStep::LightingUpdate);
            steps.push(CameraStep::GBufferPass);
            let dispatch = if aa.uses_msaa() {
                DeferredDispatch::GraphicsDraw
            } else {
                DeferredDispatch::Compute
            };
            steps.push(CameraStep::DeferredShading(dispatch));
            steps.push(CameraStep::ForwardEmissive);
            steps.push(CameraStep::Sky);
            steps.push(CameraStep::ForwardTransparent);
        }
        BasePipeline::Solid => {
            steps.push(CameraStep::LightingUpdate);
            steps.push(CameraStep::SolidForward);
        }
        BasePipeline::Component(view) => steps.push(CameraStep::Component(view)),
        BasePipeline::None => {}
    }

    // Overlays run after the primary mode, wireframe first.
    if layers.contains(RenderLayer::WIREFRAME) {
        steps.push(CameraStep::WireframeOverlay);
    }
    if layers.contains(RenderLayer::AABB) {
        steps.push(CameraStep::AabbOverlay);
    }

    match aa {
        AaDescriptor::None => {}
        AaDescriptor::Fxaa => {
            steps.push(CameraStep::FxaaPreprocess);
            steps.push(CameraStep::AaResolve);
        }
        _ => steps.push(CameraStep::AaResolve),
    }

    if lens.has_finite_aperture() {
        steps.push(CameraStep::DepthOfField);
    }

    steps.push(CameraStep::BackBufferComposite);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinhole() -> Lens {
        Lens::pinhole()
    }

    fn finite() -> Lens {
        Lens {
            aperture_radius: 0.5,
            ..Lens::pinhole()
        }
    }

    #[test]
    fn deferred_without_msaa_dispatches_compute() {
        let steps = schedule(
            RenderMode::Deferred,
            RenderLayer::empty(),
            AaDescriptor::None,
            &pinhole(),
        );
        assert_eq!(
            steps.as_slice(),
            &[
                CameraStep::LightingUpdate,
                CameraStep::GBufferPass,
                CameraStep::DeferredShading(DeferredDispatch::Compute),
                CameraStep::ForwardEmissive,
                CameraStep::Sky,
                CameraStep::ForwardTransparent,
                CameraStep::BackBufferComposite,
            ]
        );
    }

    #[test]
    fn deferred_with_msaa_draws_instead() {
        let steps = schedule(
            RenderMode::Deferred,
            RenderLayer::empty(),
            AaDescriptor::Msaa4x,
            &pinhole(),
        );
        assert!(steps.contains(&CameraStep::DeferredShading(DeferredDispatch::GraphicsDraw)));
        assert!(!steps.contains(&CameraStep::DeferredShading(DeferredDispatch::Compute)));
    }

    #[test]
    fn pinhole_camera_skips_depth_of_field() {
        let steps = schedule(
            RenderMode::Forward,
            RenderLayer::empty(),
            AaDescriptor::Ssaa2x,
            &pinhole(),
        );
        assert!(!steps.contains(&CameraStep::DepthOfField));

        let steps = schedule(
            RenderMode::Forward,
            RenderLayer::empty(),
            AaDescriptor::Ssaa2x,
            &finite(),
        );
        assert!(steps.contains(&CameraStep::DepthOfField));
    }

    #[test]
    fn depth_and_solid_runs_prepass_then_full_solid_pipeline() {
        let steps = schedule(
            RenderMode::DepthAndSolid,
            RenderLayer::empty(),
            AaDescriptor::None,
            &pinhole(),
        );
        assert_eq!(
            steps.as_slice(),
            &[
                CameraStep::DepthPrePass,
                CameraStep::LightingUpdate,
                CameraStep::SolidForward,
                CameraStep::BackBufferComposite,
            ]
        );
    }

    #[test]
    fn fxaa_preprocess_precedes_resolve() {
        let steps = schedule(
            RenderMode::Forward,
            RenderLayer::empty(),
            AaDescriptor::Fxaa,
            &pinhole(),
        );
        let pre = steps
            .iter()
            .position(|s| *s == CameraStep::FxaaPreprocess)
            .unwrap();
        let resolve = steps
            .iter()
            .position(|s| *s == CameraStep::AaResolve)
            .unwrap();
        assert!(pre < resolve);

        // MSAA/SSAA need only the resolve dispatch.
        let steps = schedule(
            RenderMode::Forward,
            RenderLayer::empty(),
            AaDescriptor::Msaa2x,
            &pinhole(),
        );
        assert!(!steps.contains(&CameraStep::FxaaPreprocess));
        assert!(steps.contains(&CameraStep::AaResolve));
    }

    #[test]
    fn wireframe_overlays_before_bounding_volumes() {
        let steps = schedule(
            RenderMode::Solid,
            RenderLayer::WIREFRAME | RenderLayer::AABB,
            AaDescriptor::None,
            &pinhole(),
        );
        let wire = steps
            .iter()
            .position(|s| *s == CameraStep::WireframeOverlay)
            .unwrap();
        let aabb = steps
            .iter()
            .position(|s| *s == CameraStep::AabbOverlay)
            .unwrap();
        assert!(wire < aabb);
    }

    #[test]
    fn mode_none_only_composites() {
        let steps = schedule(
            RenderMode::None,
            RenderLayer::empty(),
            AaDescriptor::None,
            &pinhole(),
        );
        assert_eq!(steps.as_slice(), &[CameraStep::BackBufferComposite]);
    }

    #[test]
    fn component_modes_skip_lighting() {
        let steps = schedule(
            RenderMode::Distance,
            RenderLayer::empty(),
            AaDescriptor::None,
            &pinhole(),
        );
        assert!(!steps.contains(&CameraStep::LightingUpdate));
        assert!(steps.contains(&CameraStep::Component(ComponentView::Distance)));
    }
}
