//! Camera & Render Mode
//!
//! The [`Camera`] holds the per-frame view parameters the renderer reads:
//! view/projection matrices derived from the owner transform, viewport
//! rectangles, lens parameters, the [`RenderMode`] selecting the per-camera
//! pipeline, and the [`RenderLayer`] overlay flags.
//!
//! The camera is owned by the scene and read-only to the renderer during a
//! frame; matrices are recomputed from the transform every frame and never
//! persisted.

use std::borrow::Cow;

use glam::{Affine3A, Mat4};

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// A viewport rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Full-display viewport.
    #[must_use]
    pub const fn of_display(width: u32, height: u32) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    /// This viewport scaled into super-sampled space.
    #[must_use]
    pub fn scaled(self, multiplier: u32) -> Self {
        let m = multiplier as f32;
        Self {
            top_left_x: self.top_left_x * m,
            top_left_y: self.top_left_y * m,
            width: self.width * m,
            height: self.height * m,
        }
    }

    /// Applies this viewport to an open render pass.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.top_left_x,
            self.top_left_y,
            self.width,
            self.height,
            0.0,
            1.0,
        );
    }
}

// ---------------------------------------------------------------------------
// Lens
// ---------------------------------------------------------------------------

/// Thin-lens parameters driving the depth-of-field pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    /// Lens aperture radius. `0.0` is a pinhole camera (no depth of field).
    pub aperture_radius: f32,
    /// Focal length in view-space units.
    pub focal_length: f32,
    /// Maximum circle-of-confusion radius in pixels.
    pub max_coc_radius: f32,
}

impl Lens {
    /// A pinhole lens: everything in focus, depth of field disabled.
    #[must_use]
    pub const fn pinhole() -> Self {
        Self {
            aperture_radius: 0.0,
            focal_length: 100.0,
            max_coc_radius: 10.0,
        }
    }

    /// `true` when depth of field applies to this camera.
    #[inline]
    #[must_use]
    pub fn has_finite_aperture(&self) -> bool {
        self.aperture_radius > 0.0
    }
}

impl Default for Lens {
    fn default() -> Self {
        Self::pinhole()
    }
}

// ---------------------------------------------------------------------------
// Fog & Sky
// ---------------------------------------------------------------------------

/// Exponential distance fog applied during shading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: glam::Vec3,
    pub density: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: glam::Vec3::splat(0.5),
            density: 0.0,
        }
    }
}

/// Procedural gradient sky rendered between the opaque and transparent
/// forward sub-passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sky {
    pub zenith_color: glam::Vec3,
    pub horizon_color: glam::Vec3,
    pub intensity: f32,
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            zenith_color: glam::Vec3::new(0.2, 0.4, 0.8),
            horizon_color: glam::Vec3::new(0.8, 0.85, 0.9),
            intensity: 1.0,
        }
    }
}

/// BRDF selection for the variable (PBR) shading passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Brdf {
    /// Diffuse-only shading.
    Lambertian,
    /// Microfacet specular + diffuse.
    #[default]
    CookTorrance,
}

// ---------------------------------------------------------------------------
// RenderMode
// ---------------------------------------------------------------------------

/// Debug component visualizations. Each renders exactly one surface channel
/// with no lighting step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentView {
    BaseColor,
    Material,
    NormalTexture,
    UvTexture,
    Distance,
    ShadingNormal,
    TsnmShadingNormal,
}

/// The base pipeline a render mode resolves to, after the optional depth
/// pre-pass has been split off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasePipeline {
    /// Lighting + variable shading forward pass (opaque, sky, transparent).
    Forward,
    /// Lighting + G-buffer + deferred shading + forward layering.
    Deferred,
    /// Lighting + constant (non-PBR) shading forward pass.
    Solid,
    /// A single specialized debug pass, no lighting.
    Component(ComponentView),
    /// Viewport binding only; nothing is shaded.
    None,
}

/// Per-camera render mode.
///
/// The depth-and-X modes share their shading suffix with the plain modes;
/// the relationship is expressed through [`RenderMode::depth_prepass`] and
/// [`RenderMode::base_pipeline`] rather than dispatch fall-through, so the
/// shared suffix is visible and testable on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    Forward,
    #[default]
    Deferred,
    Solid,
    DepthAndForward,
    DepthAndSolid,
    BaseColor,
    Material,
    NormalTexture,
    UvTexture,
    Distance,
    ShadingNormal,
    TsnmShadingNormal,
    None,
}

impl RenderMode {
    /// `true` when a depth-only pre-pass runs before the base pipeline.
    ///
    /// The pre-pass is a pure optimization: it must not alter the behavior
    /// of the subsequent shading pass.
    #[inline]
    #[must_use]
    pub const fn depth_prepass(self) -> bool {
        matches!(self, Self::DepthAndForward | Self::DepthAndSolid)
    }

    /// The base pipeline this mode executes after the optional pre-pass.
    #[must_use]
    pub const fn base_pipeline(self) -> BasePipeline {
        match self {
            Self::Forward | Self::DepthAndForward => BasePipeline::Forward,
            Self::Deferred => BasePipeline::Deferred,
            Self::Solid | Self::DepthAndSolid => BasePipeline::Solid,
            Self::BaseColor => BasePipeline::Component(ComponentView::BaseColor),
            Self::Material => BasePipeline::Component(ComponentView::Material),
            Self::NormalTexture => BasePipeline::Component(ComponentView::NormalTexture),
            Self::UvTexture => BasePipeline::Component(ComponentView::UvTexture),
            Self::Distance => BasePipeline::Component(ComponentView::Distance),
            Self::ShadingNormal => BasePipeline::Component(ComponentView::ShadingNormal),
            Self::TsnmShadingNormal => BasePipeline::Component(ComponentView::TsnmShadingNormal),
            Self::None => BasePipeline::None,
        }
    }
}

bitflags::bitflags! {
    /// Optional overlay passes applied after the primary mode, independent
    /// of [`RenderMode`]. Wireframe renders before bounding volumes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RenderLayer: u32 {
        /// Wireframe overlay over all models.
        const WIREFRAME = 1 << 0;
        /// Axis-aligned bounding box overlay.
        const AABB = 1 << 1;
    }
}

// ---------------------------------------------------------------------------
// CameraSettings & Camera
// ---------------------------------------------------------------------------

/// Mode, layer, and environment settings attached to a camera.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraSettings {
    pub render_mode: RenderMode,
    pub render_layers: RenderLayer,
    pub brdf: Brdf,
    pub fog: Fog,
    pub sky: Sky,
}

/// A perspective camera.
///
/// Owned by the scene graph; the renderer reads it once per frame and
/// derives all matrices from the owner transform at that point.
#[derive(Debug, Clone)]
pub struct Camera {
    pub name: Cow<'static, str>,
    /// Inactive cameras are skipped by the renderer.
    pub active: bool,

    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    /// Owner transform: view space to world space.
    pub world_from_view: Affine3A,

    /// Display-space viewport.
    pub viewport: Viewport,

    pub lens: Lens,
    pub settings: CameraSettings,
}

impl Camera {
    /// Creates an active perspective camera covering the given display.
    #[must_use]
    pub fn new_perspective(fov_y_degrees: f32, width: u32, height: u32, near: f32, far: f32) -> Self {
        Self {
            name: Cow::Borrowed("Camera"),
            active: true,
            fov_y: fov_y_degrees.to_radians(),
            aspect: width as f32 / height as f32,
            near,
            far,
            world_from_view: Affine3A::IDENTITY,
            viewport: Viewport::of_display(width, height),
            lens: Lens::default(),
            settings: CameraSettings::default(),
        }
    }

    /// World-to-view matrix, derived from the owner transform.
    #[must_use]
    pub fn world_to_view(&self) -> Mat4 {
        Mat4::from(self.world_from_view).inverse()
    }

    /// View-to-world matrix (the owner transform itself).
    #[must_use]
    pub fn view_to_world(&self) -> Mat4 {
        Mat4::from(self.world_from_view)
    }

    /// View-to-projection matrix (0..1 depth range, as wgpu expects).
    #[must_use]
    pub fn view_to_projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Projection-to-view matrix.
    #[must_use]
    pub fn projection_to_view(&self) -> Mat4 {
        self.view_to_projection().inverse()
    }

    /// The camera viewport scaled into super-sampled space.
    #[must_use]
    pub fn ss_viewport(&self, resolution_multiplier: u32) -> Viewport {
        self.viewport.scaled(resolution_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_modes_share_base_pipeline() {
        assert_eq!(
            RenderMode::DepthAndForward.base_pipeline(),
            RenderMode::Forward.base_pipeline()
        );
        assert_eq!(
            RenderMode::DepthAndSolid.base_pipeline(),
            RenderMode::Solid.base_pipeline()
        );
        assert!(RenderMode::DepthAndForward.depth_prepass());
        assert!(!RenderMode::Forward.depth_prepass());
    }

    #[test]
    fn component_modes_skip_lighting() {
        assert_eq!(
            RenderMode::Distance.base_pipeline(),
            BasePipeline::Component(ComponentView::Distance)
        );
        assert_eq!(RenderMode::None.base_pipeline(), BasePipeline::None);
    }

    #[test]
    fn ss_viewport_scales_both_dimensions() {
        let cam = Camera::new_perspective(60.0, 640, 360, 0.1, 100.0);
        let ss = cam.ss_viewport(3);
        assert_eq!(ss.width, 1920.0);
        assert_eq!(ss.height, 1080.0);
    }
}
