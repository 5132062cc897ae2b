//! Light Sources
//!
//! Plain-value light descriptions. The renderer packs the active lights
//! into the lighting buffer (`LBuffer`) once per camera before shading.

use glam::Vec3;

/// Uniform ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            intensity: 0.03,
        }
    }
}

/// Infinitely-distant directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// World-space direction the light travels (normalized by the packer).
    pub direction: Vec3,
    pub color: Vec3,
    /// Irradiance perpendicular to the light direction.
    pub irradiance: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::ONE,
            irradiance: 3.0,
        }
    }
}

/// Point light with a finite influence range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    /// Radiant intensity at unit distance.
    pub intensity: f32,
    /// Influence radius; fragments beyond it receive no contribution.
    pub range: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 10.0,
            range: 25.0,
        }
    }
}
