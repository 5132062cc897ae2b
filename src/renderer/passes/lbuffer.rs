//! Light Buffer
//!
//! Packs the scene's active lights into the fixed-capacity light constant
//! buffer before shading. Lights are stored in world space; view-space
//! transformation happens in the shaders using the camera constants, so the
//! packed buffer is valid for the whole camera pass sequence.
//!
//! This pass owns no pipeline; it is a pure upload step. It may rebind the
//! viewport while preparing light-space work, so the orchestrator restores
//! the super-sampled viewport right after running it.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::scene::Scene;

use super::FrameBindings;

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 64;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    /// Normalized world-space travel direction, w unused.
    pub direction: Vec4,
    /// Irradiance-scaled color, w unused.
    pub irradiance: Vec4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct GpuPointLight {
    /// World-space position, range in w.
    pub position_range: Vec4,
    /// Intensity-scaled color, w unused.
    pub intensity: Vec4,
}

/// CPU mirror of the light constant buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniforms {
    /// Ambient color times intensity, w unused.
    pub ambient: Vec4,
    /// x: directional count, y: point count.
    pub counts: [u32; 4],
    pub directional: [GpuDirectionalLight; MAX_DIRECTIONAL_LIGHTS],
    pub point: [GpuPointLight; MAX_POINT_LIGHTS],
}

impl LightUniforms {
    /// Packs the scene's lights, truncating past the fixed capacities.
    #[must_use]
    pub fn pack(scene: &Scene) -> Self {
        let mut directional = [GpuDirectionalLight::default(); MAX_DIRECTIONAL_LIGHTS];
        let mut point = [GpuPointLight::default(); MAX_POINT_LIGHTS];

        if scene.directional_lights.len() > MAX_DIRECTIONAL_LIGHTS {
            log::warn!(
                "{} directional lights exceed capacity {MAX_DIRECTIONAL_LIGHTS}",
                scene.directional_lights.len()
            );
        }
        if scene.point_lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "{} point lights exceed capacity {MAX_POINT_LIGHTS}",
                scene.point_lights.len()
            );
        }

        let n_directional = scene.directional_lights.len().min(MAX_DIRECTIONAL_LIGHTS);
        for (slot, light) in directional
            .iter_mut()
            .zip(&scene.directional_lights[..n_directional])
        {
            *slot = GpuDirectionalLight {
                direction: light.direction.normalize_or(Vec3::NEG_Y).extend(0.0),
                irradiance: (light.color * light.irradiance).extend(0.0),
            };
        }

        let n_point = scene.point_lights.len().min(MAX_POINT_LIGHTS);
        for (slot, light) in point.iter_mut().zip(&scene.point_lights[..n_point]) {
            *slot = GpuPointLight {
                position_range: light.position.extend(light.range),
                intensity: (light.color * light.intensity).extend(0.0),
            };
        }

        Self {
            ambient: scene
                .ambient
                .map_or(Vec4::ZERO, |a| (a.color * a.intensity).extend(0.0)),
            counts: [n_directional as u32, n_point as u32, 0, 0],
            directional,
            point,
        }
    }
}

/// The lighting-buffer update step.
#[derive(Default)]
pub struct LBufferPass;

impl LBufferPass {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Repacks and uploads the light buffer for the current camera.
    pub fn update(&self, queue: &wgpu::Queue, bindings: &FrameBindings, scene: &Scene) {
        bindings.lights.update(queue, &LightUniforms::pack(scene));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{AmbientLight, DirectionalLight, PointLight};

    #[test]
    fn pack_scales_ambient_and_zeroes_it_when_absent() {
        let mut scene = Scene::default();
        scene.ambient = Some(AmbientLight {
            color: Vec3::new(0.5, 1.0, 0.25),
            intensity: 2.0,
        });
        let packed = LightUniforms::pack(&scene);
        assert_eq!(packed.ambient, Vec4::new(1.0, 2.0, 0.5, 0.0));

        scene.ambient = None;
        let packed = LightUniforms::pack(&scene);
        assert_eq!(packed.ambient, Vec4::ZERO);
    }

    #[test]
    fn pack_records_counts_and_truncates() {
        let mut scene = Scene::default();
        scene.directional_lights = vec![DirectionalLight::default(); 6];
        scene.point_lights = vec![PointLight::default(); 2];
        let packed = LightUniforms::pack(&scene);
        assert_eq!(packed.counts[0], MAX_DIRECTIONAL_LIGHTS as u32);
        assert_eq!(packed.counts[1], 2);
    }

    #[test]
    fn pack_normalizes_directions() {
        let mut scene = Scene::default();
        scene.directional_lights.push(DirectionalLight {
            direction: Vec3::new(0.0, -2.0, 0.0),
            ..DirectionalLight::default()
        });
        let packed = LightUniforms::pack(&scene);
        let d = packed.directional[0].direction;
        assert!((d.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn uniform_size_is_16_byte_aligned() {
        assert_eq!(size_of::<LightUniforms>() % 16, 0);
    }
}
