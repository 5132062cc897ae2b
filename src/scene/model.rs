//! Models & Static Meshes
//!
//! A [`Model`] is one renderable unit: a shared reference to mesh geometry
//! plus an exclusively-owned material instance and a shadow behavior flag.
//! Several models may share one [`StaticMesh`] (the longest-lived holder
//! keeps it alive); cloning a model deep-copies the material and shares the
//! mesh.

use std::sync::Arc;

use glam::{Affine3A, Vec2, Vec3, Vec4};

// ---------------------------------------------------------------------------
// Vertex & bounding volumes
// ---------------------------------------------------------------------------

/// Interleaved mesh vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Vertex buffer layout matching the geometry pass shaders.
    #[must_use]
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Smallest box enclosing the given points.
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    #[must_use]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Bounding sphere, used for distance sorting and culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere enclosing a bounding box.
    #[must_use]
    pub fn of_box(aabb: &BoundingBox) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.half_extents().length(),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticMesh
// ---------------------------------------------------------------------------

/// Immutable mesh geometry shared between models.
///
/// The renderable range is `start_index .. start_index + index_count` into
/// the index list, so several meshes may be carved out of one vertex pool.
#[derive(Debug)]
pub struct StaticMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// First index of the renderable range.
    pub start_index: u32,
    /// Number of indices in the renderable range.
    pub index_count: u32,
    pub aabb: BoundingBox,
    pub sphere: BoundingSphere,
}

impl StaticMesh {
    /// Builds a mesh renderable over its entire index list.
    #[must_use]
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let aabb = BoundingBox::from_points(vertices.iter().map(|v| Vec3::from(v.position)));
        let sphere = BoundingSphere::of_box(&aabb);
        let index_count = indices.len() as u32;
        Self {
            vertices,
            indices,
            start_index: 0,
            index_count,
            aabb,
            sphere,
        }
    }

    /// A unit cube centered on the origin.
    #[must_use]
    pub fn cube() -> Self {
        let corners = [
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ];
        let vertices = corners
            .iter()
            .map(|&p| Vertex {
                position: p.to_array(),
                normal: p.normalize().to_array(),
                uv: Vec2::new(p.x + 0.5, p.y + 0.5).to_array(),
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 6, 2, 3, 7, 6, // top
            0, 7, 3, 0, 4, 7, // left
            1, 2, 6, 1, 6, 5, // right
        ];
        Self::new(vertices, indices)
    }
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// Material instance, exclusively owned by its model.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color: Vec4,
    pub roughness: f32,
    pub metallic: f32,
    pub emissive: Vec3,
    /// Transparent materials render in the transparent forward sub-pass.
    pub transparent: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec4::ONE,
            roughness: 0.5,
            metallic: 0.0,
            emissive: Vec3::ZERO,
            transparent: false,
        }
    }
}

impl Material {
    /// `true` when the emissive term contributes light.
    #[inline]
    #[must_use]
    pub fn is_emissive(&self) -> bool {
        self.emissive != Vec3::ZERO
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A renderable unit: shared mesh geometry + owned material + transform.
///
/// `Clone` shares the mesh (reference count) and deep-copies the material,
/// so mutating a clone's material never affects the source model.
#[derive(Debug, Clone)]
pub struct Model {
    pub mesh: Arc<StaticMesh>,
    pub material: Material,
    pub transform: Affine3A,
    /// Whether this model occludes light in shadow passes.
    pub casts_shadows: bool,
}

impl Model {
    #[must_use]
    pub fn new(mesh: Arc<StaticMesh>) -> Self {
        Self {
            mesh,
            material: Material::default(),
            transform: Affine3A::IDENTITY,
            casts_shadows: true,
        }
    }

    /// World-space bounding sphere of this model.
    #[must_use]
    pub fn world_sphere(&self) -> BoundingSphere {
        let center = self.transform.transform_point3(self.mesh.sphere.center);
        // Conservative: scale the radius by the largest axis scale.
        let scale = self
            .transform
            .matrix3
            .x_axis
            .length()
            .max(self.transform.matrix3.y_axis.length())
            .max(self.transform.matrix3.z_axis.length());
        BoundingSphere {
            center,
            radius: self.mesh.sphere.radius * scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_mesh_and_copies_material() {
        let model = Model::new(Arc::new(StaticMesh::cube()));
        let mut clone = model.clone();
        clone.material.roughness = 0.9;

        assert!(Arc::ptr_eq(&model.mesh, &clone.mesh));
        assert_eq!(model.material.roughness, 0.5);
        assert_eq!(clone.material.roughness, 0.9);
    }

    #[test]
    fn cube_bounds_are_unit() {
        let mesh = StaticMesh::cube();
        assert_eq!(mesh.aabb.min, Vec3::splat(-0.5));
        assert_eq!(mesh.aabb.max, Vec3::splat(0.5));
        assert_eq!(mesh.index_count, 36);
    }
}
