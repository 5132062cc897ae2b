//! Scene Data
//!
//! CPU-side scene description consumed by the renderer each frame:
//! - [`Scene`]: cameras, models, lights, sprites
//! - [`Camera`]: per-frame view parameters, render mode, and layer flags
//! - [`Model`] / [`StaticMesh`]: renderable units (shared mesh, owned material)
//! - [`light`]: directional / point / ambient light sources
//! - [`sprite`]: 2D overlay sprites composited after all cameras

pub mod camera;
pub mod light;
pub mod model;
pub mod scene;
pub mod sprite;

pub use camera::{
    BasePipeline, Brdf, Camera, CameraSettings, ComponentView, Fog, Lens, RenderLayer, RenderMode,
    Sky, Viewport,
};
pub use light::{AmbientLight, DirectionalLight, PointLight};
pub use model::{BoundingBox, BoundingSphere, Material, Model, StaticMesh, Vertex};
pub use scene::Scene;
pub use sprite::Sprite;
