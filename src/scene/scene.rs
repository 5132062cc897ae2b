//! Scene Container
//!
//! Flat containers for everything the renderer consumes in a frame. The
//! renderer never mutates the scene; all GPU-side state derived from it
//! lives in the renderer's own caches.

use super::camera::Camera;
use super::light::{AmbientLight, DirectionalLight, PointLight};
use super::model::Model;
use super::sprite::Sprite;

/// The scene handed to the renderer each frame.
#[derive(Debug, Default)]
pub struct Scene {
    pub cameras: Vec<Camera>,
    pub models: Vec<Model>,
    pub ambient: Option<AmbientLight>,
    pub directional_lights: Vec<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
    pub sprites: Vec<Sprite>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visits every active camera in declaration order.
    pub fn for_each_camera(&self, mut f: impl FnMut(&Camera)) {
        for camera in self.cameras.iter().filter(|c| c.active) {
            f(camera);
        }
    }

    /// Number of active cameras.
    #[must_use]
    pub fn active_camera_count(&self) -> usize {
        self.cameras.iter().filter(|c| c.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_each_camera_skips_inactive() {
        let mut scene = Scene::new();
        scene.cameras.push(Camera::new_perspective(60.0, 640, 480, 0.1, 100.0));
        let mut sleeping = Camera::new_perspective(60.0, 640, 480, 0.1, 100.0);
        sleeping.active = false;
        scene.cameras.push(sleeping);

        let mut visited = 0;
        scene.for_each_camera(|_| visited += 1);
        assert_eq!(visited, 1);
        assert_eq!(scene.active_camera_count(), 1);
    }
}
