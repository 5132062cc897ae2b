//! Scene data semantics the renderer relies on.

use std::sync::Arc;

use glam::{Affine3A, Vec3, Vec4};

use ember::scene::camera::BasePipeline;
use ember::scene::Viewport;
use ember::{Camera, Material, Model, RenderMode, Scene, StaticMesh};

#[test]
fn models_share_meshes_but_own_materials() {
    let mesh = Arc::new(StaticMesh::cube());
    let original = Model::new(Arc::clone(&mesh));
    let mut copy = original.clone();

    assert!(Arc::ptr_eq(&original.mesh, &copy.mesh));

    copy.material = Material {
        base_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
        ..Material::default()
    };
    assert_ne!(original.material.base_color, copy.material.base_color);
}

#[test]
fn world_sphere_follows_the_transform() {
    let mut model = Model::new(Arc::new(StaticMesh::cube()));
    model.transform = Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let sphere = model.world_sphere();
    assert!((sphere.center.x - 10.0).abs() < 1e-5);
    assert!(sphere.radius > 0.0);
}

#[test]
fn render_mode_decomposition_covers_every_variant() {
    assert!(RenderMode::DepthAndForward.depth_prepass());
    assert_eq!(
        RenderMode::DepthAndForward.base_pipeline(),
        BasePipeline::Forward
    );
    assert!(!RenderMode::Deferred.depth_prepass());
    assert_eq!(RenderMode::None.base_pipeline(), BasePipeline::None);
}

#[test]
fn for_each_camera_visits_active_cameras_only() {
    let mut scene = Scene::new();
    scene
        .cameras
        .push(Camera::new_perspective(60.0, 800, 600, 0.1, 100.0));
    let mut disabled = Camera::new_perspective(60.0, 800, 600, 0.1, 100.0);
    disabled.active = false;
    scene.cameras.push(disabled);
    scene
        .cameras
        .push(Camera::new_perspective(90.0, 800, 600, 0.1, 100.0));

    let mut visited = 0;
    scene.for_each_camera(|_| visited += 1);
    assert_eq!(visited, 2);
    assert_eq!(scene.active_camera_count(), 2);
}

#[test]
fn projection_round_trips_through_its_inverse() {
    let camera = Camera::new_perspective(70.0, 1280, 720, 0.5, 200.0);
    let forward = camera.view_to_projection();
    let back = camera.projection_to_view();
    let p = Vec4::new(0.3, -0.2, 0.7, 1.0);
    let round_tripped = back * (forward * p);
    let normalized = round_tripped / round_tripped.w;
    let original = p / p.w;
    assert!((normalized - original).abs().max_element() < 1e-4);
}

#[test]
fn viewport_scaling_matches_supersampling() {
    let viewport = Viewport {
        top_left_x: 100.0,
        top_left_y: 50.0,
        width: 640.0,
        height: 360.0,
    };
    let scaled = viewport.scaled(3);
    assert_eq!(scaled.top_left_x, 300.0);
    assert_eq!(scaled.top_left_y, 150.0);
    assert_eq!(scaled.width, 1920.0);
    assert_eq!(scaled.height, 1080.0);
}
