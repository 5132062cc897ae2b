//! Scene Renderer (legacy)
//!
//! The older orchestration model: the scene is snapshotted into a
//! [`PassBuffer`] per frame, and the deferred path packs geometry through the
//! standalone [`GBuffer`] with explicit pack, unpack, and restore steps
//! around the shading dispatch, since the packer's surfaces have no
//! simultaneous read/write split of their own.
//!
//! Superseded by [`Renderer`], whose phase binder covers the same ground with
//! anti-aliased surface sets and the full post-processing chain. This path
//! only supports [`AaDescriptor::None`] and skips AA resolve and depth of
//! field.

use std::sync::Arc;

use crate::config::AaDescriptor;
use crate::errors::{RenderError, Result};
use crate::scene::camera::BasePipeline;
use crate::scene::Scene;

use super::core::CameraUniforms;
use super::output::{GBuffer, SurfaceId};
use super::passes::deferred::DeferredShadingPass;
use super::passes::forward::ForwardSubPass;
use super::{MESH_IDLE_FRAMES, Renderer};

/// Per-frame snapshot of the renderable scene state.
///
/// Cameras are filtered to active ones at extraction time; models keep their
/// shared mesh handles while materials are deep-copied with the model value.
#[derive(Default)]
pub struct PassBuffer {
    scene: Scene,
}

impl PassBuffer {
    /// Replaces the snapshot with the current scene contents.
    pub fn extract(&mut self, scene: &Scene) {
        self.scene.cameras.clear();
        self.scene
            .cameras
            .extend(scene.cameras.iter().filter(|c| c.active).cloned());
        self.scene.models.clear();
        self.scene.models.extend_from_slice(&scene.models);
        self.scene.ambient = scene.ambient;
        self.scene
            .directional_lights
            .clone_from(&scene.directional_lights);
        self.scene.point_lights.clone_from(&scene.point_lights);
        self.scene.sprites.clone_from(&scene.sprites);
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[deprecated(
    note = "superseded by `Renderer`; the phase binder subsumes the packer's read/write split"
)]
pub struct SceneRenderer {
    renderer: Renderer,
    gbuffer: GBuffer,
    deferred_pass: DeferredShadingPass,
    buffer: PassBuffer,
}

#[allow(deprecated)]
impl SceneRenderer {
    /// Wraps an existing renderer. The packer path has no resolve step, so
    /// any anti-aliasing descriptor other than `None` is rejected.
    pub fn new(renderer: Renderer) -> Result<Self> {
        if renderer.display().aa != AaDescriptor::None {
            return Err(RenderError::SurfaceConfiguration(
                "the scene renderer's packer path requires AaDescriptor::None".to_string(),
            ));
        }
        let display = renderer.display().clone();
        let device = &renderer.context.device;
        let gbuffer = GBuffer::new(device, &display)?;
        let deferred_pass = DeferredShadingPass::for_packer(
            device,
            &renderer.frame,
            &gbuffer,
            renderer.output().view(SurfaceId::Hdr),
            display.width,
            display.height,
        );
        Ok(Self {
            renderer,
            gbuffer,
            deferred_pass,
            buffer: PassBuffer::default(),
        })
    }

    /// Recovers the wrapped renderer.
    #[must_use]
    pub fn into_inner(self) -> Renderer {
        self.renderer
    }

    /// Snapshots `scene`, renders the snapshot, and presents.
    pub fn render(&mut self, scene: &Scene) -> Result<()> {
        self.buffer.extract(scene);

        let r = &mut self.renderer;
        let back = r.context.begin_frame()?;
        let back_view = back
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = r
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Frame Encoder"),
            });

        let snapshot = &self.buffer.scene;
        r.models.upload(&r.context.queue, &snapshot.models);
        r.meshes.prepare(&r.context.device, &snapshot.models);
        r.overlay_pass.prepare(&r.context.queue, &snapshot.models);
        r.sprite_pass.prepare(&r.context.queue, &snapshot.sprites);

        let base_color = Arc::clone(self.gbuffer.view(SurfaceId::GBufferBaseColor));
        let material = Arc::clone(self.gbuffer.view(SurfaceId::GBufferMaterial));
        let normal = Arc::clone(self.gbuffer.view(SurfaceId::GBufferNormal));
        let depth = Arc::clone(self.gbuffer.view(SurfaceId::GBufferDepth));
        let hdr = Arc::clone(r.output().view(SurfaceId::Hdr));

        let mut first_camera = true;
        for camera in &snapshot.cameras {
            r.frame
                .camera
                .update(&r.context.queue, &CameraUniforms::new(camera, 1));
            r.sky_pass.update(&r.context.queue, &camera.settings.sky);
            let viewport = camera.viewport;
            let mode = camera.settings.render_mode;

            Renderer::clear_surfaces(
                &mut encoder,
                [&base_color, &material, &normal, &hdr],
                &depth,
            );

            if mode.depth_prepass() {
                r.depth_pass.render(
                    &mut encoder,
                    &depth,
                    false,
                    viewport,
                    &r.frame,
                    &r.models,
                    &r.meshes,
                    &snapshot.models,
                );
            }

            let forward = |sub_pass, encoder: &mut wgpu::CommandEncoder| {
                r.forward_pass.render(
                    encoder,
                    sub_pass,
                    &hdr,
                    &normal,
                    &depth,
                    false,
                    viewport,
                    &r.frame,
                    &r.models,
                    &r.meshes,
                    &snapshot.models,
                );
            };

            match mode.base_pipeline() {
                BasePipeline::Deferred => {
                    r.lbuffer_pass.update(&r.context.queue, &r.frame, snapshot);

                    self.gbuffer.binder_mut().bind_packing();
                    let _ = self.gbuffer.binder_mut().take_clear_pending();
                    r.gbuffer_pass.render(
                        &mut encoder,
                        [&base_color, &material, &normal],
                        &depth,
                        false,
                        viewport,
                        &r.frame,
                        &r.models,
                        &r.meshes,
                        &snapshot.models,
                    );

                    self.gbuffer.binder_mut().bind_unpacking();
                    self.deferred_pass.dispatch(&mut encoder, &r.frame);
                    self.gbuffer.binder_mut().bind_restore();

                    forward(ForwardSubPass::Emissive, &mut encoder);
                    r.sky_pass
                        .render(&mut encoder, &hdr, &normal, &depth, viewport, &r.frame);
                    forward(ForwardSubPass::Transparent, &mut encoder);
                }
                BasePipeline::Forward => {
                    r.lbuffer_pass.update(&r.context.queue, &r.frame, snapshot);
                    forward(ForwardSubPass::Opaque, &mut encoder);
                    r.sky_pass
                        .render(&mut encoder, &hdr, &normal, &depth, viewport, &r.frame);
                    forward(ForwardSubPass::Transparent, &mut encoder);
                }
                BasePipeline::Solid => {
                    r.lbuffer_pass.update(&r.context.queue, &r.frame, snapshot);
                    forward(ForwardSubPass::Solid, &mut encoder);
                }
                BasePipeline::Component(view) => {
                    r.component_pass.update(&r.context.queue, view);
                    r.component_pass.render(
                        &mut encoder,
                        &hdr,
                        &depth,
                        false,
                        viewport,
                        &r.frame,
                        &r.models,
                        &r.meshes,
                        &snapshot.models,
                    );
                }
                BasePipeline::None => {}
            }

            let layers = camera.settings.render_layers;
            if layers.contains(crate::scene::camera::RenderLayer::WIREFRAME) {
                r.overlay_pass.render_wireframe(
                    &mut encoder,
                    &hdr,
                    &depth,
                    viewport,
                    &r.frame,
                    &r.meshes,
                    &snapshot.models,
                );
            }
            if layers.contains(crate::scene::camera::RenderLayer::AABB) {
                r.overlay_pass.render_aabb(
                    &mut encoder,
                    &hdr,
                    &depth,
                    viewport,
                    &r.frame,
                    &snapshot.models,
                );
            }

            // With AA off the first post-processing surface aliases HDR, so
            // the composite reads the shaded image directly.
            let clear = first_camera.then_some(r.context.clear_color);
            r.back_buffer_pass.render(
                &mut encoder,
                &back_view,
                clear,
                camera.viewport,
                &r.frame,
                SurfaceId::PostProcessHdr0,
            );
            first_camera = false;
        }

        if first_camera {
            Renderer::clear_back_buffer(&mut encoder, &back_view, r.context.clear_color);
        }
        r.sprite_pass.render(&mut encoder, &back_view, &r.frame);

        r.context.queue.submit(Some(encoder.finish()));
        r.meshes.end_frame(MESH_IDLE_FRAMES);
        r.context.end_frame(back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Camera, Material, Model, StaticMesh};
    use glam::Vec4;

    #[test]
    fn extract_keeps_only_active_cameras() {
        let mut scene = Scene::new();
        scene
            .cameras
            .push(Camera::new_perspective(60.0, 640, 480, 0.1, 100.0));
        let mut inactive = Camera::new_perspective(60.0, 640, 480, 0.1, 100.0);
        inactive.active = false;
        scene.cameras.push(inactive);

        let mut buffer = PassBuffer::default();
        buffer.extract(&scene);
        assert_eq!(buffer.scene().cameras.len(), 1);
    }

    #[test]
    fn extracted_models_share_meshes_but_own_materials() {
        let mut scene = Scene::new();
        scene
            .models
            .push(Model::new(std::sync::Arc::new(StaticMesh::cube())));

        let mut buffer = PassBuffer::default();
        buffer.extract(&scene);
        let copy = &buffer.scene().models[0];
        assert!(std::sync::Arc::ptr_eq(&copy.mesh, &scene.models[0].mesh));

        // The snapshot's material is its own; mutating it must not leak back.
        let mut buffer2 = PassBuffer::default();
        buffer2.extract(&scene);
        buffer2.scene.models[0].material = Material {
            base_color: Vec4::ZERO,
            ..Material::default()
        };
        assert_ne!(
            buffer2.scene().models[0].material.base_color,
            scene.models[0].material.base_color
        );
    }
}
