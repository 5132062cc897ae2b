//! Renderer
//!
//! The top-level frame orchestrator. Per active camera it derives the pass
//! [`schedule`](schedule::schedule) from the camera's render mode, overlay
//! layers, anti-aliasing descriptor, and lens, then executes the steps in
//! order, walking the output manager's phase binder between them so binding
//! state never leaks across phases. After every camera has composited into
//! the back buffer, the sprite overlay draws once over the whole surface.
//!
//! All GPU work for a frame goes through one command encoder submitted once,
//! bracketed by [`GpuContext::begin_frame`] / [`GpuContext::end_frame`].

pub mod core;
pub mod mesh;
pub mod output;
pub mod passes;
pub mod schedule;
pub mod scene_renderer;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::config::{DisplayConfig, RendererSettings};
use crate::errors::Result;
use crate::scene::Scene;

use core::{CameraUniforms, FrameUniforms, GpuContext};
use mesh::MeshCache;
use output::{OutputManager, SurfaceId};
use passes::aa::AaPass;
use passes::back_buffer::BackBufferPass;
use passes::component::ComponentPass;
use passes::deferred::DeferredShadingPass;
use passes::depth::DepthPass;
use passes::dof::DofPass;
use passes::forward::{ForwardPass, ForwardSubPass};
use passes::gbuffer::GBufferPass;
use passes::lbuffer::LBufferPass;
use passes::overlay::OverlayPass;
use passes::sky::SkyPass;
use passes::sprite::SpritePass;
use passes::{FrameBindings, ModelUniformArray};
use schedule::{CameraStep, DeferredDispatch, schedule};

#[allow(deprecated)]
pub use scene_renderer::SceneRenderer;

/// Frames a mesh upload survives in the cache without being drawn.
const MESH_IDLE_FRAMES: u64 = 120;

pub struct Renderer {
    pub(crate) context: GpuContext,
    display: DisplayConfig,

    pub(crate) frame: FrameBindings,
    pub(crate) models: ModelUniformArray,
    pub(crate) meshes: MeshCache,
    output: OutputManager,

    pub(crate) depth_pass: DepthPass,
    pub(crate) gbuffer_pass: GBufferPass,
    pub(crate) lbuffer_pass: LBufferPass,
    deferred_pass: DeferredShadingPass,
    pub(crate) forward_pass: ForwardPass,
    pub(crate) sky_pass: SkyPass,
    pub(crate) component_pass: ComponentPass,
    pub(crate) overlay_pass: OverlayPass,
    aa_pass: AaPass,
    dof_pass: DofPass,
    pub(crate) back_buffer_pass: BackBufferPass,
    pub(crate) sprite_pass: SpritePass,
}

impl Renderer {
    /// Creates the GPU context for `window` and builds the renderer.
    pub async fn new<W>(window: W, settings: RendererSettings) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let context = GpuContext::new(window, &settings).await?;
        Self::from_context(context, settings.display)
    }

    /// Builds the renderer over an existing GPU context.
    pub fn from_context(context: GpuContext, display: DisplayConfig) -> Result<Self> {
        let device = &context.device;
        let frame = FrameBindings::new(device);
        let models = ModelUniformArray::new(device);
        let output = OutputManager::new(device, &display)?;

        let sample_count = display.aa.sample_count();
        let surface_format = context.color_format();
        let depth_pass = DepthPass::new(device, &frame, &models, sample_count);
        let gbuffer_pass = GBufferPass::new(device, &frame, &models, sample_count);
        let lbuffer_pass = LBufferPass::new();
        let deferred_pass =
            DeferredShadingPass::new(device, &frame, &output, display.aa.uses_msaa());
        let forward_pass = ForwardPass::new(device, &frame, &models, sample_count);
        let sky_pass = SkyPass::new(device, &frame, sample_count);
        let component_pass = ComponentPass::new(device, &frame, &models, sample_count);
        let overlay_pass = OverlayPass::new(device, &frame, sample_count);
        let aa_pass = AaPass::new(device, &frame, &output, display.aa);
        let dof_pass = DofPass::new(device, &frame, &output);
        let back_buffer_pass = BackBufferPass::new(device, &frame, &output, surface_format);
        let sprite_pass = SpritePass::new(device, &frame, surface_format);

        let renderer = Self {
            context,
            display,
            frame,
            models,
            meshes: MeshCache::new(),
            output,
            depth_pass,
            gbuffer_pass,
            lbuffer_pass,
            deferred_pass,
            forward_pass,
            sky_pass,
            component_pass,
            overlay_pass,
            aa_pass,
            dof_pass,
            back_buffer_pass,
            sprite_pass,
        };
        renderer.bind_persistent_state();
        Ok(renderer)
    }

    /// Uploads the frame constant buffer. Called at construction and after
    /// every display configuration change; the values are stable in between.
    pub fn bind_persistent_state(&self) {
        self.frame
            .frame
            .update(&self.context.queue, &FrameUniforms::new(&self.display));
    }

    #[inline]
    #[must_use]
    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    #[inline]
    #[must_use]
    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    #[inline]
    #[must_use]
    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    /// Resizes the presentation surface and rebuilds the frame surfaces.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.context.resize(width, height);
        let mut display = self.display.clone();
        display.width = width;
        display.height = height;
        self.set_display(display)
    }

    /// Swaps the display configuration, reallocating every surface and
    /// sample-count-dependent pipeline.
    pub fn set_display(&mut self, display: DisplayConfig) -> Result<()> {
        self.display = display;
        let device = &self.context.device;
        self.output = OutputManager::new(device, &self.display)?;

        let sample_count = self.display.aa.sample_count();
        let surface_format = self.context.color_format();
        self.depth_pass = DepthPass::new(device, &self.frame, &self.models, sample_count);
        self.gbuffer_pass = GBufferPass::new(device, &self.frame, &self.models, sample_count);
        self.deferred_pass =
            DeferredShadingPass::new(device, &self.frame, &self.output, self.display.aa.uses_msaa());
        self.forward_pass = ForwardPass::new(device, &self.frame, &self.models, sample_count);
        self.sky_pass = SkyPass::new(device, &self.frame, sample_count);
        self.component_pass = ComponentPass::new(device, &self.frame, &self.models, sample_count);
        self.overlay_pass = OverlayPass::new(device, &self.frame, sample_count);
        self.aa_pass = AaPass::new(device, &self.frame, &self.output, self.display.aa);
        self.dof_pass = DofPass::new(device, &self.frame, &self.output);
        self.back_buffer_pass = BackBufferPass::new(device, &self.frame, &self.output, surface_format);

        self.bind_persistent_state();
        log::info!(
            "display reconfigured: {}x{} aa={:?}",
            self.display.width,
            self.display.height,
            self.display.aa
        );
        Ok(())
    }

    /// Renders one frame of `scene` and presents it.
    pub fn render(&mut self, scene: &Scene) -> Result<()> {
        let back = self.context.begin_frame()?;
        let back_view = back
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.models.upload(&self.context.queue, &scene.models);
        self.meshes.prepare(&self.context.device, &scene.models);
        self.overlay_pass.prepare(&self.context.queue, &scene.models);
        self.sprite_pass.prepare(&self.context.queue, &scene.sprites);

        let mult = self.display.aa.resolution_multiplier();
        let base_color = self.output.view(SurfaceId::GBufferBaseColor).clone();
        let material = self.output.view(SurfaceId::GBufferMaterial).clone();
        let normal = self.output.view(SurfaceId::GBufferNormal).clone();
        let depth = self.output.view(SurfaceId::GBufferDepth).clone();
        let hdr = self.output.view(SurfaceId::Hdr).clone();

        let mut first_camera = true;
        for camera in scene.cameras.iter().filter(|c| c.active) {
            self.frame
                .camera
                .update(&self.context.queue, &CameraUniforms::new(camera, mult));
            self.sky_pass.update(&self.context.queue, &camera.settings.sky);
            let ss_viewport = camera.ss_viewport(mult);

            self.output.binder_mut().bind_begin();
            if self.output.binder_mut().take_clear_pending() {
                Self::clear_surfaces(&mut encoder, [&base_color, &material, &normal, &hdr], &depth);
            }

            let steps = schedule(
                camera.settings.render_mode,
                camera.settings.render_layers,
                self.display.aa,
                &camera.lens,
            );
            let mut post_processing_open = false;
            for step in steps {
                match step {
                    CameraStep::LightingUpdate => {
                        self.lbuffer_pass
                            .update(&self.context.queue, &self.frame, scene);
                    }
                    CameraStep::DepthPrePass => {
                        self.depth_pass.render(
                            &mut encoder,
                            &depth,
                            false,
                            ss_viewport,
                            &self.frame,
                            &self.models,
                            &self.meshes,
                            &scene.models,
                        );
                    }
                    CameraStep::GBufferPass => {
                        self.output.binder_mut().bind_begin_gbuffer();
                        self.gbuffer_pass.render(
                            &mut encoder,
                            [&base_color, &material, &normal],
                            &depth,
                            false,
                            ss_viewport,
                            &self.frame,
                            &self.models,
                            &self.meshes,
                            &scene.models,
                        );
                        self.output.binder_mut().bind_end_gbuffer();
                    }
                    CameraStep::DeferredShading(dispatch) => {
                        self.output.binder_mut().bind_begin_deferred();
                        match dispatch {
                            DeferredDispatch::Compute => {
                                self.deferred_pass.dispatch(&mut encoder, &self.frame);
                            }
                            DeferredDispatch::GraphicsDraw => {
                                self.deferred_pass.render(
                                    &mut encoder,
                                    &hdr,
                                    ss_viewport,
                                    &self.frame,
                                );
                            }
                        }
                        self.output.binder_mut().bind_end_deferred();
                    }
                    CameraStep::ForwardOpaque
                    | CameraStep::ForwardEmissive
                    | CameraStep::ForwardTransparent
                    | CameraStep::SolidForward => {
                        let sub_pass = match step {
                            CameraStep::ForwardOpaque => ForwardSubPass::Opaque,
                            CameraStep::ForwardEmissive => ForwardSubPass::Emissive,
                            CameraStep::ForwardTransparent => ForwardSubPass::Transparent,
                            _ => ForwardSubPass::Solid,
                        };
                        self.output.binder_mut().bind_begin_forward();
                        self.forward_pass.render(
                            &mut encoder,
                            sub_pass,
                            &hdr,
                            &normal,
                            &depth,
                            false,
                            ss_viewport,
                            &self.frame,
                            &self.models,
                            &self.meshes,
                            &scene.models,
                        );
                        self.output.binder_mut().bind_end_forward();
                    }
                    CameraStep::Sky => {
                        self.output.binder_mut().bind_begin_forward();
                        self.sky_pass
                            .render(&mut encoder, &hdr, &normal, &depth, ss_viewport, &self.frame);
                        self.output.binder_mut().bind_end_forward();
                    }
                    CameraStep::Component(view) => {
                        self.component_pass.update(&self.context.queue, view);
                        self.output.binder_mut().bind_begin_forward();
                        self.component_pass.render(
                            &mut encoder,
                            &hdr,
                            &depth,
                            false,
                            ss_viewport,
                            &self.frame,
                            &self.models,
                            &self.meshes,
                            &scene.models,
                        );
                        self.output.binder_mut().bind_end_forward();
                    }
                    CameraStep::WireframeOverlay => {
                        self.output.binder_mut().bind_begin_forward();
                        self.overlay_pass.render_wireframe(
                            &mut encoder,
                            &hdr,
                            &depth,
                            ss_viewport,
                            &self.frame,
                            &self.meshes,
                            &scene.models,
                        );
                        self.output.binder_mut().bind_end_forward();
                    }
                    CameraStep::AabbOverlay => {
                        self.output.binder_mut().bind_begin_forward();
                        self.overlay_pass.render_aabb(
                            &mut encoder,
                            &hdr,
                            &depth,
                            ss_viewport,
                            &self.frame,
                            &scene.models,
                        );
                        self.output.binder_mut().bind_end_forward();
                    }
                    CameraStep::FxaaPreprocess => {
                        self.output.binder_mut().bind_begin_resolve();
                        self.aa_pass.dispatch_preprocess(&mut encoder, &self.frame);
                        self.output.binder_mut().bind_end_resolve();
                    }
                    CameraStep::AaResolve => {
                        if self.display.aa.requires_resolve() {
                            self.output.binder_mut().bind_begin_resolve();
                            let source = self.output.binder().post_process_source();
                            self.aa_pass.dispatch_resolve(
                                &mut encoder,
                                &self.context.queue,
                                &self.frame,
                                source,
                            );
                            self.output.binder_mut().bind_end_resolve();
                        } else {
                            // FXAA runs over the ping-pong pair.
                            self.open_post_processing(&mut post_processing_open);
                            let source = self.output.binder().post_process_source();
                            self.output.binder_mut().bind_ping_pong();
                            self.aa_pass.dispatch_resolve(
                                &mut encoder,
                                &self.context.queue,
                                &self.frame,
                                source,
                            );
                        }
                    }
                    CameraStep::DepthOfField => {
                        self.open_post_processing(&mut post_processing_open);
                        let source = self.output.binder().post_process_source();
                        self.output.binder_mut().bind_ping_pong();
                        self.dof_pass.dispatch(&mut encoder, &self.frame, source);
                    }
                    CameraStep::BackBufferComposite => {
                        self.output.binder_mut().bind_end();
                        let source = self.output.binder().post_process_source();
                        let clear = first_camera.then_some(self.context.clear_color);
                        self.back_buffer_pass.render(
                            &mut encoder,
                            &back_view,
                            clear,
                            camera.viewport,
                            &self.frame,
                            source,
                        );
                    }
                }
            }
            first_camera = false;
        }

        if first_camera {
            // No active camera composited; still clear the back buffer.
            Self::clear_back_buffer(&mut encoder, &back_view, self.context.clear_color);
        }
        self.sprite_pass.render(&mut encoder, &back_view, &self.frame);

        self.context.queue.submit(Some(encoder.finish()));
        self.meshes.end_frame(MESH_IDLE_FRAMES);
        self.context.end_frame(back)
    }

    fn open_post_processing(&mut self, open: &mut bool) {
        if !*open {
            self.output.binder_mut().bind_begin_post_processing();
            *open = true;
        }
    }

    /// Full clear of the shading surfaces between cameras. Load-op clears
    /// always cover the whole attachment, so this runs before each camera's
    /// passes and every pass afterwards loads.
    fn clear_surfaces(
        encoder: &mut wgpu::CommandEncoder,
        color_views: [&wgpu::TextureView; 4],
        depth_view: &wgpu::TextureView,
    ) {
        let attachment = |view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })
        };
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Surface Clear"),
            color_attachments: &[
                attachment(color_views[0]),
                attachment(color_views[1]),
                attachment(color_views[2]),
                attachment(color_views[3]),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
    }

    fn clear_back_buffer(
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        color: wgpu::Color,
    ) {
        let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Back Buffer Clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });
    }
}
