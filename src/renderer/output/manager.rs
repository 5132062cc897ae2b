//! Output Manager
//!
//! Owns every intermediate frame surface and the binding transitions between
//! rendering phases. Surfaces are allocated once at construction from a
//! [`FrameLayout`]; the paired `bind_begin_*`/`bind_end_*` operations then
//! walk the [`BindingTable`] through each phase so binding state never leaks
//! from one phase into the next. A display configuration change requires
//! reconstruction; nothing reallocates mid-frame.
//!
//! The phase sequencing itself lives in [`PhaseBinder`], which carries no GPU
//! handles and can be driven in tests without a device.

use std::sync::Arc;

use crate::config::DisplayConfig;
use crate::errors::{RenderError, Result};

use super::bindings::BindingTable;
use super::create_surface;
use super::layout::{FrameLayout, SurfaceId};

/// Which of the two post-processing HDR surfaces holds the source image.
///
/// Starts at "HDR0 is source" and flips on every ping-pong dispatch. The
/// final composite reads whichever surface the flag designates at that time.
#[derive(Debug, Clone, Copy)]
struct PingPong {
    hdr0_to_hdr1: bool,
}

impl PingPong {
    const fn new() -> Self {
        Self { hdr0_to_hdr1: true }
    }

    fn reset(&mut self) {
        self.hdr0_to_hdr1 = true;
    }

    fn source(self) -> SurfaceId {
        if self.hdr0_to_hdr1 {
            SurfaceId::PostProcessHdr0
        } else {
            SurfaceId::PostProcessHdr1
        }
    }

    fn target(self) -> SurfaceId {
        if self.hdr0_to_hdr1 {
            SurfaceId::PostProcessHdr1
        } else {
            SurfaceId::PostProcessHdr0
        }
    }

    fn flip(&mut self) {
        self.hdr0_to_hdr1 = !self.hdr0_to_hdr1;
    }
}

const GBUFFER_SURFACES: [SurfaceId; 4] = [
    SurfaceId::GBufferBaseColor,
    SurfaceId::GBufferMaterial,
    SurfaceId::GBufferNormal,
    SurfaceId::GBufferDepth,
];

/// The phase-binding state machine, independent of any GPU allocation.
#[derive(Debug)]
pub struct PhaseBinder {
    bindings: BindingTable,
    ping_pong: PingPong,
    uses_msaa: bool,
    clear_pending: bool,
}

impl PhaseBinder {
    #[must_use]
    pub fn new(uses_msaa: bool) -> Self {
        Self {
            bindings: BindingTable::new(),
            ping_pong: PingPong::new(),
            uses_msaa,
            clear_pending: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Whether the surfaces still carry last frame's contents. Consumed by
    /// the first pass that opens them as targets, which clears instead of
    /// loading.
    pub fn take_clear_pending(&mut self) -> bool {
        std::mem::take(&mut self.clear_pending)
    }

    /// Current ping-pong read source for post-processing.
    #[must_use]
    pub fn post_process_source(&self) -> SurfaceId {
        self.ping_pong.source()
    }

    /// Current ping-pong write target for post-processing.
    #[must_use]
    pub fn post_process_target(&self) -> SurfaceId {
        self.ping_pong.target()
    }

    /// Opens the frame: schedule clears for the G-buffer and depth surfaces,
    /// drop any stale read bindings for them and the HDR surface, and reset
    /// the ping-pong state.
    pub fn bind_begin(&mut self) {
        for id in GBUFFER_SURFACES {
            self.bindings.unbind_input(id);
        }
        self.bindings.unbind_input(SurfaceId::Hdr);
        self.bindings.clear_write_targets();
        self.clear_pending = true;
        self.ping_pong.reset();
    }

    /// Binds the three G-buffer channels plus depth as write targets.
    pub fn bind_begin_gbuffer(&mut self) {
        self.bindings.set_color_targets(&[
            SurfaceId::GBufferBaseColor,
            SurfaceId::GBufferMaterial,
            SurfaceId::GBufferNormal,
        ]);
        self.bindings.set_depth_target(Some(SurfaceId::GBufferDepth));
    }

    pub fn bind_end_gbuffer(&mut self) {
        self.bindings.clear_write_targets();
    }

    /// Binds the G-buffer for reading and the HDR surface for writing. With
    /// MSAA the HDR surface is a color target (graphics path); otherwise it
    /// is a compute storage target.
    pub fn bind_begin_deferred(&mut self) {
        if self.uses_msaa {
            self.bindings.bind_fragment_inputs(&GBUFFER_SURFACES);
            self.bindings.set_color_targets(&[SurfaceId::Hdr]);
        } else {
            self.bindings.bind_compute_inputs(&GBUFFER_SURFACES);
            self.bindings.set_compute_outputs(&[SurfaceId::Hdr]);
        }
    }

    pub fn bind_end_deferred(&mut self) {
        if self.uses_msaa {
            self.bindings.unbind_fragment_inputs(&GBUFFER_SURFACES);
        } else {
            self.bindings.unbind_compute_inputs(&GBUFFER_SURFACES);
        }
        self.bindings.clear_write_targets();
    }

    /// Binds HDR plus the G-buffer normal as write targets with depth, for
    /// emissive/sky/transparent draws layered over the deferred result.
    pub fn bind_begin_forward(&mut self) {
        self.bindings
            .set_color_targets(&[SurfaceId::Hdr, SurfaceId::GBufferNormal]);
        self.bindings.set_depth_target(Some(SurfaceId::GBufferDepth));
    }

    pub fn bind_end_forward(&mut self) {
        self.bindings.clear_write_targets();
    }

    /// Binds HDR/normal/depth for compute reads and the three post-processing
    /// surfaces as storage outputs for the resolve dispatch.
    pub fn bind_begin_resolve(&mut self) {
        self.bindings.bind_compute_inputs(&[
            SurfaceId::Hdr,
            SurfaceId::GBufferNormal,
            SurfaceId::GBufferDepth,
        ]);
        self.bindings.set_compute_outputs(&[
            SurfaceId::PostProcessHdr0,
            SurfaceId::PostProcessNormal,
            SurfaceId::PostProcessDepth,
        ]);
    }

    pub fn bind_end_resolve(&mut self) {
        self.bindings.unbind_compute_inputs(&[
            SurfaceId::Hdr,
            SurfaceId::GBufferNormal,
            SurfaceId::GBufferDepth,
        ]);
        self.bindings.clear_compute_outputs();
    }

    /// Binds the resolved depth/normal surfaces for post-processing reads.
    pub fn bind_begin_post_processing(&mut self) {
        self.bindings
            .bind_compute_inputs(&[SurfaceId::PostProcessNormal, SurfaceId::PostProcessDepth]);
    }

    /// Swaps the post-processing source/target pair for one dispatch. The
    /// current source becomes readable and the other surface writable, then
    /// the flag flips so the next dispatch (or the final composite) sees the
    /// freshly written surface as source.
    pub fn bind_ping_pong(&mut self) {
        self.bindings.bind_compute_inputs(&[self.ping_pong.source()]);
        self.bindings.set_compute_outputs(&[self.ping_pong.target()]);
        self.ping_pong.flip();
    }

    /// Closes the frame: the presentation surface becomes the write target
    /// and the current ping-pong source the final read input.
    pub fn bind_end(&mut self) {
        self.bindings.clear_compute_outputs();
        self.bindings.bind_fragment_inputs(&[self.ping_pong.source()]);
        self.bindings.set_back_buffer_target();
    }
}

/// Surface lifecycle and phase binder for one display configuration.
pub struct OutputManager {
    layout: FrameLayout,
    views: Vec<Arc<wgpu::TextureView>>,
    binder: PhaseBinder,
}

impl OutputManager {
    /// Allocates all frame surfaces. Any creation failure is fatal; there is
    /// no partially constructed manager.
    pub fn new(device: &wgpu::Device, display: &DisplayConfig) -> Result<Self> {
        let layout = FrameLayout::new(display);

        let mut allocated: Vec<Option<Arc<wgpu::TextureView>>> =
            vec![None; SurfaceId::ALL.len()];
        for (id, desc) in layout.concrete_surfaces() {
            let view = create_surface(device, id.label(), &desc)?;
            allocated[id.index()] = Some(Arc::new(view));
        }

        // Aliased slots share the owning surface's view, so identity holds.
        let views = SurfaceId::ALL
            .iter()
            .map(|&id| {
                let owner = layout.resolve(id);
                allocated[owner.index()]
                    .clone()
                    .ok_or(RenderError::SurfaceCreation {
                        label: id.label(),
                        reason: "alias target missing".to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "output surfaces allocated for {}x{} aa={:?}",
            display.width,
            display.height,
            display.aa
        );

        Ok(Self {
            layout,
            views,
            binder: PhaseBinder::new(display.aa.uses_msaa()),
        })
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// The texture view backing `id`, shared with its alias target if any.
    #[inline]
    #[must_use]
    pub fn view(&self, id: SurfaceId) -> &Arc<wgpu::TextureView> {
        &self.views[id.index()]
    }

    #[inline]
    #[must_use]
    pub fn binder(&self) -> &PhaseBinder {
        &self.binder
    }

    #[inline]
    pub fn binder_mut(&mut self) -> &mut PhaseBinder {
        &mut self.binder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ping_pong_alternates_strictly() {
        let mut flag = PingPong::new();
        for n in 1..=8 {
            flag.flip();
            let hdr0_is_source = flag.source() == SurfaceId::PostProcessHdr0;
            assert_eq!(hdr0_is_source, n % 2 == 0, "after {n} flips");
        }
    }

    #[test]
    fn reset_restores_hdr0_as_source() {
        let mut flag = PingPong::new();
        flag.flip();
        flag.flip();
        flag.flip();
        flag.reset();
        assert_eq!(flag.source(), SurfaceId::PostProcessHdr0);
        assert_eq!(flag.target(), SurfaceId::PostProcessHdr1);
    }

    #[test]
    fn bind_begin_resets_ping_pong() {
        let mut binder = PhaseBinder::new(false);
        binder.bind_ping_pong();
        binder.bind_ping_pong();
        binder.bind_ping_pong();
        assert_eq!(binder.post_process_source(), SurfaceId::PostProcessHdr1);
        binder.bind_begin();
        assert_eq!(binder.post_process_source(), SurfaceId::PostProcessHdr0);
    }

    #[test]
    fn deferred_path_depends_on_msaa() {
        let mut compute = PhaseBinder::new(false);
        compute.bind_begin_deferred();
        assert_eq!(compute.bindings().compute_outputs(), &[SurfaceId::Hdr]);
        assert!(compute.bindings().color_targets().is_empty());

        let mut graphics = PhaseBinder::new(true);
        graphics.bind_begin_deferred();
        assert_eq!(graphics.bindings().color_targets(), &[SurfaceId::Hdr]);
        assert!(graphics.bindings().compute_outputs().is_empty());
    }

    #[test]
    fn phase_ends_unbind_symmetrically() {
        let mut binder = PhaseBinder::new(false);
        binder.bind_begin();
        binder.take_clear_pending();

        binder.bind_begin_gbuffer();
        binder.bind_end_gbuffer();
        binder.bind_begin_deferred();
        binder.bind_end_deferred();
        binder.bind_begin_forward();
        binder.bind_end_forward();
        binder.bind_begin_resolve();
        binder.bind_end_resolve();

        let b = binder.bindings();
        assert!(b.color_targets().is_empty());
        assert!(b.compute_outputs().is_empty());
        assert!(b.fragment_inputs().is_empty());
        assert!(b.compute_inputs().is_empty());
        assert_eq!(b.depth_target(), None);
    }

    #[test]
    fn bind_end_reads_last_written_surface() {
        let mut binder = PhaseBinder::new(false);
        binder.bind_begin();
        binder.bind_ping_pong();
        binder.bind_end();
        let b = binder.bindings();
        assert!(b.back_buffer_is_target());
        assert!(b.fragment_inputs().contains(&SurfaceId::PostProcessHdr1));
    }
}
