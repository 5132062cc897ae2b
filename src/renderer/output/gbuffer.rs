//! Geometry-Channel Packer
//!
//! A narrower counterpart to the output manager's G-buffer handling, used by
//! the snapshot renderer. Owns exactly one depth surface and three color
//! surfaces (base color, material, normal), all at display resolution and
//! single sampled. Packing and unpacking are mutually exclusive states;
//! entering one always fully undoes the other's bindings first.

use std::sync::Arc;

use crate::config::DisplayConfig;
use crate::errors::Result;

use super::bindings::BindingTable;
use super::create_surface;
use super::layout::{
    BASE_COLOR_FORMAT, DEPTH_FORMAT, MATERIAL_FORMAT, NORMAL_FORMAT, SurfaceDesc, SurfaceId,
};

const CHANNELS: [SurfaceId; 3] = [
    SurfaceId::GBufferBaseColor,
    SurfaceId::GBufferMaterial,
    SurfaceId::GBufferNormal,
];

/// Binding state of the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackerState {
    #[default]
    Unbound,
    /// Channels bound as write targets.
    Packing,
    /// Channels bound as read inputs to both pixel and compute stages.
    Unpacking,
}

/// Pure pack/unpack state machine, testable without a device.
#[derive(Debug, Default)]
pub struct PackerBinder {
    bindings: BindingTable,
    state: PackerState,
    clear_pending: bool,
}

impl PackerBinder {
    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PackerState {
        self.state
    }

    pub fn take_clear_pending(&mut self) -> bool {
        std::mem::take(&mut self.clear_pending)
    }

    /// Unbind all channels as read inputs, schedule the clears, then bind
    /// the color channels plus depth as write targets.
    pub fn bind_packing(&mut self) {
        for id in CHANNELS {
            self.bindings.unbind_input(id);
        }
        self.bindings.unbind_input(SurfaceId::GBufferDepth);
        self.clear_pending = true;
        self.bindings.set_color_targets(&CHANNELS);
        self.bindings.set_depth_target(Some(SurfaceId::GBufferDepth));
        self.state = PackerState::Packing;
    }

    /// Unbind all write targets, then expose the color channels to both the
    /// pixel and compute stages.
    pub fn bind_unpacking(&mut self) {
        self.bindings.clear_write_targets();
        self.bindings.bind_fragment_inputs(&CHANNELS);
        self.bindings.bind_compute_inputs(&CHANNELS);
        self.state = PackerState::Unpacking;
    }

    /// Drops every packer binding and returns the write target to the back
    /// buffer.
    pub fn bind_restore(&mut self) {
        self.bindings.clear_write_targets();
        for id in CHANNELS {
            self.bindings.unbind_input(id);
        }
        self.bindings.unbind_input(SurfaceId::GBufferDepth);
        self.bindings.set_back_buffer_target();
        self.state = PackerState::Unbound;
    }
}

/// The packer's surfaces plus its binding state machine.
pub struct GBuffer {
    views: [Arc<wgpu::TextureView>; 4],
    binder: PackerBinder,
}

impl GBuffer {
    /// Allocates the four surfaces at display resolution. Creation failures
    /// abort construction.
    pub fn new(device: &wgpu::Device, display: &DisplayConfig) -> Result<Self> {
        let color = |format| SurfaceDesc {
            width: display.width,
            height: display.height,
            sample_count: 1,
            format,
            compute_writable: false,
        };
        let views = [
            Arc::new(create_surface(device, "GBuffer Base Color", &color(BASE_COLOR_FORMAT))?),
            Arc::new(create_surface(device, "GBuffer Material", &color(MATERIAL_FORMAT))?),
            Arc::new(create_surface(device, "GBuffer Normal", &color(NORMAL_FORMAT))?),
            Arc::new(create_surface(device, "GBuffer Depth", &color(DEPTH_FORMAT))?),
        ];
        Ok(Self {
            views,
            binder: PackerBinder::default(),
        })
    }

    /// The view backing one of the packer's four channels.
    #[must_use]
    pub fn view(&self, id: SurfaceId) -> &Arc<wgpu::TextureView> {
        match id {
            SurfaceId::GBufferBaseColor => &self.views[0],
            SurfaceId::GBufferMaterial => &self.views[1],
            SurfaceId::GBufferNormal => &self.views[2],
            _ => &self.views[3],
        }
    }

    #[inline]
    #[must_use]
    pub fn binder(&self) -> &PackerBinder {
        &self.binder
    }

    #[inline]
    pub fn binder_mut(&mut self) -> &mut PackerBinder {
        &mut self.binder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_binds_channels_as_targets() {
        let mut binder = PackerBinder::default();
        binder.bind_packing();
        assert_eq!(binder.state(), PackerState::Packing);
        assert_eq!(binder.bindings().color_targets(), &CHANNELS);
        assert_eq!(
            binder.bindings().depth_target(),
            Some(SurfaceId::GBufferDepth)
        );
        assert!(binder.take_clear_pending());
    }

    #[test]
    fn unpacking_fully_undoes_packing() {
        let mut binder = PackerBinder::default();
        binder.bind_packing();
        binder.bind_unpacking();
        let b = binder.bindings();
        assert!(b.color_targets().is_empty());
        assert_eq!(b.depth_target(), None);
        for id in CHANNELS {
            assert!(b.fragment_inputs().contains(&id));
            assert!(b.compute_inputs().contains(&id));
        }
    }

    #[test]
    fn repacking_after_unpacking_drops_reads() {
        let mut binder = PackerBinder::default();
        binder.bind_unpacking();
        binder.bind_packing();
        for id in CHANNELS {
            assert!(!binder.bindings().is_read_input(id));
            assert!(binder.bindings().is_write_target(id));
        }
    }

    #[test]
    fn restore_leaves_no_bindings() {
        let mut binder = PackerBinder::default();
        binder.bind_unpacking();
        binder.bind_restore();
        assert_eq!(binder.state(), PackerState::Unbound);
        for id in CHANNELS {
            assert!(!binder.bindings().is_read_input(id));
            assert!(!binder.bindings().is_write_target(id));
        }
        assert!(binder.bindings().back_buffer_is_target());
    }
}
