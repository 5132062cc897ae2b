//! Frame Output Surfaces
//!
//! Everything between the geometry passes and the back buffer: the surface
//! layout rules ([`layout`]), the logical binding state ([`bindings`]), the
//! full phase binder ([`manager`]), and the simplified geometry-channel
//! packer ([`gbuffer`]) used by the snapshot renderer.

pub mod bindings;
pub mod gbuffer;
pub mod layout;
pub mod manager;

pub use bindings::BindingTable;
pub use gbuffer::GBuffer;
pub use layout::{FrameLayout, SurfaceDesc, SurfaceId, SurfaceSlot};
pub use manager::{OutputManager, PhaseBinder};

use crate::errors::{RenderError, Result};

/// Creates one frame surface under a validation error scope, so a creation
/// failure surfaces as a [`RenderError::SurfaceCreation`] instead of an
/// uncaptured device error later in the frame.
pub(crate) fn create_surface(
    device: &wgpu::Device,
    label: &'static str,
    desc: &SurfaceDesc,
) -> Result<wgpu::TextureView> {
    let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: desc.sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: desc.format,
        usage: desc.usage(),
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    if let Some(error) = pollster::block_on(error_scope.pop()) {
        return Err(RenderError::SurfaceCreation {
            label,
            reason: error.to_string(),
        });
    }
    Ok(view)
}
