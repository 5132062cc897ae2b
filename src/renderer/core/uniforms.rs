//! GPU Constant Layouts
//!
//! CPU-side mirrors of the per-frame and per-camera constant buffers. All
//! structs are `repr(C)` and padded to 16-byte boundaries to satisfy WGSL
//! uniform layout rules. Matrices are uploaded column-major as glam stores
//! them, which matches WGSL; no transposition happens on upload.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::config::DisplayConfig;
use crate::scene::Camera;

/// Voxel grid resolution along each axis.
pub const VOXEL_GRID_RESOLUTION: u32 = 256;
/// World-space size of one voxel.
pub const VOXEL_SIZE: f32 = 1.0;

/// Per-frame constants shared by every camera and pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Display resolution in pixels.
    pub display_size: [f32; 2],
    /// `1 / (display_size - 1)`, used to map texel indices to UVs.
    pub display_inv_size_minus1: [f32; 2],
    /// Super-sampled display resolution in pixels.
    pub ss_display_size: [f32; 2],
    /// `1 / (ss_display_size - 1)`.
    pub ss_display_inv_size_minus1: [f32; 2],
    /// Display gamma.
    pub gamma: f32,
    /// `1 / gamma`.
    pub inv_gamma: f32,
    pub _padding: [f32; 2],
}

#[inline]
fn inv_minus1(n: f32) -> f32 {
    if n > 1.0 { 1.0 / (n - 1.0) } else { 1.0 }
}

impl FrameUniforms {
    #[must_use]
    pub fn new(display: &DisplayConfig) -> Self {
        let (w, h) = (display.width as f32, display.height as f32);
        let (ssw, ssh) = (display.ss_width() as f32, display.ss_height() as f32);
        Self {
            display_size: [w, h],
            display_inv_size_minus1: [inv_minus1(w), inv_minus1(h)],
            ss_display_size: [ssw, ssh],
            ss_display_inv_size_minus1: [inv_minus1(ssw), inv_minus1(ssh)],
            gamma: display.gamma,
            inv_gamma: 1.0 / display.gamma,
            _padding: [0.0; 2],
        }
    }
}

/// Per-camera constants, refreshed once per camera per frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub world_to_view: Mat4,
    pub view_to_world: Mat4,
    pub view_to_projection: Mat4,
    pub projection_to_view: Mat4,
    /// World space to voxel grid clip space, for the voxelization path.
    pub world_to_voxel: Mat4,
    /// Display-space viewport: top-left x, top-left y, width, height.
    pub viewport: [f32; 4],
    /// Super-sampled viewport: top-left x, top-left y, width, height.
    pub ss_viewport: [f32; 4],
    /// `1 / (viewport wh - 1)`.
    pub viewport_inv_size_minus1: [f32; 2],
    /// `1 / (ss viewport wh - 1)`.
    pub ss_viewport_inv_size_minus1: [f32; 2],
    pub lens_aperture_radius: f32,
    pub lens_focal_length: f32,
    pub lens_max_coc_radius: f32,
    pub _padding0: f32,
    pub voxel_size: f32,
    pub voxel_inv_size: f32,
    pub voxel_grid_resolution: f32,
    pub voxel_grid_inv_resolution: f32,
}

impl CameraUniforms {
    #[must_use]
    pub fn new(camera: &Camera, resolution_multiplier: u32) -> Self {
        let viewport = camera.viewport;
        let ss_viewport = camera.ss_viewport(resolution_multiplier);
        let resolution = VOXEL_GRID_RESOLUTION as f32;
        Self {
            world_to_view: camera.world_to_view(),
            view_to_world: camera.view_to_world(),
            view_to_projection: camera.view_to_projection(),
            projection_to_view: camera.projection_to_view(),
            world_to_voxel: Self::world_to_voxel(camera),
            viewport: [
                viewport.top_left_x,
                viewport.top_left_y,
                viewport.width,
                viewport.height,
            ],
            ss_viewport: [
                ss_viewport.top_left_x,
                ss_viewport.top_left_y,
                ss_viewport.width,
                ss_viewport.height,
            ],
            viewport_inv_size_minus1: [inv_minus1(viewport.width), inv_minus1(viewport.height)],
            ss_viewport_inv_size_minus1: [
                inv_minus1(ss_viewport.width),
                inv_minus1(ss_viewport.height),
            ],
            lens_aperture_radius: camera.lens.aperture_radius,
            lens_focal_length: camera.lens.focal_length,
            lens_max_coc_radius: camera.lens.max_coc_radius,
            _padding0: 0.0,
            voxel_size: VOXEL_SIZE,
            voxel_inv_size: 1.0 / VOXEL_SIZE,
            voxel_grid_resolution: resolution,
            voxel_grid_inv_resolution: 1.0 / resolution,
        }
    }

    /// Orthographic projection of the voxel grid centered on the camera.
    fn world_to_voxel(camera: &Camera) -> Mat4 {
        let half = 0.5 * VOXEL_SIZE * VOXEL_GRID_RESOLUTION as f32;
        let ortho = Mat4::orthographic_rh(-half, half, -half, half, -half, half);
        ortho * camera.world_to_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AaDescriptor;

    #[test]
    fn frame_uniforms_follow_display_config() {
        let display = DisplayConfig {
            width: 1280,
            height: 720,
            gamma: 2.2,
            aa: AaDescriptor::Ssaa2x,
            vsync: true,
        };
        let u = FrameUniforms::new(&display);
        assert_eq!(u.display_size, [1280.0, 720.0]);
        assert_eq!(u.ss_display_size, [2560.0, 1440.0]);
        assert!((u.display_inv_size_minus1[0] - 1.0 / 1279.0).abs() < 1e-9);
        assert!((u.gamma * u.inv_gamma - 1.0).abs() < 1e-6);
    }

    #[test]
    fn camera_uniforms_scale_ss_viewport() {
        let camera = Camera::new_perspective(90.0, 800, 600, 0.1, 100.0);
        let u = CameraUniforms::new(&camera, 3);
        assert_eq!(u.viewport, [0.0, 0.0, 800.0, 600.0]);
        assert_eq!(u.ss_viewport, [0.0, 0.0, 2400.0, 1800.0]);
        assert_eq!(u.voxel_grid_resolution, 256.0);
    }

    #[test]
    fn uniform_sizes_are_16_byte_aligned() {
        assert_eq!(size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(size_of::<CameraUniforms>() % 16, 0);
    }
}
