//! Error Types
//!
//! The single error type [`RenderError`] covers every failure mode of the
//! renderer:
//! - GPU adapter/device acquisition failures
//! - GPU surface and resource creation failures
//! - frame bracketing violations
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, RenderError>`.

use thiserror::Error;

/// The error type for the Ember renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // GPU acquisition errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// The presentation surface could not be created or configured.
    #[error("Surface configuration failed: {0}")]
    SurfaceConfiguration(String),

    // ========================================================================
    // GPU resource creation errors
    // ========================================================================
    /// A frame surface (texture or view) failed validation at creation time.
    ///
    /// Fatal: the owning [`OutputManager`](crate::OutputManager) or
    /// [`GBuffer`](crate::GBuffer) is not constructed.
    #[error("Surface creation failed for '{label}': {reason}")]
    SurfaceCreation {
        /// Debug label of the surface being created.
        label: &'static str,
        /// Validation error text reported by wgpu.
        reason: String,
    },

    // ========================================================================
    // Frame sequencing errors
    // ========================================================================
    /// `begin_frame`/`end_frame` were called out of order.
    #[error("Frame bracketing violation: {0}")]
    FrameBracketing(&'static str),
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
