//! Renderer Settings & Display Configuration
//!
//! This module defines the construction-time configuration for the renderer.
//!
//! The core abstraction is [`AaDescriptor`], which selects the anti-aliasing
//! strategy and thereby the sizing of every intermediate frame surface. It is
//! immutable for the lifetime of an [`OutputManager`](crate::OutputManager):
//! changing it requires reconstructing the surface set.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ember::{DisplayConfig, AaDescriptor, RendererSettings};
//!
//! let display = DisplayConfig {
//!     width: 1920,
//!     height: 1080,
//!     aa: AaDescriptor::Msaa4x,
//!     ..Default::default()
//! };
//! ```

// ---------------------------------------------------------------------------
// AaDescriptor
// ---------------------------------------------------------------------------

/// Anti-aliasing descriptor.
///
/// Determines the sample count and super-sample resolution multiplier for
/// every intermediate surface allocated by the
/// [`OutputManager`](crate::OutputManager).
///
/// | Variant     | Dimensions | Samples | Resolve               |
/// |-------------|------------|---------|-----------------------|
/// | `None`      | base       | 1       | none                  |
/// | `Fxaa`      | base       | 1       | preprocess + FXAA     |
/// | `MsaaNx`    | base       | N       | multisample resolve   |
/// | `SsaaNx`    | base × N   | 1       | downsample resolve    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AaDescriptor {
    /// No anti-aliasing. Post-processing reuses the main HDR surface.
    #[default]
    None,
    /// Fast approximate anti-aliasing (screen-space, post-process).
    Fxaa,
    /// 2x hardware multi-sampling.
    Msaa2x,
    /// 4x hardware multi-sampling.
    Msaa4x,
    /// 8x hardware multi-sampling.
    Msaa8x,
    /// 2x super-sampling (each dimension doubled).
    Ssaa2x,
    /// 3x super-sampling.
    Ssaa3x,
    /// 4x super-sampling.
    Ssaa4x,
}

impl AaDescriptor {
    /// Hardware sample count for multi-sampled surfaces.
    #[inline]
    #[must_use]
    pub const fn sample_count(self) -> u32 {
        match self {
            Self::Msaa2x => 2,
            Self::Msaa4x => 4,
            Self::Msaa8x => 8,
            _ => 1,
        }
    }

    /// Resolution multiplier applied to both dimensions of super-sampled
    /// surfaces.
    #[inline]
    #[must_use]
    pub const fn resolution_multiplier(self) -> u32 {
        match self {
            Self::Ssaa2x => 2,
            Self::Ssaa3x => 3,
            Self::Ssaa4x => 4,
            _ => 1,
        }
    }

    /// `true` for the MSAA family.
    #[inline]
    #[must_use]
    pub const fn uses_msaa(self) -> bool {
        matches!(self, Self::Msaa2x | Self::Msaa4x | Self::Msaa8x)
    }

    /// `true` for the SSAA family.
    #[inline]
    #[must_use]
    pub const fn uses_ssaa(self) -> bool {
        matches!(self, Self::Ssaa2x | Self::Ssaa3x | Self::Ssaa4x)
    }

    /// `true` when any anti-aliasing is active (including FXAA).
    #[inline]
    #[must_use]
    pub const fn uses_aa(self) -> bool {
        !matches!(self, Self::None)
    }

    /// `true` when an AA resolve dispatch is required before post-processing.
    #[inline]
    #[must_use]
    pub const fn requires_resolve(self) -> bool {
        self.uses_msaa() || self.uses_ssaa()
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

/// Display configuration, read-only after construction.
///
/// Queried once when allocating the frame surfaces and per frame for gamma
/// and viewport values.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Display width in pixels.
    pub width: u32,
    /// Display height in pixels.
    pub height: u32,
    /// Display gamma. The frame constant buffer carries gamma and 1/gamma.
    pub gamma: f32,
    /// Anti-aliasing descriptor. Immutable for the surface set's lifetime.
    pub aa: AaDescriptor,
    /// Enable vertical synchronization.
    pub vsync: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            gamma: 2.2,
            aa: AaDescriptor::default(),
            vsync: true,
        }
    }
}

impl DisplayConfig {
    /// Super-sampled display width.
    #[inline]
    #[must_use]
    pub const fn ss_width(&self) -> u32 {
        self.width * self.aa.resolution_multiplier()
    }

    /// Super-sampled display height.
    #[inline]
    #[must_use]
    pub const fn ss_height(&self) -> u32 {
        self.height * self.aa.resolution_multiplier()
    }
}

// ---------------------------------------------------------------------------
// RendererSettings
// ---------------------------------------------------------------------------

/// Global configuration for renderer initialization.
///
/// Consumed once when creating the GPU context; the display portion may be
/// swapped at runtime, which reconstructs the frame surfaces.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Display dimensions, gamma, anti-aliasing, and vsync.
    pub display: DisplayConfig,

    /// GPU adapter selection preference.
    pub power_preference: wgpu::PowerPreference,

    /// Required wgpu features that must be supported by the adapter.
    pub required_features: wgpu::Features,

    /// Required wgpu limits (max buffer sizes, binding counts, etc.).
    pub required_limits: wgpu::Limits,

    /// Background clear color for the back buffer.
    pub clear_color: wgpu::Color,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            // Line rasterization backs the wireframe overlay.
            required_features: wgpu::Features::POLYGON_MODE_LINE,
            required_limits: wgpu::Limits::default(),
            clear_color: wgpu::Color::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msaa_keeps_dimensions_and_sets_samples() {
        let config = DisplayConfig {
            width: 800,
            height: 600,
            aa: AaDescriptor::Msaa8x,
            ..Default::default()
        };
        assert_eq!(config.ss_width(), 800);
        assert_eq!(config.ss_height(), 600);
        assert_eq!(config.aa.sample_count(), 8);
    }

    #[test]
    fn ssaa_multiplies_dimensions_at_one_sample() {
        let config = DisplayConfig {
            width: 800,
            height: 600,
            aa: AaDescriptor::Ssaa3x,
            ..Default::default()
        };
        assert_eq!(config.ss_width(), 2400);
        assert_eq!(config.ss_height(), 1800);
        assert_eq!(config.aa.sample_count(), 1);
    }

    #[test]
    fn fxaa_requires_no_resolve() {
        assert!(!AaDescriptor::Fxaa.requires_resolve());
        assert!(AaDescriptor::Fxaa.uses_aa());
        assert!(AaDescriptor::Msaa2x.requires_resolve());
        assert!(AaDescriptor::Ssaa4x.requires_resolve());
    }
}
