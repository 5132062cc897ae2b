//! Sprites
//!
//! 2D overlay quads composited over the whole frame after all cameras, in
//! the maximal viewport. Sprite images are external resources; this crate
//! only carries placement and tint.

use glam::{Vec2, Vec4};

/// One screen-space sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Top-left corner in display pixels.
    pub position: Vec2,
    /// Size in display pixels.
    pub size: Vec2,
    /// Tint (and fill color when no image is bound).
    pub color: Vec4,
    /// Back-to-front ordering key; higher draws later.
    pub layer: f32,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::splat(32.0),
            color: Vec4::ONE,
            layer: 0.0,
        }
    }
}
