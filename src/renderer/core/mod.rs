//! Renderer Core
//!
//! GPU plumbing shared by every pass:
//! - [`GpuContext`]: device/queue/surface handles and frame bracketing
//! - [`ConstantBuffer`]: whole-struct upload-then-bind constant buffers
//! - [`uniforms`]: GPU-visible frame and camera constant layouts
//! - [`ResourceCache`]: keyed cache with a persistence (eviction) flag

pub mod cache;
pub mod constant_buffer;
pub mod context;
pub mod uniforms;

pub use cache::ResourceCache;
pub use constant_buffer::ConstantBuffer;
pub use context::{FrameBracket, GpuContext};
pub use uniforms::{CameraUniforms, FrameUniforms};
