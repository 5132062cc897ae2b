#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod errors;
pub mod renderer;
pub mod scene;

pub use config::{AaDescriptor, DisplayConfig, RendererSettings};
pub use errors::{RenderError, Result};
pub use renderer::output::{FrameLayout, GBuffer, OutputManager, SurfaceId};
pub use renderer::Renderer;
#[allow(deprecated)]
pub use renderer::SceneRenderer;
pub use scene::{Camera, Material, Model, RenderLayer, RenderMode, Scene, StaticMesh};
