//! wgpu Context
//!
//! The [`GpuContext`] holds core GPU handles: device, queue, surface, and config.
//! It is responsible for window surface management, resize handling, and the
//! per-frame begin/end bracket around back buffer acquisition.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::config::RendererSettings;
use crate::errors::{RenderError, Result};

/// Guards the begin/end pairing of a frame.
///
/// Exactly one [`begin`](FrameBracket::begin) must precede each
/// [`end`](FrameBracket::end). Mismatched calls are reported as
/// [`RenderError::FrameBracketing`] instead of silently corrupting the
/// presentation state.
#[derive(Debug, Default)]
pub struct FrameBracket {
    in_frame: bool,
}

impl FrameBracket {
    pub fn begin(&mut self) -> Result<()> {
        if self.in_frame {
            return Err(RenderError::FrameBracketing(
                "begin_frame called twice without an intervening end_frame",
            ));
        }
        self.in_frame = true;
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        if !self.in_frame {
            return Err(RenderError::FrameBracketing(
                "end_frame called without a matching begin_frame",
            ));
        }
        self.in_frame = false;
        Ok(())
    }

    /// Whether a frame is currently open.
    #[inline]
    #[must_use]
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }
}

/// Core wgpu context holding GPU handles.
///
/// This struct owns the fundamental wgpu resources needed for rendering:
/// - `device`: GPU device for resource creation
/// - `queue`: Command submission queue
/// - `surface`: Window surface for presentation
/// - `config`: Surface configuration (format, present mode, etc.)
///
/// Intermediate render targets live in the output manager, not here; the
/// context only manages the swap chain itself.
pub struct GpuContext {
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
    /// The window surface for presentation
    pub surface: wgpu::Surface<'static>,
    /// Surface configuration
    pub config: wgpu::SurfaceConfiguration,
    /// Clear color for the back buffer
    pub clear_color: wgpu::Color,

    bracket: FrameBracket,
}

impl GpuContext {
    pub async fn new<W>(window: W, settings: &RendererSettings) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::AdapterRequestFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let display = &settings.display;
        let mut config = surface
            .get_default_config(&adapter, display.width, display.height)
            .ok_or_else(|| {
                RenderError::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;

        config.present_mode = if display.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        log::info!(
            "GPU context ready: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            clear_color: settings.clear_color,
            bracket: FrameBracket::default(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Opens the frame bracket and acquires the next back buffer.
    pub fn begin_frame(&mut self) -> Result<wgpu::SurfaceTexture> {
        self.bracket.begin()?;
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(e) => {
                // Undo the bracket so the caller can retry next frame.
                self.bracket.end()?;
                Err(RenderError::SurfaceConfiguration(e.to_string()))
            }
        }
    }

    /// Presents the back buffer and closes the frame bracket.
    pub fn end_frame(&mut self, frame: wgpu::SurfaceTexture) -> Result<()> {
        self.bracket.end()?;
        frame.present();
        Ok(())
    }

    /// Returns the surface color format.
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current surface dimensions.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_rejects_double_begin() {
        let mut bracket = FrameBracket::default();
        bracket.begin().unwrap();
        assert!(matches!(
            bracket.begin(),
            Err(RenderError::FrameBracketing(_))
        ));
    }

    #[test]
    fn bracket_rejects_unmatched_end() {
        let mut bracket = FrameBracket::default();
        assert!(matches!(bracket.end(), Err(RenderError::FrameBracketing(_))));
    }

    #[test]
    fn bracket_allows_repeated_pairs() {
        let mut bracket = FrameBracket::default();
        for _ in 0..3 {
            bracket.begin().unwrap();
            assert!(bracket.in_frame());
            bracket.end().unwrap();
            assert!(!bracket.in_frame());
        }
    }
}
