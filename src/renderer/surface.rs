//! Presentation Surface
//!
//! Thin wrapper over a host window's `wgpu::Surface`: configure, resize,
//! acquire a frame view and present it. The renderer itself only ever sees
//! the `TextureView` of the acquired frame.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{MarqueeError, Result, ensure_dimensions};
use crate::renderer::context::GpuContext;
use crate::renderer::settings::RendererSettings;

/// Configured window surface.
pub struct PresentationSurface {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

/// One acquired swapchain image. Present it after `render()`.
pub struct SurfaceFrame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl SurfaceFrame {
    #[inline]
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn present(self) {
        self.texture.present();
    }
}

impl PresentationSurface {
    /// Creates the surface for `window` together with a compatible GPU context.
    pub async fn new<W>(
        window: W,
        settings: &RendererSettings,
        width: u32,
        height: u32,
    ) -> Result<(Self, GpuContext)>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        ensure_dimensions("surface", width, height)?;

        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| MarqueeError::SurfaceCreateFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| MarqueeError::AdapterRequestFailed(e.to_string()))?;

        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or_else(|| {
                MarqueeError::SurfaceCreateFailed("Surface not supported by adapter".to_string())
            })?;
        config.present_mode = settings.present_mode();

        let context = GpuContext::from_adapter(&adapter, settings, config.format).await?;
        surface.configure(&context.device, &config);

        Ok((Self { surface, config }, context))
    }

    /// Reconfigures the swapchain. Zero sizes are rejected, not ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<()> {
        ensure_dimensions("surface", width, height)?;
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(device, &self.config);
        Ok(())
    }

    /// Acquires the next frame. A lost or outdated surface is reconfigured
    /// once before giving up.
    pub fn acquire(&self, device: &wgpu::Device) -> Result<SurfaceFrame> {
        let texture = match self.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(device, &self.config);
                match self.surface.get_current_texture() {
                    wgpu::CurrentSurfaceTexture::Success(texture)
                    | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
                    e => return Err(MarqueeError::SurfaceAcquireFailed(format!("{e:?}"))),
                }
            }
            e => return Err(MarqueeError::SurfaceAcquireFailed(format!("{e:?}"))),
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(SurfaceFrame { texture, view })
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
