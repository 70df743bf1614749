//! GPU Context
//!
//! [`GpuContext`] is the device/queue pair the renderer draws with, plus the
//! colour format of the target it presents into. The host owns adapter and
//! surface creation; [`GpuContext::request_headless`] exists for tools and
//! tests that render offscreen.

use crate::errors::{MarqueeError, Result};
use crate::renderer::settings::RendererSettings;

/// Core GPU handles handed to [`SceneRenderer::new`](crate::renderer::SceneRenderer::new).
#[derive(Debug, Clone)]
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Format of the views later passed to `render()`.
    pub output_format: wgpu::TextureFormat,
}

impl GpuContext {
    #[must_use]
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, output_format: wgpu::TextureFormat) -> Self {
        Self {
            device,
            queue,
            output_format,
        }
    }

    /// Requests a device from `adapter` using the settings' features and limits.
    pub async fn from_adapter(
        adapter: &wgpu::Adapter,
        settings: &RendererSettings,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Marquee Device"),
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        Ok(Self::new(device, queue, output_format))
    }

    /// Offscreen context without any surface.
    pub async fn request_headless(
        settings: &RendererSettings,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| MarqueeError::AdapterRequestFailed(e.to_string()))?;

        Self::from_adapter(&adapter, settings, output_format).await
    }

    /// Blocking [`request_headless`](Self::request_headless) for callers
    /// without an executor.
    pub fn request_headless_blocking(
        settings: &RendererSettings,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self> {
        pollster::block_on(Self::request_headless(settings, output_format))
    }
}

/// Runs `f` inside validation and out-of-memory error scopes.
///
/// Anything the device rejects comes back as
/// [`MarqueeError::GpuValidation`] instead of reaching the uncaptured-error
/// handler. An `Err` from `f` itself wins over a captured GPU error.
pub(crate) fn validated<T>(
    device: &wgpu::Device,
    operation: &'static str,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    let out_of_memory = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let result = f();
    let validation_error = pollster::block_on(validation.pop());
    let memory_error = pollster::block_on(out_of_memory.pop());

    let value = result?;
    match validation_error.or(memory_error) {
        None => Ok(value),
        Some(error) => Err(MarqueeError::GpuValidation {
            operation,
            reason: error.to_string(),
        }),
    }
}
