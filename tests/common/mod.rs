//! Shared helpers for GPU integration tests.
//!
//! Every GPU test starts with `let Some(ctx) = common::gpu() else { return };`
//! so machines without an adapter skip instead of failing.

#![allow(dead_code)]

use marquee::{GpuContext, MarqueeError, RendererSettings, SceneRenderer};

/// Format of the offscreen targets the tests render into.
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Headless context, or `None` (with a log line) when no adapter exists or
/// the adapter cannot host the renderer (GL lacks depth `textureLoad`).
pub fn gpu() -> Option<GpuContext> {
    let ctx = context(&RendererSettings::default())?;
    match SceneRenderer::new(ctx.clone(), 4, 4, None) {
        Ok(mut renderer) => {
            renderer.destroy();
            Some(ctx)
        }
        Err(e @ (MarqueeError::GpuValidation { .. } | MarqueeError::ShaderCompilation { .. })) => {
            skip(&e);
            None
        }
        Err(e) => panic!("renderer construction failed on a capable adapter: {e}"),
    }
}

/// Context whose 1D/2D textures may not exceed `max_dimension`.
pub fn gpu_with_texture_limit(max_dimension: u32) -> Option<GpuContext> {
    let settings = RendererSettings {
        required_limits: wgpu::Limits {
            max_texture_dimension_1d: max_dimension,
            max_texture_dimension_2d: max_dimension,
            ..wgpu::Limits::default()
        },
        ..RendererSettings::default()
    };
    context(&settings)
}

fn context(settings: &RendererSettings) -> Option<GpuContext> {
    init_logging();
    GpuContext::request_headless_blocking(settings, OUTPUT_FORMAT)
        .inspect_err(skip)
        .ok()
}

fn skip(e: &MarqueeError) {
    log::warn!("Skipping GPU test: {e}");
    eprintln!("Skipping GPU test: {e}");
}

/// Offscreen colour target standing in for a swapchain image.
pub struct Offscreen {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl Offscreen {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Test Output"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Copies the texture back as tightly packed RGBA8 rows.
    pub fn read_pixels(&self, ctx: &GpuContext) -> Vec<u8> {
        let unpadded = self.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Test Readback"),
            size: u64::from(padded * self.height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Test Readback Encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |result| {
            result.expect("readback mapping failed");
        });
        ctx.device
            .poll(wgpu::PollType::wait_indefinitely())
            .expect("device poll failed");

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * self.height) as usize);
        for row in data.chunks(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(data);
        staging.unmap();
        pixels
    }
}

/// RGB of pixel (x, y) from [`Offscreen::read_pixels`] output.
pub fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 3] {
    let i = ((y * width + x) * 4) as usize;
    [pixels[i], pixels[i + 1], pixels[i + 2]]
}

pub fn brightness(rgb: [u8; 3]) -> u32 {
    rgb.iter().map(|&c| u32::from(c)).sum()
}
