//! Render targets owned by the passes.
//!
//! A [`RenderTarget`] is a single-mip 2D texture plus its default view. Its
//! size always derives from the surface size; passes destroy and recreate
//! targets on resize instead of mutating them.

use crate::errors::{Result, ensure_dimensions};

/// Texture + view pair with the size and format it was created with.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl RenderTarget {
    /// Usage of a target written by one pass and sampled by the next.
    pub const ATTACHMENT_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
        .union(wgpu::TextureUsages::TEXTURE_BINDING)
        .union(wgpu::TextureUsages::COPY_SRC);

    /// Creates a target; zero dimensions fail with `InvalidDimensions`.
    pub fn new(
        device: &wgpu::Device,
        label: &'static str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Result<Self> {
        ensure_dimensions(label, width, height)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
            format,
        })
    }

    /// Colour target sampled downstream.
    pub fn attachment(
        device: &wgpu::Device,
        label: &'static str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Result<Self> {
        Self::new(device, label, width, height, format, Self::ATTACHMENT_USAGE)
    }

    /// 1×1 texture filled with `texel` (raw bytes of one pixel of `format`).
    /// Used as placeholder for optional inputs so layouts never change.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &'static str,
        format: wgpu::TextureFormat,
        texel: &[u8],
    ) -> Result<Self> {
        let target = Self::new(
            device,
            label,
            1,
            1,
            format,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )?;
        target.upload(queue, texel);
        Ok(target)
    }

    /// Writes tightly packed pixel rows into mip 0.
    pub fn upload(&self, queue: &wgpu::Queue, data: &[u8]) {
        let bytes_per_pixel = self.format.block_copy_size(None).unwrap_or(4);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * bytes_per_pixel),
                rows_per_image: Some(self.height),
            },
            self.extent(),
        );
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    #[must_use]
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Releases GPU memory now instead of waiting for the last handle drop.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}
