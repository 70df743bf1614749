//! Bloom Pass
//!
//! Mip-chain bloom on the HDR target:
//!
//! ```text
//! HDR ─threshold─► L0 ─down─► L1 ─down─► … ─► L(N-1)
//!                  L0 ◄─up+── L1 ◄─up+── … ◄──┘
//! ```
//!
//! Level `i` is `max(1, size >> (i + 1))`. Every pass instance owns its
//! uniform buffer (`2N - 1` in total) so one frame's writes never alias.
//! The chain exists whether or not bloom is enabled; toggling only changes
//! which passes the frame plan records. Changing the level count recreates
//! textures, buffers and bind groups; any other setting only rewrites the
//! uniform values.

use crate::errors::Result;
use crate::renderer::HDR_FORMAT;
use crate::renderer::pipeline::{
    ADDITIVE_BLEND, color_target, draw_fullscreen, float_texture_entry, fullscreen_pipeline,
    linear_clamp_sampler, pipeline_layout, sampler_entry, uniform_entry,
};
use crate::renderer::render_target::RenderTarget;
use crate::renderer::shader_manager::{ShaderDefines, ShaderManager};
use crate::resources::bloom::{BloomChainLayout, BloomSettings, BloomStep, BloomUniforms};

/// GPU side of one chain layout.
struct BloomChain {
    layout: BloomChainLayout,
    levels: Vec<RenderTarget>,
    /// One per entry of `layout.steps()`.
    uniform_buffers: Vec<wgpu::Buffer>,
    bind_groups: Vec<wgpu::BindGroup>,
}

impl BloomChain {
    fn destroy(&self) {
        for level in &self.levels {
            level.destroy();
        }
        for buffer in &self.uniform_buffers {
            buffer.destroy();
        }
    }
}

pub struct BloomPass {
    settings: BloomSettings,
    surface_size: (u32, u32),
    chain: BloomChain,

    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    threshold_pipeline: wgpu::RenderPipeline,
    downsample_pipeline: wgpu::RenderPipeline,
    upsample_pipeline: wgpu::RenderPipeline,

    textures_created: usize,
    uniform_buffers_created: usize,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shaders: &mut ShaderManager,
        settings: BloomSettings,
        width: u32,
        height: u32,
        hdr: &wgpu::TextureView,
    ) -> Result<Self> {
        let settings = settings.sanitized();

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Layout"),
            entries: &[
                float_texture_entry(0, true),
                sampler_entry(1, wgpu::SamplerBindingType::Filtering),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let sampler = linear_clamp_sampler(device, "Bloom Sampler");
        let layout = pipeline_layout(device, "Bloom Pipeline Layout", &[&bind_group_layout]);

        let mut build = |template: &str, label: &str, blend: Option<wgpu::BlendState>| -> Result<_> {
            let (module, _) = shaders.get_or_compile(device, template, &ShaderDefines::new())?;
            Ok(fullscreen_pipeline(
                device,
                label,
                &module,
                &layout,
                &[color_target(HDR_FORMAT, blend)],
            ))
        };
        let threshold_pipeline = build("passes/bloom_threshold", "Bloom Threshold Pipeline", None)?;
        let downsample_pipeline =
            build("passes/bloom_downsample", "Bloom Downsample Pipeline", None)?;
        let upsample_pipeline = build(
            "passes/bloom_upsample",
            "Bloom Upsample Pipeline",
            Some(ADDITIVE_BLEND),
        )?;

        let mut textures_created = 0;
        let mut uniform_buffers_created = 0;
        let chain = Self::create_chain(
            device,
            &bind_group_layout,
            &sampler,
            (width, height),
            settings.levels,
            hdr,
            &mut textures_created,
            &mut uniform_buffers_created,
        )?;

        let pass = Self {
            settings,
            surface_size: (width, height),
            chain,
            bind_group_layout,
            sampler,
            threshold_pipeline,
            downsample_pipeline,
            upsample_pipeline,
            textures_created,
            uniform_buffers_created,
        };
        pass.write_uniforms(queue);
        Ok(pass)
    }

    fn create_chain(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        (width, height): (u32, u32),
        level_count: u32,
        hdr: &wgpu::TextureView,
        textures_created: &mut usize,
        uniform_buffers_created: &mut usize,
    ) -> Result<BloomChain> {
        let layout = BloomChainLayout::new(width, height, level_count);

        let levels = layout
            .levels()
            .iter()
            .map(|&(w, h)| RenderTarget::attachment(device, "Bloom Level", w, h, HDR_FORMAT))
            .collect::<Result<Vec<_>>>()?;
        *textures_created += levels.len();

        let uniform_buffers: Vec<wgpu::Buffer> = (0..layout.uniform_buffer_count())
            .map(|_| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Bloom Step Uniforms"),
                    size: std::mem::size_of::<BloomUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();
        *uniform_buffers_created += uniform_buffers.len();

        let mut chain = BloomChain {
            layout,
            levels,
            uniform_buffers,
            bind_groups: Vec::new(),
        };
        chain.bind_groups = Self::create_bind_groups(device, bind_group_layout, sampler, &chain, hdr);

        log::debug!(
            "Bloom chain created: {} levels, {} uniform buffers",
            chain.levels.len(),
            chain.uniform_buffers.len()
        );
        Ok(chain)
    }

    fn create_bind_groups(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        chain: &BloomChain,
        hdr: &wgpu::TextureView,
    ) -> Vec<wgpu::BindGroup> {
        chain
            .layout
            .steps()
            .iter()
            .zip(&chain.uniform_buffers)
            .map(|(step, buffer)| {
                let source = match *step {
                    BloomStep::Threshold => hdr,
                    BloomStep::Downsample { src, .. } | BloomStep::Upsample { src, .. } => {
                        &chain.levels[src].view
                    }
                };
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Bloom Step BindGroup"),
                    layout: bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(source),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: buffer.as_entire_binding(),
                        },
                    ],
                })
            })
            .collect()
    }

    fn source_size(&self, step: BloomStep) -> (u32, u32) {
        match step {
            BloomStep::Threshold => self.surface_size,
            BloomStep::Downsample { src, .. } | BloomStep::Upsample { src, .. } => {
                self.chain.layout.levels()[src]
            }
        }
    }

    fn write_uniforms(&self, queue: &wgpu::Queue) {
        for (step, buffer) in self.chain.layout.steps().iter().zip(&self.chain.uniform_buffers) {
            let uniforms = self.settings.uniforms(self.source_size(*step));
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&uniforms));
        }
    }

    fn rebuild_chain(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        hdr: &wgpu::TextureView,
    ) -> Result<()> {
        self.chain.destroy();
        let chain = Self::create_chain(
            device,
            &self.bind_group_layout,
            &self.sampler,
            self.surface_size,
            self.settings.levels,
            hdr,
            &mut self.textures_created,
            &mut self.uniform_buffers_created,
        )?;
        self.chain = chain;
        self.write_uniforms(queue);
        Ok(())
    }

    /// Recreates the chain for a new surface size. `hdr` is the new HDR view.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        hdr: &wgpu::TextureView,
    ) -> Result<()> {
        crate::errors::ensure_dimensions("bloom", width, height)?;
        self.surface_size = (width, height);
        self.rebuild_chain(device, queue, hdr)
    }

    /// Applies new settings. Returns `true` when the chain was recreated.
    pub fn apply_settings(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        settings: BloomSettings,
        hdr: &wgpu::TextureView,
    ) -> Result<bool> {
        let settings = settings.sanitized();
        let recreate = settings.levels != self.settings.levels;
        self.settings = settings;
        if recreate {
            self.rebuild_chain(device, queue, hdr)?;
        } else {
            self.write_uniforms(queue);
        }
        Ok(recreate)
    }

    /// Points the threshold step at a new HDR view.
    pub fn rebind(&mut self, device: &wgpu::Device, hdr: &wgpu::TextureView) {
        self.chain.bind_groups =
            Self::create_bind_groups(device, &self.bind_group_layout, &self.sampler, &self.chain, hdr);
    }

    /// Records the whole chain; the result ends up in level 0.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder) {
        let clear = wgpu::LoadOp::Clear(wgpu::Color::BLACK);
        for (step, bind_group) in self.chain.layout.steps().iter().zip(&self.chain.bind_groups) {
            let (label, dst, load, pipeline) = match *step {
                BloomStep::Threshold => ("Bloom Threshold", 0, clear, &self.threshold_pipeline),
                BloomStep::Downsample { dst, .. } => {
                    ("Bloom Downsample", dst, clear, &self.downsample_pipeline)
                }
                BloomStep::Upsample { dst, .. } => (
                    "Bloom Upsample",
                    dst,
                    wgpu::LoadOp::Load,
                    &self.upsample_pipeline,
                ),
            };
            draw_fullscreen(
                encoder,
                label,
                &self.chain.levels[dst].view,
                load,
                pipeline,
                &[bind_group],
            );
        }
    }

    /// Final bloom texture (level 0).
    #[must_use]
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.chain.levels[0].view
    }

    #[must_use]
    pub fn level_sizes(&self) -> Vec<(u32, u32)> {
        self.chain.levels.iter().map(RenderTarget::size).collect()
    }

    #[inline]
    #[must_use]
    pub fn uniform_buffer_count(&self) -> usize {
        self.chain.uniform_buffers.len()
    }

    /// Level textures created since construction.
    #[inline]
    #[must_use]
    pub fn textures_created(&self) -> usize {
        self.textures_created
    }

    /// Step uniform buffers created since construction.
    #[inline]
    #[must_use]
    pub fn uniform_buffers_created(&self) -> usize {
        self.uniform_buffers_created
    }

    pub fn destroy(&self) {
        self.chain.destroy();
    }
}
