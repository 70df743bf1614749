//! FXAA Pass
//!
//! Last pass of the frame: LDR image → output view. The edge search length
//! is a template constant, so changing the quality preset recompiles the
//! pipeline. Disabled FXAA still runs, through a passthrough variant, so the
//! output view is always written by exactly one pass.

use crate::errors::Result;
use crate::renderer::pipeline::{
    color_target, draw_fullscreen, float_texture_entry, fullscreen_pipeline, linear_clamp_sampler,
    pipeline_layout, sampler_entry, uniform_entry,
};
use crate::renderer::shader_manager::{ShaderDefines, ShaderManager};
use crate::resources::fxaa::{FxaaQuality, FxaaSettings, FxaaUniforms};

pub struct FxaaPass {
    output_format: wgpu::TextureFormat,
    quality: FxaaQuality,

    layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipeline: wgpu::RenderPipeline,
    passthrough_pipeline: wgpu::RenderPipeline,

    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FxaaPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        output_format: wgpu::TextureFormat,
        quality: FxaaQuality,
        input: &wgpu::TextureView,
    ) -> Result<Self> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("FXAA Layout"),
            entries: &[
                float_texture_entry(0, true),
                sampler_entry(1, wgpu::SamplerBindingType::Filtering),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let pipeline_layout = pipeline_layout(device, "FXAA Pipeline Layout", &[&layout]);

        let sampler = linear_clamp_sampler(device, "FXAA Sampler");
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("FXAA Uniforms"),
            size: std::mem::size_of::<FxaaUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = Self::create_bind_group(device, &layout, &sampler, &uniform_buffer, input);

        let pipeline = Self::create_pipeline(
            device,
            shaders,
            &pipeline_layout,
            output_format,
            Some(quality),
        )?;
        let passthrough_pipeline =
            Self::create_pipeline(device, shaders, &pipeline_layout, output_format, None)?;

        Ok(Self {
            output_format,
            quality,
            layout,
            pipeline_layout,
            pipeline,
            passthrough_pipeline,
            sampler,
            uniform_buffer,
            bind_group,
        })
    }

    /// `None` builds the passthrough variant.
    fn create_pipeline(
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        layout: &wgpu::PipelineLayout,
        output_format: wgpu::TextureFormat,
        quality: Option<FxaaQuality>,
    ) -> Result<wgpu::RenderPipeline> {
        let mut defines = ShaderDefines::new();
        match quality {
            Some(quality) => {
                defines.set("FXAA_ITERATIONS", quality.iterations());
            }
            None => {
                defines.toggle("FXAA_PASSTHROUGH", true);
            }
        }
        defines.toggle("SRGB_OUTPUT", output_format.is_srgb());

        let (module, _) = shaders.get_or_compile(device, "passes/fxaa", &defines)?;
        let label = if quality.is_some() {
            "FXAA Pipeline"
        } else {
            "FXAA Passthrough Pipeline"
        };
        Ok(fullscreen_pipeline(
            device,
            label,
            &module,
            layout,
            &[color_target(output_format, None)],
        ))
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
        input: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("FXAA BindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Recompiles the edge search for `quality`. Returns `false` if unchanged.
    pub fn set_quality(
        &mut self,
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        quality: FxaaQuality,
    ) -> Result<bool> {
        if quality == self.quality {
            return Ok(false);
        }
        self.pipeline = Self::create_pipeline(
            device,
            shaders,
            &self.pipeline_layout,
            self.output_format,
            Some(quality),
        )?;
        self.quality = quality;
        log::debug!("FXAA pipeline rebuilt for {} quality", quality.name());
        Ok(true)
    }

    pub fn rebind(&mut self, device: &wgpu::Device, input: &wgpu::TextureView) {
        self.bind_group =
            Self::create_bind_group(device, &self.layout, &self.sampler, &self.uniform_buffer, input);
    }

    pub fn update(&self, queue: &wgpu::Queue, settings: &FxaaSettings) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&settings.uniforms()));
    }

    /// Writes the final image into `target`, anti-aliased when `enabled`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, enabled: bool) {
        let (label, pipeline) = if enabled {
            ("FXAA Pass", &self.pipeline)
        } else {
            ("FXAA Passthrough", &self.passthrough_pipeline)
        };
        draw_fullscreen(
            encoder,
            label,
            target,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            pipeline,
            &[&self.bind_group],
        );
    }

    #[inline]
    #[must_use]
    pub fn quality(&self) -> FxaaQuality {
        self.quality
    }

    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
    }
}
