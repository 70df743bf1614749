//! Tone Mapping Pass
//!
//! HDR → LDR: optional bloom add, exposure, colour grading, tone curve,
//! vignette and gamma. The bloom texture is a separate template variant
//! (`USE_BLOOM`) so disabling bloom needs neither a dummy texture nor a
//! branch in the shader.

use crate::errors::Result;
use crate::renderer::LDR_FORMAT;
use crate::renderer::pipeline::{
    color_target, draw_fullscreen, float_texture_entry, fullscreen_pipeline, linear_clamp_sampler,
    pipeline_layout, sampler_entry, uniform_entry,
};
use crate::renderer::shader_manager::{ShaderDefines, ShaderManager};
use crate::resources::tone_mapping::{ToneMappingSettings, ToneMappingUniforms};

struct Variant {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

pub struct ToneMappingPass {
    plain: Variant,
    with_bloom: Variant,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
}

impl ToneMappingPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        hdr: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
    ) -> Result<Self> {
        let sampler = linear_clamp_sampler(device, "Tone Mapping Sampler");
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Tone Mapping Uniforms"),
            size: std::mem::size_of::<ToneMappingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let plain = Self::create_variant(device, shaders, &sampler, &uniform_buffer, hdr, None)?;
        let with_bloom =
            Self::create_variant(device, shaders, &sampler, &uniform_buffer, hdr, Some(bloom))?;

        Ok(Self {
            plain,
            with_bloom,
            sampler,
            uniform_buffer,
        })
    }

    fn layout_entries(use_bloom: bool) -> Vec<wgpu::BindGroupLayoutEntry> {
        let mut entries = vec![
            float_texture_entry(0, true),
            sampler_entry(1, wgpu::SamplerBindingType::Filtering),
            uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
        ];
        if use_bloom {
            entries.push(float_texture_entry(3, true));
        }
        entries
    }

    fn create_variant(
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
        hdr: &wgpu::TextureView,
        bloom: Option<&wgpu::TextureView>,
    ) -> Result<Variant> {
        let use_bloom = bloom.is_some();
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Tone Mapping Layout"),
            entries: &Self::layout_entries(use_bloom),
        });

        let mut defines = ShaderDefines::new();
        defines.toggle("USE_BLOOM", use_bloom);
        let (module, _) = shaders.get_or_compile(device, "passes/tone_mapping", &defines)?;
        let pipeline_layout = pipeline_layout(device, "Tone Mapping Pipeline Layout", &[&layout]);
        let pipeline = fullscreen_pipeline(
            device,
            "Tone Mapping Pipeline",
            &module,
            &pipeline_layout,
            &[color_target(LDR_FORMAT, None)],
        );

        let bind_group =
            Self::create_bind_group(device, &layout, sampler, uniform_buffer, hdr, bloom);
        Ok(Variant {
            layout,
            pipeline,
            bind_group,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        uniform_buffer: &wgpu::Buffer,
        hdr: &wgpu::TextureView,
        bloom: Option<&wgpu::TextureView>,
    ) -> wgpu::BindGroup {
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(hdr),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform_buffer.as_entire_binding(),
            },
        ];
        if let Some(bloom) = bloom {
            entries.push(wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(bloom),
            });
        }
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Tone Mapping BindGroup"),
            layout,
            entries: &entries,
        })
    }

    /// Rebuilds both variants' groups after the HDR or bloom views changed.
    pub fn rebind(&mut self, device: &wgpu::Device, hdr: &wgpu::TextureView, bloom: &wgpu::TextureView) {
        self.plain.bind_group = Self::create_bind_group(
            device,
            &self.plain.layout,
            &self.sampler,
            &self.uniform_buffer,
            hdr,
            None,
        );
        self.with_bloom.bind_group = Self::create_bind_group(
            device,
            &self.with_bloom.layout,
            &self.sampler,
            &self.uniform_buffer,
            hdr,
            Some(bloom),
        );
    }

    pub fn update(&self, queue: &wgpu::Queue, settings: &ToneMappingSettings, bloom_intensity: f32) {
        let uniforms = settings.uniforms(bloom_intensity);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, use_bloom: bool) {
        let variant = if use_bloom { &self.with_bloom } else { &self.plain };
        draw_fullscreen(
            encoder,
            "Tone Mapping Pass",
            target,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &variant.pipeline,
            &[&variant.bind_group],
        );
    }

    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
    }
}
