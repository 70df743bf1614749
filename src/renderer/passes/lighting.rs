//! Deferred Lighting Pass
//!
//! Full-screen resolve of the G-Buffer into the HDR target. Group 0 is the
//! shared G-Buffer read group; group 1 carries the lighting uniforms, the
//! packed point lights, the (possibly white) occlusion texture and the
//! shadow map with its comparison sampler.

use crate::errors::Result;
use crate::renderer::HDR_FORMAT;
use crate::renderer::pipeline::{
    color_target, depth_texture_entry, draw_fullscreen, float_texture_entry, fullscreen_pipeline,
    linear_clamp_sampler, pipeline_layout, sampler_entry, uniform_entry,
};
use crate::renderer::shader_manager::{ShaderDefines, ShaderManager};
use crate::resources::light::{LightingUniforms, PointLightBlock};

/// Views the lighting group samples besides the G-Buffer.
#[derive(Clone, Copy)]
pub struct LightingInputViews<'a> {
    pub occlusion: &'a wgpu::TextureView,
    pub shadow_map: &'a wgpu::TextureView,
    pub shadow_sampler: &'a wgpu::Sampler,
}

pub struct LightingPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    point_light_buffer: wgpu::Buffer,
    ao_sampler: wgpu::Sampler,
}

impl LightingPass {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        gbuffer_layout: &wgpu::BindGroupLayout,
        inputs: LightingInputViews<'_>,
    ) -> Result<Self> {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                float_texture_entry(2, true),
                sampler_entry(3, wgpu::SamplerBindingType::Filtering),
                depth_texture_entry(4),
                sampler_entry(5, wgpu::SamplerBindingType::Comparison),
            ],
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Lighting Uniforms"),
            size: std::mem::size_of::<LightingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let point_light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Lights"),
            size: std::mem::size_of::<PointLightBlock>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let ao_sampler = linear_clamp_sampler(device, "Lighting AO Sampler");

        let bind_group = Self::create_bind_group(
            device,
            &layout,
            &uniform_buffer,
            &point_light_buffer,
            &ao_sampler,
            inputs,
        );

        let (module, _) = shaders.get_or_compile(device, "passes/lighting", &ShaderDefines::new())?;
        let pipeline_layout =
            pipeline_layout(device, "Lighting Pipeline Layout", &[gbuffer_layout, &layout]);
        let pipeline = fullscreen_pipeline(
            device,
            "Lighting Pipeline",
            &module,
            &pipeline_layout,
            &[color_target(HDR_FORMAT, None)],
        );

        Ok(Self {
            pipeline,
            layout,
            bind_group,
            uniform_buffer,
            point_light_buffer,
            ao_sampler,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        point_light_buffer: &wgpu::Buffer,
        ao_sampler: &wgpu::Sampler,
        inputs: LightingInputViews<'_>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting BindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: point_light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(inputs.occlusion),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(ao_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(inputs.shadow_map),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(inputs.shadow_sampler),
                },
            ],
        })
    }

    /// Rebuilds the group after the occlusion or shadow views changed.
    pub fn rebind(&mut self, device: &wgpu::Device, inputs: LightingInputViews<'_>) {
        self.bind_group = Self::create_bind_group(
            device,
            &self.layout,
            &self.uniform_buffer,
            &self.point_light_buffer,
            &self.ao_sampler,
            inputs,
        );
    }

    pub fn update(&self, queue: &wgpu::Queue, uniforms: &LightingUniforms, lights: &PointLightBlock) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
        queue.write_buffer(&self.point_light_buffer, 0, bytemuck::bytes_of(lights));
    }

    /// Resolves every pixel into `hdr`; background pixels get the clear colour.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        hdr: &wgpu::TextureView,
        gbuffer: &wgpu::BindGroup,
    ) {
        draw_fullscreen(
            encoder,
            "Lighting Pass",
            hdr,
            wgpu::LoadOp::Clear(wgpu::Color::BLACK),
            &self.pipeline,
            &[gbuffer, &self.bind_group],
        );
    }

    pub fn destroy(&self) {
        self.uniform_buffer.destroy();
        self.point_light_buffer.destroy();
    }
}
