//! Screen-Space Ambient Occlusion Pass
//!
//! Hemisphere-kernel SSAO computed from G-Buffer depth and normals,
//! optionally at half resolution, followed by a separable blur:
//!
//! ```text
//! G-Buffer ─► SSAO ─► occlusion ─► blur H ─► scratch ─► blur V ─► occlusion
//! ```
//!
//! The result is an `R8Unorm` factor the lighting pass multiplies into the
//! ambient term only. When SSAO is disabled the lighting pass binds
//! [`SsaoPass::output_view`]'s 1×1 white fallback instead, so its layout
//! never changes.

use glam::Mat4;

use crate::errors::Result;
use crate::renderer::pipeline::{
    color_target, draw_fullscreen, float_texture_entry, fullscreen_pipeline, linear_clamp_sampler,
    pipeline_layout, sampler_entry, uniform_entry,
};
use crate::renderer::render_target::RenderTarget;
use crate::renderer::shader_manager::{ShaderDefines, ShaderManager};
use crate::renderer::SSAO_FORMAT;
use crate::resources::ssao::{
    SsaoBlurUniforms, SsaoSettings, SsaoUniforms, generate_ssao_noise,
};

struct SsaoTargets {
    occlusion: RenderTarget,
    scratch: RenderTarget,
}

impl SsaoTargets {
    fn new(device: &wgpu::Device, (width, height): (u32, u32)) -> Result<Self> {
        Ok(Self {
            occlusion: RenderTarget::attachment(device, "SSAO Occlusion", width, height, SSAO_FORMAT)?,
            scratch: RenderTarget::attachment(device, "SSAO Blur Scratch", width, height, SSAO_FORMAT)?,
        })
    }

    fn destroy(&self) {
        self.occlusion.destroy();
        self.scratch.destroy();
    }
}

pub struct SsaoPass {
    settings: SsaoSettings,
    surface_size: (u32, u32),
    targets: SsaoTargets,
    white: RenderTarget,
    noise: RenderTarget,

    uniforms: SsaoUniforms,
    uniform_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,

    blur_layout: wgpu::BindGroupLayout,
    blur_sampler: wgpu::Sampler,
    blur_h_buffer: wgpu::Buffer,
    blur_v_buffer: wgpu::Buffer,
    blur_h_bind_group: wgpu::BindGroup,
    blur_v_bind_group: wgpu::BindGroup,

    pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
}

impl SsaoPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shaders: &mut ShaderManager,
        gbuffer_layout: &wgpu::BindGroupLayout,
        settings: SsaoSettings,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let settings = settings.sanitized();
        let target_size = settings.target_size(width, height);
        let targets = SsaoTargets::new(device, target_size)?;

        let white = RenderTarget::solid(device, queue, "SSAO Disabled", SSAO_FORMAT, &[255])?;
        let noise_texels: Vec<u8> = generate_ssao_noise().into_iter().flatten().collect();
        let noise = RenderTarget::new(
            device,
            "SSAO Noise",
            4,
            4,
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        )?;
        noise.upload(queue, &noise_texels);

        let noise_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("SSAO Noise Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        // Kernel is regenerated only when the settings change; view and
        // projection are patched in every frame.
        let uniforms = settings.uniforms(Mat4::IDENTITY, Mat4::IDENTITY, target_size);
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("SSAO Uniforms"),
            size: std::mem::size_of::<SsaoUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Params Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                float_texture_entry(1, false),
                sampler_entry(2, wgpu::SamplerBindingType::NonFiltering),
            ],
        });
        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("SSAO Params BindGroup"),
            layout: &params_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&noise.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&noise_sampler),
                },
            ],
        });

        let blur_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("SSAO Blur Layout"),
            entries: &[
                float_texture_entry(0, true),
                sampler_entry(1, wgpu::SamplerBindingType::Filtering),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let blur_sampler = linear_clamp_sampler(device, "SSAO Blur Sampler");
        let blur_buffer = |label| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<SsaoBlurUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let blur_h_buffer = blur_buffer("SSAO Blur H Uniforms");
        let blur_v_buffer = blur_buffer("SSAO Blur V Uniforms");
        let (blur_h_bind_group, blur_v_bind_group) = Self::create_blur_bind_groups(
            device,
            &blur_layout,
            &targets,
            &blur_sampler,
            &blur_h_buffer,
            &blur_v_buffer,
        );

        let (module, _) = shaders.get_or_compile(device, "passes/ssao", &ShaderDefines::new())?;
        let layout = pipeline_layout(device, "SSAO Pipeline Layout", &[gbuffer_layout, &params_layout]);
        let pipeline = fullscreen_pipeline(
            device,
            "SSAO Pipeline",
            &module,
            &layout,
            &[color_target(SSAO_FORMAT, None)],
        );

        let (blur_module, _) =
            shaders.get_or_compile(device, "passes/ssao_blur", &ShaderDefines::new())?;
        let blur_pipeline_layout = pipeline_layout(device, "SSAO Blur Pipeline Layout", &[&blur_layout]);
        let blur_pipeline = fullscreen_pipeline(
            device,
            "SSAO Blur Pipeline",
            &blur_module,
            &blur_pipeline_layout,
            &[color_target(SSAO_FORMAT, None)],
        );

        let pass = Self {
            settings,
            surface_size: (width, height),
            targets,
            white,
            noise,
            uniforms,
            uniform_buffer,
            params_bind_group,
            blur_layout,
            blur_sampler,
            blur_h_buffer,
            blur_v_buffer,
            blur_h_bind_group,
            blur_v_bind_group,
            pipeline,
            blur_pipeline,
        };
        pass.write_blur_uniforms(queue);
        Ok(pass)
    }

    fn create_blur_bind_groups(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        targets: &SsaoTargets,
        sampler: &wgpu::Sampler,
        h_buffer: &wgpu::Buffer,
        v_buffer: &wgpu::Buffer,
    ) -> (wgpu::BindGroup, wgpu::BindGroup) {
        let create = |label, source: &wgpu::TextureView, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
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
        };
        (
            create("SSAO Blur H BindGroup", &targets.occlusion.view, h_buffer),
            create("SSAO Blur V BindGroup", &targets.scratch.view, v_buffer),
        )
    }

    fn write_blur_uniforms(&self, queue: &wgpu::Queue) {
        let (w, h) = self.targets.occlusion.size();
        let texel_size = [1.0 / w as f32, 1.0 / h as f32];
        let horizontal = SsaoBlurUniforms {
            direction: [1.0, 0.0],
            texel_size,
        };
        let vertical = SsaoBlurUniforms {
            direction: [0.0, 1.0],
            texel_size,
        };
        queue.write_buffer(&self.blur_h_buffer, 0, bytemuck::bytes_of(&horizontal));
        queue.write_buffer(&self.blur_v_buffer, 0, bytemuck::bytes_of(&vertical));
    }

    fn recreate_targets(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<()> {
        let size = self.target_size();
        self.targets.destroy();
        self.targets = SsaoTargets::new(device, size)?;
        let (h, v) = Self::create_blur_bind_groups(
            device,
            &self.blur_layout,
            &self.targets,
            &self.blur_sampler,
            &self.blur_h_buffer,
            &self.blur_v_buffer,
        );
        self.blur_h_bind_group = h;
        self.blur_v_bind_group = v;
        self.write_blur_uniforms(queue);
        log::debug!("SSAO targets recreated at {}x{}", size.0, size.1);
        Ok(())
    }

    /// Follows the surface size. The output view changes; rebind consumers.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
    ) -> Result<()> {
        crate::errors::ensure_dimensions("SSAO", width, height)?;
        self.surface_size = (width, height);
        self.uniforms.noise_scale = self.noise_scale();
        self.recreate_targets(device, queue)
    }

    /// Applies new settings. Returns `true` when the targets were recreated.
    pub fn apply_settings(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        settings: SsaoSettings,
    ) -> Result<bool> {
        let settings = settings.sanitized();
        let recreate = settings.half_resolution != self.settings.half_resolution;
        let view = Mat4::from_cols_array_2d(&self.uniforms.view);
        let projection = Mat4::from_cols_array_2d(&self.uniforms.projection);
        self.settings = settings;
        self.uniforms = settings.uniforms(view, projection, self.target_size());
        if recreate {
            self.recreate_targets(device, queue)?;
        }
        Ok(recreate)
    }

    fn noise_scale(&self) -> [f32; 2] {
        let (w, h) = self.target_size();
        [w as f32 / 4.0, h as f32 / 4.0]
    }

    /// Uploads this frame's view and projection.
    pub fn update(&mut self, queue: &wgpu::Queue, view: Mat4, projection: Mat4) {
        self.uniforms.view = view.to_cols_array_2d();
        self.uniforms.projection = projection.to_cols_array_2d();
        self.uniforms.inv_projection = projection.inverse().to_cols_array_2d();
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    /// Records occlusion then the horizontal and vertical blur.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, gbuffer: &wgpu::BindGroup) {
        let clear = wgpu::LoadOp::Clear(wgpu::Color::WHITE);
        draw_fullscreen(
            encoder,
            "SSAO Pass",
            &self.targets.occlusion.view,
            clear,
            &self.pipeline,
            &[gbuffer, &self.params_bind_group],
        );
        draw_fullscreen(
            encoder,
            "SSAO Blur H",
            &self.targets.scratch.view,
            clear,
            &self.blur_pipeline,
            &[&self.blur_h_bind_group],
        );
        draw_fullscreen(
            encoder,
            "SSAO Blur V",
            &self.targets.occlusion.view,
            clear,
            &self.blur_pipeline,
            &[&self.blur_v_bind_group],
        );
    }

    /// Blurred occlusion when `enabled`, the white fallback otherwise.
    #[must_use]
    pub fn output_view(&self, enabled: bool) -> &wgpu::TextureView {
        if enabled {
            &self.targets.occlusion.view
        } else {
            &self.white.view
        }
    }

    #[inline]
    #[must_use]
    pub fn target_size(&self) -> (u32, u32) {
        self.settings
            .target_size(self.surface_size.0, self.surface_size.1)
    }

    /// Actual size of the occlusion texture.
    #[inline]
    #[must_use]
    pub fn texture_size(&self) -> (u32, u32) {
        self.targets.occlusion.size()
    }

    pub fn destroy(&self) {
        self.targets.destroy();
        self.white.destroy();
        self.noise.destroy();
        self.uniform_buffer.destroy();
        self.blur_h_buffer.destroy();
        self.blur_v_buffer.destroy();
    }
}
