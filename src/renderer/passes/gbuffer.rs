//! G-Buffer Geometry Pass
//!
//! Rasterises every scene object into four colour targets plus depth, all
//! sized to the surface:
//!
//! | Target   | Format        | Contents                              |
//! |----------|---------------|---------------------------------------|
//! | albedo   | `Rgba8Unorm`  | base colour                           |
//! | normal   | `Rgba16Float` | world-space normal, signed            |
//! | material | `Rgba8Unorm`  | metallic / roughness / AO / flags     |
//! | emissive | `Rgba16Float` | emissive colour × intensity (HDR)     |
//! | depth    | `Depth32Float`| standard Z, cleared to 1.0            |
//!
//! The read bind group exposes all five targets plus a nearest sampler to
//! the SSAO and lighting passes; it is rebuilt whenever the targets are.

use crate::errors::Result;
use crate::renderer::pipeline::{
    color_attachment, depth_texture_entry, float_texture_entry, nearest_clamp_sampler,
    pipeline_layout, sampler_entry, uniform_entry,
};
use crate::renderer::render_target::RenderTarget;
use crate::renderer::shader_manager::{ShaderDefines, ShaderManager};
use crate::renderer::{
    GBUFFER_ALBEDO_FORMAT, GBUFFER_DEPTH_FORMAT, GBUFFER_EMISSIVE_FORMAT, GBUFFER_MATERIAL_FORMAT,
    GBUFFER_NORMAL_FORMAT,
};
use crate::resources::mesh::{InstanceData, Vertex};
use crate::scene::camera::CameraUniforms;
use crate::scene::object::SceneObject;

struct GBufferTargets {
    albedo: RenderTarget,
    normal: RenderTarget,
    material: RenderTarget,
    emissive: RenderTarget,
    depth: RenderTarget,
}

impl GBufferTargets {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            albedo: RenderTarget::attachment(device, "GBuffer Albedo", width, height, GBUFFER_ALBEDO_FORMAT)?,
            normal: RenderTarget::attachment(device, "GBuffer Normal", width, height, GBUFFER_NORMAL_FORMAT)?,
            material: RenderTarget::attachment(device, "GBuffer Material", width, height, GBUFFER_MATERIAL_FORMAT)?,
            emissive: RenderTarget::attachment(device, "GBuffer Emissive", width, height, GBUFFER_EMISSIVE_FORMAT)?,
            depth: RenderTarget::attachment(device, "GBuffer Depth", width, height, GBUFFER_DEPTH_FORMAT)?,
        })
    }

    fn destroy(&self) {
        self.albedo.destroy();
        self.normal.destroy();
        self.material.destroy();
        self.emissive.destroy();
        self.depth.destroy();
    }
}

/// Attachments of one geometry pass, borrowed from the G-Buffer.
pub struct GBufferAttachments<'a> {
    colors: [Option<wgpu::RenderPassColorAttachment<'a>>; 4],
    depth_view: &'a wgpu::TextureView,
}

impl GBufferAttachments<'_> {
    #[must_use]
    pub fn render_pass_descriptor(&self) -> wgpu::RenderPassDescriptor<'_> {
        wgpu::RenderPassDescriptor {
            label: Some("GBuffer Pass"),
            color_attachments: &self.colors,
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        }
    }

    /// Clear colours of the four colour targets, in attachment order.
    #[must_use]
    pub fn clear_colors(&self) -> [Option<wgpu::Color>; 4] {
        self.colors.each_ref().map(|attachment| {
            attachment.as_ref().and_then(|a| match a.ops.load {
                wgpu::LoadOp::Clear(color) => Some(color),
                _ => None,
            })
        })
    }
}

fn cleared(view: &wgpu::TextureView, color: wgpu::Color) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(color_attachment(view, wgpu::LoadOp::Clear(color)))
}

pub struct GeometryBuffer {
    targets: GBufferTargets,
    width: u32,
    height: u32,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    albedo_sampler: wgpu::Sampler,

    read_layout: wgpu::BindGroupLayout,
    read_sampler: wgpu::Sampler,
    read_bind_group: wgpu::BindGroup,

    pipeline: wgpu::RenderPipeline,
}

impl GeometryBuffer {
    /// Decodes as "no metal, mid roughness, full AO, no flags".
    pub const MATERIAL_CLEAR: wgpu::Color = wgpu::Color {
        r: 0.0,
        g: 0.5,
        b: 1.0,
        a: 0.0,
    };

    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderManager,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let targets = GBufferTargets::new(device, width, height)?;

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBuffer Camera Layout"),
            entries: &[uniform_entry(
                0,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBuffer Object Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
                float_texture_entry(1, true),
                sampler_entry(2, wgpu::SamplerBindingType::Filtering),
            ],
        });
        let read_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GBuffer Read Layout"),
            entries: &[
                float_texture_entry(0, false),
                float_texture_entry(1, false),
                float_texture_entry(2, false),
                float_texture_entry(3, false),
                depth_texture_entry(4),
                sampler_entry(5, wgpu::SamplerBindingType::NonFiltering),
            ],
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("GBuffer Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GBuffer Camera BindGroup"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let albedo_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Albedo Map Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let read_sampler = nearest_clamp_sampler(device, "GBuffer Read Sampler");
        let read_bind_group = Self::create_read_bind_group(device, &read_layout, &targets, &read_sampler);

        let (module, _) = shaders.get_or_compile(device, "passes/gbuffer", &ShaderDefines::new())?;
        let layout = pipeline_layout(device, "GBuffer Pipeline Layout", &[&camera_layout, &object_layout]);

        let color_target = |format| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };

        log::debug!("Creating GBuffer pipeline");
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("GBuffer Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), InstanceData::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[
                    color_target(GBUFFER_ALBEDO_FORMAT),
                    color_target(GBUFFER_NORMAL_FORMAT),
                    color_target(GBUFFER_MATERIAL_FORMAT),
                    color_target(GBUFFER_EMISSIVE_FORMAT),
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: GBUFFER_DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            targets,
            width,
            height,
            camera_buffer,
            camera_bind_group,
            object_layout,
            albedo_sampler,
            read_layout,
            read_sampler,
            read_bind_group,
            pipeline,
        })
    }

    fn create_read_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        targets: &GBufferTargets,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GBuffer Read BindGroup"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&targets.albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&targets.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&targets.material.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&targets.emissive.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(&targets.depth.view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Recreates every target when the size changed.
    ///
    /// Returns `true` when targets were recreated, `false` for a no-op.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> Result<bool> {
        crate::errors::ensure_dimensions("GBuffer", width, height)?;
        if (width, height) == (self.width, self.height) {
            return Ok(false);
        }

        self.targets.destroy();
        self.targets = GBufferTargets::new(device, width, height)?;
        self.read_bind_group =
            Self::create_read_bind_group(device, &self.read_layout, &self.targets, &self.read_sampler);
        self.width = width;
        self.height = height;
        log::debug!("GBuffer resized to {width}x{height}");
        Ok(true)
    }

    #[must_use]
    pub fn render_pass_attachments(&self) -> GBufferAttachments<'_> {
        GBufferAttachments {
            colors: [
                cleared(&self.targets.albedo.view, wgpu::Color::TRANSPARENT),
                cleared(&self.targets.normal.view, wgpu::Color::TRANSPARENT),
                cleared(&self.targets.material.view, Self::MATERIAL_CLEAR),
                cleared(&self.targets.emissive.view, wgpu::Color::TRANSPARENT),
            ],
            depth_view: &self.targets.depth.view,
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraUniforms) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(camera));
    }

    /// Records the geometry pass for `objects`.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, objects: &[SceneObject]) {
        let attachments = self.render_pass_attachments();
        let mut pass = encoder.begin_render_pass(&attachments.render_pass_descriptor());
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        for object in objects {
            object.draw(&mut pass, 1);
        }
    }

    #[inline]
    #[must_use]
    pub fn object_layout(&self) -> &wgpu::BindGroupLayout {
        &self.object_layout
    }

    #[inline]
    #[must_use]
    pub fn albedo_sampler(&self) -> &wgpu::Sampler {
        &self.albedo_sampler
    }

    #[inline]
    #[must_use]
    pub fn read_layout(&self) -> &wgpu::BindGroupLayout {
        &self.read_layout
    }

    #[inline]
    #[must_use]
    pub fn read_bind_group(&self) -> &wgpu::BindGroup {
        &self.read_bind_group
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sizes of albedo, normal, material, emissive and depth, in that order.
    #[must_use]
    pub fn target_sizes(&self) -> [(u32, u32); 5] {
        [
            self.targets.albedo.size(),
            self.targets.normal.size(),
            self.targets.material.size(),
            self.targets.emissive.size(),
            self.targets.depth.size(),
        ]
    }

    pub fn destroy(&self) {
        self.targets.destroy();
        self.camera_buffer.destroy();
    }
}
