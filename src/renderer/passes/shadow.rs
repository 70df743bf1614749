//! Shadow Map Pass
//!
//! Depth-only render of every object from the shadow light into a
//! dedicated `Depth32Float` map. Each draw takes its
//! (light view-projection, model) pair from a [`UniformArena`], so the
//! number of casters can grow without reallocating a shared buffer.
//!
//! The map is sampled by the lighting pass through a comparison sampler
//! (hardware PCF).

use glam::Mat4;
use smallvec::SmallVec;

use crate::errors::Result;
use crate::renderer::pipeline::{pipeline_layout, uniform_entry};
use crate::renderer::render_target::RenderTarget;
use crate::renderer::shader_manager::{ShaderDefines, ShaderManager};
use crate::renderer::uniform_arena::UniformArena;
use crate::renderer::SHADOW_MAP_FORMAT;
use crate::resources::mesh::{InstanceData, Vertex};
use crate::resources::shadow::ShadowDrawUniforms;
use crate::scene::object::SceneObject;

/// Fixed rasteriser bias applied on top of the shader-side `bias`.
const DEPTH_BIAS: wgpu::DepthBiasState = wgpu::DepthBiasState {
    constant: 2,
    slope_scale: 2.0,
    clamp: 0.0,
};

pub struct ShadowPass {
    map: RenderTarget,
    pipeline: wgpu::RenderPipeline,
    arena: UniformArena<ShadowDrawUniforms>,
    comparison_sampler: wgpu::Sampler,
}

impl ShadowPass {
    pub fn new(device: &wgpu::Device, shaders: &mut ShaderManager, map_size: u32) -> Result<Self> {
        let map = Self::create_map(device, map_size)?;

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Draw Layout"),
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
        });

        let (module, _) = shaders.get_or_compile(device, "passes/shadow", &ShaderDefines::new())?;
        let layout = pipeline_layout(device, "Shadow Pipeline Layout", &[&draw_layout]);

        log::debug!("Creating shadow pipeline");
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), InstanceData::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_MAP_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::LessEqual),
                stencil: wgpu::StencilState::default(),
                bias: DEPTH_BIAS,
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let comparison_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Ok(Self {
            map,
            pipeline,
            arena: UniformArena::new("Shadow Draw Uniforms", draw_layout),
            comparison_sampler,
        })
    }

    fn create_map(device: &wgpu::Device, size: u32) -> Result<RenderTarget> {
        RenderTarget::new(
            device,
            "Shadow Map",
            size,
            size,
            SHADOW_MAP_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }

    /// Recreates the map at `size`; returns `false` when the size is unchanged.
    ///
    /// Bind groups holding the old view must be rebuilt by the caller.
    pub fn resize_map(&mut self, device: &wgpu::Device, size: u32) -> Result<bool> {
        if size == self.map.width {
            return Ok(false);
        }
        self.map.destroy();
        self.map = Self::create_map(device, size)?;
        log::debug!("Shadow map recreated at {size}x{size}");
        Ok(true)
    }

    /// Records the depth pass for every object.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        light_space: Mat4,
        objects: &[SceneObject],
    ) {
        self.arena.begin_frame();
        let slots: SmallVec<[usize; 32]> = objects
            .iter()
            .map(|object| {
                let uniforms = ShadowDrawUniforms::new(light_space, object.transform());
                self.arena.allocate(device, queue, &uniforms)
            })
            .collect();

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.map.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        pass.set_pipeline(&self.pipeline);

        for (object, slot) in objects.iter().zip(slots) {
            let Some(bind_group) = self.arena.bind_group(slot) else {
                continue;
            };
            pass.set_bind_group(0, bind_group, &[]);
            object.draw_geometry(&mut pass);
        }
    }

    #[inline]
    #[must_use]
    pub fn map_view(&self) -> &wgpu::TextureView {
        &self.map.view
    }

    #[inline]
    #[must_use]
    pub fn map_size(&self) -> u32 {
        self.map.width
    }

    #[inline]
    #[must_use]
    pub fn comparison_sampler(&self) -> &wgpu::Sampler {
        &self.comparison_sampler
    }

    /// Transient uniform slots created so far.
    #[inline]
    #[must_use]
    pub fn arena_capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub fn destroy(&mut self) {
        self.map.destroy();
        self.arena.destroy();
    }
}
