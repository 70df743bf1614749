//! Scene Objects
//!
//! A [`SceneObject`] owns the GPU side of one drawable: vertex, index and
//! instance buffers, its uniform buffer and the G-Buffer bind group. All of
//! them are created when the object is added and live until teardown; only
//! the uniform buffer is rewritten per frame.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::errors::{MarqueeError, Result};
use crate::resources::material::{Material, ObjectUniforms};
use crate::resources::mesh::{InstanceData, Mesh};

/// Stable handle of an object inside one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Shared inputs needed to build an object's G-Buffer bind group.
#[derive(Clone, Copy)]
pub struct ObjectBindings<'a> {
    pub layout: &'a wgpu::BindGroupLayout,
    /// Bound when the material has no albedo map.
    pub placeholder_albedo: &'a wgpu::TextureView,
    pub sampler: &'a wgpu::Sampler,
}

pub struct SceneObject {
    id: ObjectId,
    transform: Mat4,
    material: Material,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    index_count: u32,
    instance_count: u32,
}

impl SceneObject {
    /// Uploads `mesh` and `instances` immediately.
    ///
    /// Fails with `InvalidScene` for malformed meshes or an empty instance list.
    pub fn new(
        device: &wgpu::Device,
        id: ObjectId,
        mesh: &Mesh,
        transform: Mat4,
        instances: &[Mat4],
        material: Material,
        bindings: ObjectBindings<'_>,
    ) -> Result<Self> {
        mesh.validate()?;
        if instances.is_empty() {
            return Err(MarqueeError::InvalidScene(format!(
                "object {} has an empty instance list",
                id.0
            )));
        }

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_data: Vec<InstanceData> =
            instances.iter().copied().map(InstanceData::new).collect();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Instances"),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Uniforms"),
            contents: bytemuck::bytes_of(&ObjectUniforms::new(transform, &material)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let albedo_view = material
            .albedo_map
            .as_ref()
            .unwrap_or(bindings.placeholder_albedo);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: bindings.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(albedo_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(bindings.sampler),
                },
            ],
        });

        Ok(Self {
            id,
            transform,
            material,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            uniform_buffer,
            bind_group,
            index_count: mesh.indices.len() as u32,
            instance_count: instances.len() as u32,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Takes effect at the next uniform upload.
    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    #[inline]
    #[must_use]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[inline]
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    /// Rewrites the uniform buffer from the CPU-side transform and material.
    pub fn upload(&self, queue: &wgpu::Queue) {
        let uniforms = ObjectUniforms::new(self.transform, &self.material);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// G-Buffer draw: binds the object group at `group` and draws every instance.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, group: u32) {
        pass.set_bind_group(group, &self.bind_group, &[]);
        self.draw_geometry(pass);
    }

    /// Binds geometry only; the caller provides every bind group.
    pub fn draw_geometry(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..self.instance_count);
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.instance_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

impl std::fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneObject")
            .field("id", &self.id)
            .field("index_count", &self.index_count)
            .field("instance_count", &self.instance_count)
            .finish_non_exhaustive()
    }
}
