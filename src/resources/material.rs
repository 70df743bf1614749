//! PBR Material
//!
//! Metallic-roughness material of a scene object, its G-Buffer flag bits and
//! the per-object uniform block the geometry pass reads.

use bitflags::bitflags;
use glam::{Mat3, Mat4, Vec3, Vec4};

bitflags! {
    /// Bits stored in the alpha channel of the G-Buffer material target.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFlags: u32 {
        /// Emissive colour × intensity is non-zero. SSAO skips these pixels
        /// and lighting adds the emissive term without the BRDF.
        const EMISSIVE = 1 << 0;
    }
}

/// Metallic-roughness material.
///
/// `albedo_map` is an optional fully resident texture produced by the asset
/// side (poster art, cassette labels). When absent, the geometry pass binds
/// a 1×1 white placeholder.
#[derive(Debug, Clone)]
pub struct Material {
    /// Linear RGB base colour
    pub albedo: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    /// Baked ambient occlusion scalar
    pub ao: f32,
    /// Linear RGB emissive colour
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub albedo_map: Option<wgpu::TextureView>,
}

impl Default for Material {
    /// Neutral grey dielectric.
    fn default() -> Self {
        Self {
            albedo: Vec3::splat(0.8),
            metallic: 0.0,
            roughness: 0.5,
            ao: 1.0,
            emissive: Vec3::ZERO,
            emissive_intensity: 0.0,
            albedo_map: None,
        }
    }
}

impl Material {
    #[must_use]
    pub fn new(albedo: Vec3, metallic: f32, roughness: f32) -> Self {
        Self {
            albedo,
            metallic,
            roughness,
            ..Default::default()
        }
    }

    /// Neon signage: emissive colour scaled by `intensity`.
    #[must_use]
    pub fn neon(color: Vec3, intensity: f32) -> Self {
        Self {
            albedo: Vec3::ZERO,
            roughness: 1.0,
            emissive: color,
            emissive_intensity: intensity,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_albedo_map(mut self, view: wgpu::TextureView) -> Self {
        self.albedo_map = Some(view);
        self
    }

    #[must_use]
    pub fn emissive_radiance(&self) -> Vec3 {
        self.emissive * self.emissive_intensity.max(0.0)
    }

    #[must_use]
    pub fn flags(&self) -> MaterialFlags {
        let mut flags = MaterialFlags::empty();
        if self.emissive_radiance().max_element() > 0.0 {
            flags |= MaterialFlags::EMISSIVE;
        }
        flags
    }
}

/// Uniform block of one scene object, re-uploaded every frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3×3, padded to a `mat4`.
    pub normal_matrix: [[f32; 4]; 4],
    pub albedo: [f32; 4],
    /// rgb = emissive × intensity
    pub emissive: [f32; 4],
    /// x = metallic, y = roughness, z = ao, w = has albedo map (0/1)
    pub params: [f32; 4],
    pub flags: u32,
    pub _pad: [u32; 3],
}

impl ObjectUniforms {
    #[must_use]
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal_matrix(model)).to_cols_array_2d(),
            albedo: material.albedo.extend(1.0).to_array(),
            emissive: material.emissive_radiance().extend(1.0).to_array(),
            params: Vec4::new(
                material.metallic.clamp(0.0, 1.0),
                material.roughness.clamp(0.0, 1.0),
                material.ao.clamp(0.0, 1.0),
                if material.albedo_map.is_some() { 1.0 } else { 0.0 },
            )
            .to_array(),
            flags: material.flags().bits(),
            _pad: [0; 3],
        }
    }
}

/// Inverse-transpose of the upper 3×3. Singular matrices fall back to the
/// plain upper 3×3 so degenerate scale never produces NaN normals.
#[must_use]
pub fn normal_matrix(model: Mat4) -> Mat3 {
    let m = Mat3::from_mat4(model);
    if m.determinant().abs() < 1e-12 {
        return m;
    }
    m.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emissive_flag_requires_radiance() {
        assert!(Material::default().flags().is_empty());
        assert!(Material::neon(Vec3::new(1.0, 0.0, 0.5), 4.0)
            .flags()
            .contains(MaterialFlags::EMISSIVE));
        assert!(Material::neon(Vec3::ONE, 0.0).flags().is_empty());
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(model);
        assert!((n.x_axis.x - 0.5).abs() < 1e-6);
        assert!((n.y_axis.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn object_uniforms_layout() {
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 192);
    }
}
