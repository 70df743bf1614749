//! Scene Lights
//!
//! CPU-side light descriptions and their GPU packing. Point lights have no
//! persistent GPU object: the whole list is packed into one fixed-capacity
//! uniform block every frame.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::resources::shadow::{ShadowLight, ShadowSettings};

/// Capacity of the packed point-light block.
pub const MAX_POINT_LIGHTS: usize = 32;

/// Linear attenuation coefficient `k_l` in `1 / (1 + k_l·d + k_q·d²)`.
pub const ATTENUATION_LINEAR: f32 = 0.09;
/// Quadratic attenuation coefficient `k_q`.
pub const ATTENUATION_QUADRATIC: f32 = 0.032;

// ============================================================================
// CPU light descriptions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    /// Linear RGB
    pub color: Vec3,
    pub intensity: f32,
    /// Influence radius; contribution reaches zero here.
    pub radius: f32,
}

impl PointLight {
    #[must_use]
    pub fn new(position: Vec3, color: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            position,
            color,
            intensity: intensity.max(0.0),
            radius: radius.max(1e-3),
        }
    }
}

/// The directional "sky" term (moonlight through the shop window).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyLight {
    /// Direction the light travels (from the sky towards the scene).
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for SkyLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.3, -1.0, -0.4),
            color: Vec3::new(0.6, 0.7, 1.0),
            intensity: 0.3,
        }
    }
}

/// Hemispherical ambient: sky and ground colours blended by `normal.y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLight {
    pub sky_color: Vec3,
    pub ground_color: Vec3,
    pub intensity: f32,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            sky_color: Vec3::new(0.25, 0.22, 0.35),
            ground_color: Vec3::new(0.08, 0.06, 0.05),
            intensity: 1.0,
        }
    }
}

// ============================================================================
// GPU packing
// ============================================================================

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl From<&PointLight> for GpuPointLight {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.to_array(),
            radius: light.radius,
            color: light.color.to_array(),
            intensity: light.intensity,
        }
    }
}

/// Fixed-capacity uniform block of point lights.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightBlock {
    pub lights: [GpuPointLight; MAX_POINT_LIGHTS],
    pub count: u32,
    pub _pad: [u32; 3],
}

impl Default for PointLightBlock {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

impl PointLightBlock {
    /// Number of valid entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Packs the point-light list every frame.
///
/// Lights beyond [`MAX_POINT_LIGHTS`] are dropped; the first overflow is
/// reported once at `warn` level for the lifetime of the packer.
#[derive(Debug, Default)]
pub struct PointLightPacker {
    overflow_reported: bool,
}

impl PointLightPacker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pack(&mut self, lights: &[PointLight]) -> PointLightBlock {
        if lights.len() > MAX_POINT_LIGHTS && !self.overflow_reported {
            log::warn!(
                "{} point lights exceed the capacity of {MAX_POINT_LIGHTS}; extra lights are ignored",
                lights.len()
            );
            self.overflow_reported = true;
        }

        let mut block = PointLightBlock::default();
        let count = lights.len().min(MAX_POINT_LIGHTS);
        for (slot, light) in block.lights.iter_mut().zip(&lights[..count]) {
            *slot = light.into();
        }
        block.count = count as u32;
        block
    }

    #[inline]
    #[must_use]
    pub fn overflow_reported(&self) -> bool {
        self.overflow_reported
    }
}

// ============================================================================
// Lighting uniforms
// ============================================================================

/// Per-frame uniform block of the lighting pass.
///
/// Scalars are folded into `vec4` lanes to keep the WGSL layout trivial.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniforms {
    pub inv_view_projection: [[f32; 4]; 4],
    pub light_space: [[f32; 4]; 4],
    /// xyz = camera position
    pub camera_position: [f32; 4],
    /// xyz = direction (normalized), w = intensity
    pub sky_direction: [f32; 4],
    pub sky_color: [f32; 4],
    /// rgb = ambient sky colour, w = ambient intensity
    pub ambient_sky: [f32; 4],
    pub ambient_ground: [f32; 4],
    /// xyz = shadow light position, w = intensity
    pub shadow_light_position: [f32; 4],
    /// rgb = shadow light colour
    pub shadow_light_color: [f32; 4],
    /// x = bias, y = normal bias, z = enabled (0/1), w = 1 / map size
    pub shadow_params: [f32; 4],
    /// xyz = cone direction, w = cos(half fov), or -1 for orthographic lights
    pub shadow_light_direction: [f32; 4],
    pub clear_color: [f32; 4],
    /// x = k_l, y = k_q
    pub attenuation: [f32; 4],
}

/// Everything the lighting pass needs besides the G-Buffer.
#[derive(Debug, Clone, Copy)]
pub struct LightingInputs<'a> {
    pub inv_view_projection: Mat4,
    pub camera_position: Vec3,
    pub sky: &'a SkyLight,
    pub ambient: &'a AmbientLight,
    pub shadow_light: &'a ShadowLight,
    pub shadow: &'a ShadowSettings,
    pub clear_color: [f32; 4],
}

impl LightingUniforms {
    #[must_use]
    pub fn new(inputs: &LightingInputs<'_>) -> Self {
        let sky_dir = inputs.sky.direction.try_normalize().unwrap_or(Vec3::NEG_Y);
        let shadow_light = inputs.shadow_light;
        let cone = match shadow_light.ortho_size {
            Some(_) => -1.0,
            None => {
                let fov = shadow_light
                    .fov
                    .unwrap_or(crate::resources::shadow::DEFAULT_SHADOW_FOV_DEGREES);
                (fov.to_radians() * 0.5).cos()
            }
        };

        Self {
            inv_view_projection: inputs.inv_view_projection.to_cols_array_2d(),
            light_space: shadow_light.light_space_matrix().to_cols_array_2d(),
            camera_position: inputs.camera_position.extend(1.0).to_array(),
            sky_direction: sky_dir.extend(inputs.sky.intensity).to_array(),
            sky_color: inputs.sky.color.extend(1.0).to_array(),
            ambient_sky: inputs.ambient.sky_color.extend(inputs.ambient.intensity).to_array(),
            ambient_ground: inputs.ambient.ground_color.extend(1.0).to_array(),
            shadow_light_position: shadow_light
                .position
                .extend(shadow_light.intensity)
                .to_array(),
            shadow_light_color: shadow_light.color.extend(1.0).to_array(),
            shadow_params: [
                inputs.shadow.bias,
                inputs.shadow.normal_bias,
                if inputs.shadow.enabled { 1.0 } else { 0.0 },
                1.0 / inputs.shadow.map_size.max(1) as f32,
            ],
            shadow_light_direction: shadow_light.direction().extend(cone).to_array(),
            clear_color: inputs.clear_color,
            attenuation: [ATTENUATION_LINEAR, ATTENUATION_QUADRATIC, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lights(n: usize) -> Vec<PointLight> {
        (0..n)
            .map(|i| PointLight::new(Vec3::new(i as f32, 3.0, 0.0), Vec3::ONE, 1.0, 5.0))
            .collect()
    }

    #[test]
    fn packs_in_order() {
        let mut packer = PointLightPacker::new();
        let block = packer.pack(&lights(3));
        assert_eq!(block.len(), 3);
        assert_eq!(block.lights[2].position, [2.0, 3.0, 0.0]);
        assert_eq!(block.lights[3], GpuPointLight::default());
        assert!(!packer.overflow_reported());
    }

    #[test]
    fn overflow_is_truncated_and_reported_once() {
        let mut packer = PointLightPacker::new();
        assert_eq!(packer.pack(&lights(40)).len(), MAX_POINT_LIGHTS);
        assert!(packer.overflow_reported());
        assert_eq!(packer.pack(&lights(50)).len(), MAX_POINT_LIGHTS);
    }

    #[test]
    fn block_layout_is_uniform_friendly() {
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 32);
        assert_eq!(std::mem::size_of::<PointLightBlock>() % 16, 0);
        assert_eq!(std::mem::size_of::<LightingUniforms>() % 16, 0);
    }
}
