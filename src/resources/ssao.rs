//! SSAO (Screen Space Ambient Occlusion) Configuration
//!
//! This module defines SSAO settings as pure data structures, following the same
//! pattern as [`BloomSettings`](super::bloom::BloomSettings) and
//! [`ToneMappingSettings`](super::tone_mapping::ToneMappingSettings).
//!
//! # Algorithm
//!
//! The SSAO implementation uses:
//! 1. A hemisphere sample kernel (up to 64 samples) with importance-weighted
//!    distribution concentrated near the origin
//! 2. A 4×4 tiled rotation noise texture that randomizes the kernel orientation
//!    per-pixel, breaking banding artifacts while keeping sample count low
//! 3. Range-checked occlusion with smooth distance falloff
//! 4. A separable blur (horizontal then vertical) over the raw AO
//!
//! Emissive pixels (neon signage) never occlude themselves: the shader writes
//! 1.0 wherever the G-Buffer material flags carry `EMISSIVE`.

use glam::{Mat4, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

/// Upper bound of the sample kernel (size of the uniform array).
pub const MAX_KERNEL_SIZE: usize = 64;

const KERNEL_SEED: u64 = 42;
const NOISE_SEED: u64 = 12345;

// ============================================================================
// GPU Uniform Structs
// ============================================================================

/// Uniform block of the occlusion shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SsaoUniforms {
    pub samples: [[f32; 4]; MAX_KERNEL_SIZE],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inv_projection: [[f32; 4]; 4],
    /// AO target size / 4 (the noise texture tiles every 4 pixels)
    pub noise_scale: [f32; 2],
    pub radius: f32,
    pub bias: f32,
    pub intensity: f32,
    pub kernel_size: u32,
    pub _pad: [f32; 2],
}

/// Uniform block of one blur direction.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SsaoBlurUniforms {
    /// (1, 0) for the horizontal pass, (0, 1) for the vertical pass
    pub direction: [f32; 2],
    pub texel_size: [f32; 2],
}

// ============================================================================
// SsaoSettings
// ============================================================================

/// SSAO configuration.
///
/// # Usage
///
/// ```rust,ignore
/// let ssao = SsaoSettings {
///     radius: 0.75,
///     kernel_size: 32,
///     ..Default::default()
/// }
/// .sanitized();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsaoSettings {
    /// Whether SSAO is enabled.
    pub enabled: bool,
    /// Sampling radius in view-space units (meters).
    pub radius: f32,
    /// Number of hemisphere samples.
    pub kernel_size: u32,
    /// Render occlusion at `max(1, size / 2)`. Changing it recreates targets.
    pub half_resolution: bool,
    /// Depth bias against self-occlusion.
    pub bias: f32,
    /// Exponent applied to the final occlusion value.
    pub intensity: f32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 0.5,
            kernel_size: 16,
            half_resolution: true,
            bias: 0.025,
            intensity: 1.0,
        }
    }
}

impl SsaoSettings {
    /// Creates new SSAO settings with default values (enabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps radius to 0.05–4.0 and the kernel to 1–64 samples.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.radius = self.radius.clamp(0.05, 4.0);
        self.kernel_size = self.kernel_size.clamp(1, MAX_KERNEL_SIZE as u32);
        self.bias = self.bias.max(0.0);
        self.intensity = self.intensity.max(0.0);
        self
    }

    /// Size of the occlusion targets for a given surface size.
    #[must_use]
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        if self.half_resolution {
            ((width / 2).max(1), (height / 2).max(1))
        } else {
            (width, height)
        }
    }

    /// Builds the occlusion uniform block. `view` rotates the G-Buffer's
    /// world-space normals into view space.
    #[must_use]
    pub fn uniforms(&self, view: Mat4, projection: Mat4, target_size: (u32, u32)) -> SsaoUniforms {
        let mut samples = [[0.0; 4]; MAX_KERNEL_SIZE];
        for (slot, sample) in samples.iter_mut().zip(generate_ssao_kernel(self.kernel_size)) {
            *slot = sample.to_array();
        }

        SsaoUniforms {
            samples,
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            inv_projection: projection.inverse().to_cols_array_2d(),
            noise_scale: [target_size.0 as f32 / 4.0, target_size.1 as f32 / 4.0],
            radius: self.radius,
            bias: self.bias,
            intensity: self.intensity,
            kernel_size: self.kernel_size.min(MAX_KERNEL_SIZE as u32),
            _pad: [0.0; 2],
        }
    }
}

crate::define_settings_patch!(
    /// Partial SSAO settings.
    SsaoPatch for SsaoSettings {
        enabled: bool,
        radius: f32,
        kernel_size: u32,
        half_resolution: bool,
        bias: f32,
        intensity: f32,
    }
);

// ============================================================================
// Kernel & Noise Generation
// ============================================================================

/// Generates a hemisphere sample kernel with importance-weighted distribution.
///
/// Uses a fixed seed for deterministic results across frames and sessions.
/// Samples are concentrated near the origin via a quadratic fall-off curve.
#[must_use]
pub fn generate_ssao_kernel(samples: u32) -> Vec<Vec4> {
    let samples = samples.min(MAX_KERNEL_SIZE as u32);
    let mut rng = StdRng::seed_from_u64(KERNEL_SEED);
    let mut kernel = Vec::with_capacity(samples as usize);

    for i in 0..samples {
        // Upper hemisphere (Z > 0) in tangent space
        let mut sample = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(0.01..1.0),
        )
        .normalize();

        sample *= rng.random_range(0.0..1.0f32);

        let t = i as f32 / samples as f32;
        sample *= lerp(0.1, 1.0, t * t);

        kernel.push(sample.extend(0.0));
    }
    kernel
}

/// Generates a 4×4 rotation noise texture (16 RGBA8 pixels).
///
/// Each pixel encodes a random 2D rotation vector in XY (Z = 0).
/// The noise texture uses `Repeat` addressing and `Nearest` filtering.
#[must_use]
pub fn generate_ssao_noise() -> Vec<[u8; 4]> {
    let mut rng = StdRng::seed_from_u64(NOISE_SEED);
    (0..16)
        .map(|_| {
            let xy = Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                0.0,
            )
            .normalize_or(Vec3::X);

            [
                ((xy.x * 0.5 + 0.5) * 255.0) as u8,
                ((xy.y * 0.5 + 0.5) * 255.0) as u8,
                0,
                255,
            ]
        })
        .collect()
}

fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + f * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_deterministic_and_in_hemisphere() {
        let a = generate_ssao_kernel(16);
        let b = generate_ssao_kernel(16);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        for s in &a {
            assert!(s.z >= 0.0);
            assert!(s.truncate().length() <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn kernel_never_exceeds_capacity() {
        assert_eq!(generate_ssao_kernel(500).len(), MAX_KERNEL_SIZE);
    }

    #[test]
    fn noise_has_sixteen_texels() {
        assert_eq!(generate_ssao_noise().len(), 16);
    }

    #[test]
    fn sanitize_clamps_radius_and_kernel() {
        let s = SsaoSettings {
            radius: 100.0,
            kernel_size: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(s.radius, 4.0);
        assert_eq!(s.kernel_size, 1);
    }

    #[test]
    fn half_resolution_target_size() {
        let s = SsaoSettings::default();
        assert_eq!(s.target_size(800, 600), (400, 300));
        assert_eq!(s.target_size(1, 1), (1, 1));
        let full = SsaoSettings {
            half_resolution: false,
            ..s
        };
        assert_eq!(full.target_size(800, 600), (800, 600));
    }
}
