//! Bloom Post-Processing Configuration
//!
//! This module defines bloom settings as pure data structures, following the same
//! pattern as [`ToneMappingSettings`](super::tone_mapping::ToneMappingSettings).
//!
//! The bloom implementation is based on the physically-based bloom technique from
//! *Call of Duty: Advanced Warfare*: a soft-knee threshold writes level 0 at half
//! resolution, a 13-tap filter walks down the chain and a 3×3 tent filter walks
//! back up, blending additively into each finer level. Level 0 is the result.
//!
//! [`BloomChainLayout`] is the pure description of that chain (level sizes and
//! pass order). The render pass builds its textures and uniform buffers from it,
//! which keeps the sizing rules testable without a GPU.
//!
//! # Reference
//!
//! - [Physically Based Bloom (LearnOpenGL)](https://learnopengl.com/Guest-Articles/2022/Phys.-Based-Bloom)
//! - *Next Generation Post Processing in Call of Duty: Advanced Warfare* (SIGGRAPH 2014)

use serde::{Deserialize, Serialize};

// ============================================================================
// GPU Uniform Struct
// ============================================================================

/// Per-pass uniform block shared by the threshold, downsample and upsample
/// shaders. Every pass instance owns one buffer holding this struct.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BloomUniforms {
    /// 1 / source texture size
    pub source_texel_size: [f32; 2],
    pub threshold: f32,
    pub soft_knee: f32,
    pub filter_radius: f32,
    pub _pad: [f32; 3],
}

// ============================================================================
// BloomSettings
// ============================================================================

/// Bloom post-processing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    /// Whether bloom is enabled.
    pub enabled: bool,
    /// Luminance where bloom starts.
    pub threshold: f32,
    /// Width of the soft transition below the threshold (relative to it).
    pub soft_knee: f32,
    /// Bloom contribution added before the tone curve.
    pub intensity: f32,
    /// Number of chain levels. Changing it recreates textures and uniforms.
    ///
    /// Default: `5`
    pub levels: u32,
    /// Tent filter radius in texels of the source level.
    pub filter_radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.0,
            soft_knee: 0.5,
            intensity: 0.6,
            levels: 5,
            filter_radius: 1.0,
        }
    }
}

impl BloomSettings {
    pub const MIN_LEVELS: u32 = 1;
    pub const MAX_LEVELS: u32 = 8;

    /// Creates new bloom settings with default values (enabled, 5 levels).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.levels = self.levels.clamp(Self::MIN_LEVELS, Self::MAX_LEVELS);
        self.threshold = self.threshold.max(0.0);
        self.soft_knee = self.soft_knee.clamp(0.0, 1.0);
        self.intensity = self.intensity.max(0.0);
        self.filter_radius = self.filter_radius.max(0.0);
        self
    }

    /// Uniform block for one pass reading from a source of `source_size`.
    #[must_use]
    pub fn uniforms(&self, source_size: (u32, u32)) -> BloomUniforms {
        BloomUniforms {
            source_texel_size: [
                1.0 / source_size.0.max(1) as f32,
                1.0 / source_size.1.max(1) as f32,
            ],
            threshold: self.threshold,
            soft_knee: self.soft_knee,
            filter_radius: self.filter_radius,
            _pad: [0.0; 3],
        }
    }
}

crate::define_settings_patch!(
    /// Partial bloom settings.
    BloomPatch for BloomSettings {
        enabled: bool,
        threshold: f32,
        soft_knee: f32,
        intensity: f32,
        levels: u32,
        filter_radius: f32,
    }
);

// ============================================================================
// Chain layout
// ============================================================================

/// One pass of the bloom chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloomStep {
    /// HDR scene → level 0 with the soft-knee threshold applied.
    Threshold,
    /// Level `src` → level `dst` (`dst = src + 1`), 13-tap filter.
    Downsample { src: usize, dst: usize },
    /// Level `src` → level `dst` (`dst = src - 1`), tent filter, additive.
    Upsample { src: usize, dst: usize },
}

/// Sizes and pass order of the bloom chain for one surface size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomChainLayout {
    levels: Vec<(u32, u32)>,
    steps: Vec<BloomStep>,
}

impl BloomChainLayout {
    /// Builds the layout for `levels` levels (clamped to the valid range).
    #[must_use]
    pub fn new(surface_width: u32, surface_height: u32, levels: u32) -> Self {
        let count = levels.clamp(BloomSettings::MIN_LEVELS, BloomSettings::MAX_LEVELS) as usize;

        let levels: Vec<(u32, u32)> = (0..count)
            .map(|i| Self::level_size(surface_width, surface_height, i as u32))
            .collect();

        let mut steps = Vec::with_capacity(2 * count - 1);
        steps.push(BloomStep::Threshold);
        for dst in 1..count {
            steps.push(BloomStep::Downsample { src: dst - 1, dst });
        }
        for src in (1..count).rev() {
            steps.push(BloomStep::Upsample { src, dst: src - 1 });
        }

        Self { levels, steps }
    }

    /// Size of level `i`: `max(1, floor(dim / 2^(i+1)))` per axis.
    #[inline]
    #[must_use]
    pub fn level_size(surface_width: u32, surface_height: u32, level: u32) -> (u32, u32) {
        let shift = (level + 1).min(31);
        ((surface_width >> shift).max(1), (surface_height >> shift).max(1))
    }

    #[inline]
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    #[must_use]
    pub fn levels(&self) -> &[(u32, u32)] {
        &self.levels
    }

    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[BloomStep] {
        &self.steps
    }

    /// One uniform buffer per pass instance: `2N - 1`.
    #[inline]
    #[must_use]
    pub fn uniform_buffer_count(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_sizes_halve_from_half_resolution() {
        let layout = BloomChainLayout::new(800, 600, 5);
        assert_eq!(
            layout.levels(),
            &[(400, 300), (200, 150), (100, 75), (50, 37), (25, 18)]
        );
    }

    #[test]
    fn steps_walk_down_then_up() {
        let layout = BloomChainLayout::new(64, 64, 3);
        assert_eq!(
            layout.steps(),
            &[
                BloomStep::Threshold,
                BloomStep::Downsample { src: 0, dst: 1 },
                BloomStep::Downsample { src: 1, dst: 2 },
                BloomStep::Upsample { src: 2, dst: 1 },
                BloomStep::Upsample { src: 1, dst: 0 },
            ]
        );
        assert_eq!(layout.uniform_buffer_count(), 5);
    }

    #[test]
    fn tiny_surfaces_never_reach_zero() {
        let layout = BloomChainLayout::new(3, 1, 8);
        assert!(layout.levels().iter().all(|&(w, h)| w >= 1 && h >= 1));
    }

    #[test]
    fn single_level_chain_is_threshold_only() {
        let layout = BloomChainLayout::new(1920, 1080, 1);
        assert_eq!(layout.steps(), &[BloomStep::Threshold]);
        assert_eq!(layout.uniform_buffer_count(), 1);
    }
}
