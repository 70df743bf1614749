//! FXAA (Fast Approximate Anti-Aliasing) Configuration
//!
//! This module defines FXAA settings as a pure data structure, following the same
//! pattern as [`BloomSettings`](super::bloom::BloomSettings) and
//! [`ToneMappingSettings`](super::tone_mapping::ToneMappingSettings).
//!
//! FXAA identifies aliased edges via luma contrast detection and applies
//! sub-pixel smoothing. It operates on the LDR (post-tone-mapped) image and is
//! therefore the last pass before presentation.
//!
//! # Quality Presets
//!
//! | Preset   | Iterations | Best for              |
//! |----------|------------|----------------------|
//! | `Low`    | 4          | Mobile / low-end GPU |
//! | `Medium` | 8          | Default balance      |
//! | `High`   | 12         | Maximum quality      |

use serde::{Deserialize, Serialize};

/// FXAA quality preset.
///
/// Controls the number of edge exploration iterations in the FXAA shader.
/// The iteration count is a template constant, so switching presets
/// recompiles the shader once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FxaaQuality {
    /// 4 iterations, for mobile and low-end GPUs.
    Low,
    /// 8 iterations (default).
    #[default]
    Medium,
    /// 12 iterations.
    High,
}

impl FxaaQuality {
    /// Returns a human-readable name for the quality preset.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Number of edge-end search steps the shader performs per direction.
    #[must_use]
    pub const fn iterations(self) -> u32 {
        match self {
            Self::Low => 4,
            Self::Medium => 8,
            Self::High => 12,
        }
    }

    /// Returns all available quality presets.
    #[must_use]
    pub const fn all() -> &'static [FxaaQuality] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// GPU uniform block for the FXAA shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FxaaUniforms {
    pub edge_threshold: f32,
    pub edge_threshold_min: f32,
    pub subpixel: f32,
    pub _pad: f32,
}

/// FXAA post-processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxaaSettings {
    /// When `false` the pass still runs, using a passthrough pipeline.
    pub enabled: bool,
    /// Quality preset controlling edge exploration iterations.
    pub quality: FxaaQuality,
    /// Minimum local contrast (relative to max luma) that counts as an edge.
    pub edge_threshold: f32,
    /// Absolute contrast floor; protects near-black regions from noise.
    pub edge_threshold_min: f32,
    /// Sub-pixel aliasing removal amount (0 = off, 1 = soft).
    pub subpixel: f32,
}

impl Default for FxaaSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            quality: FxaaQuality::default(),
            edge_threshold: 0.166,
            edge_threshold_min: 0.0833,
            subpixel: 0.75,
        }
    }
}

impl FxaaSettings {
    /// Creates new FXAA settings with default values (enabled, medium quality).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamps the thresholds into the ranges the shader expects.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.edge_threshold = self.edge_threshold.clamp(0.063, 0.333);
        self.edge_threshold_min = self.edge_threshold_min.clamp(0.0, 0.1);
        self.subpixel = self.subpixel.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn uniforms(&self) -> FxaaUniforms {
        FxaaUniforms {
            edge_threshold: self.edge_threshold,
            edge_threshold_min: self.edge_threshold_min,
            subpixel: self.subpixel,
            _pad: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterations_grow_with_quality() {
        assert_eq!(FxaaQuality::Low.iterations(), 4);
        assert_eq!(FxaaQuality::Medium.iterations(), 8);
        assert_eq!(FxaaQuality::High.iterations(), 12);
    }

    #[test]
    fn sanitize_clamps_thresholds() {
        let s = FxaaSettings {
            edge_threshold: 2.0,
            edge_threshold_min: -1.0,
            subpixel: 3.0,
            ..Default::default()
        }
        .sanitized();
        assert!((s.edge_threshold - 0.333).abs() < 1e-6);
        assert_eq!(s.edge_threshold_min, 0.0);
        assert_eq!(s.subpixel, 1.0);
    }
}
