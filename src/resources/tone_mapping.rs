//! Tone Mapping Configuration
//!
//! This module defines tone mapping modes, grading settings and named looks as
//! pure data. These live in the resources layer so both the renderer and the
//! configuration code can use them without depending on each other.
//!
//! The shader applies the stages in a fixed order:
//!
//! 1. optional bloom composite (`bloom × intensity`), added to the HDR colour
//! 2. exposure
//! 3. colour grading (saturation, contrast, brightness, temperature) in linear space
//! 4. tone curve
//! 5. vignette
//! 6. gamma encode

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarqueeError;
use crate::resources::bloom::BloomPatch;
use crate::resources::config::RenderConfigPatch;

/// Tone curve selection.
///
/// The mode is a numeric selector in the uniform block; a single shader
/// handles all of them, so switching never recompiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneMappingMode {
    /// ACES fitted curve (Narkowicz approximation)
    #[default]
    Aces,
    /// Classic Reinhard operator, soft highlight rolloff
    Reinhard,
    /// Generic filmic curve (Hable / Uncharted 2)
    Filmic,
}

impl ToneMappingMode {
    /// Value written into the uniform block's `mode` field.
    #[must_use]
    pub const fn selector(self) -> u32 {
        match self {
            Self::Aces => 0,
            Self::Reinhard => 1,
            Self::Filmic => 2,
        }
    }

    /// Returns a human-readable name for the mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aces => "ACES",
            Self::Reinhard => "Reinhard",
            Self::Filmic => "Filmic",
        }
    }

    /// Returns all available tone mapping modes.
    #[must_use]
    pub const fn all() -> &'static [ToneMappingMode] {
        &[Self::Aces, Self::Reinhard, Self::Filmic]
    }
}

/// GPU uniform block for the tone mapping shader.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ToneMappingUniforms {
    pub exposure: f32,
    pub saturation: f32,
    pub contrast: f32,
    pub brightness: f32,

    pub temperature: f32,
    pub vignette_radius: f32,
    pub vignette_strength: f32,
    pub gamma: f32,

    pub mode: u32,
    pub bloom_intensity: f32,
    pub _pad: [f32; 2],
}

/// Tone mapping and colour grading configuration.
///
/// # Usage
///
/// ```rust,ignore
/// let mut settings = ToneMappingSettings::default();
/// settings.mode = ToneMappingMode::Filmic;
/// settings.exposure = 1.4;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneMappingSettings {
    /// Selected tone curve
    pub mode: ToneMappingMode,
    /// Linear exposure multiplier
    pub exposure: f32,
    /// 1.0 = unchanged, 0.0 = greyscale
    pub saturation: f32,
    /// 1.0 = unchanged; pivots around mid grey
    pub contrast: f32,
    /// Additive offset applied after contrast
    pub brightness: f32,
    /// Negative = cooler (blue), positive = warmer (orange)
    pub temperature: f32,
    /// Distance from the centre (in UV units) where darkening starts
    pub vignette_radius: f32,
    /// 0.0 disables the vignette
    pub vignette_strength: f32,
    /// Display gamma used for the final encode
    pub gamma: f32,
}

impl Default for ToneMappingSettings {
    fn default() -> Self {
        Self {
            mode: ToneMappingMode::default(),
            exposure: 1.0,
            saturation: 1.0,
            contrast: 1.0,
            brightness: 0.0,
            temperature: 0.0,
            vignette_radius: 0.75,
            vignette_strength: 0.35,
            gamma: 2.2,
        }
    }
}

impl ToneMappingSettings {
    /// Creates new tone mapping settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps values inside the ranges where the shader math stays finite.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.exposure = self.exposure.max(0.0);
        self.saturation = self.saturation.max(0.0);
        self.contrast = self.contrast.max(0.0);
        self.temperature = self.temperature.clamp(-1.0, 1.0);
        self.vignette_radius = self.vignette_radius.max(0.0);
        self.vignette_strength = self.vignette_strength.clamp(0.0, 1.0);
        self.gamma = self.gamma.max(0.1);
        self
    }

    /// Builds the uniform block. `bloom_intensity` comes from the bloom
    /// settings because the composite happens inside this pass.
    #[must_use]
    pub fn uniforms(&self, bloom_intensity: f32) -> ToneMappingUniforms {
        ToneMappingUniforms {
            exposure: self.exposure,
            saturation: self.saturation,
            contrast: self.contrast,
            brightness: self.brightness,
            temperature: self.temperature,
            vignette_radius: self.vignette_radius,
            vignette_strength: self.vignette_strength,
            gamma: self.gamma,
            mode: self.mode.selector(),
            bloom_intensity,
            _pad: [0.0; 2],
        }
    }
}

crate::define_settings_patch!(
    /// Partial tone mapping settings.
    ToneMappingPatch for ToneMappingSettings {
        mode: ToneMappingMode,
        exposure: f32,
        saturation: f32,
        contrast: f32,
        brightness: f32,
        temperature: f32,
        vignette_radius: f32,
        vignette_strength: f32,
        gamma: f32,
    }
);

impl From<ToneMappingSettings> for ToneMappingPatch {
    fn from(s: ToneMappingSettings) -> Self {
        Self {
            mode: Some(s.mode),
            exposure: Some(s.exposure),
            saturation: Some(s.saturation),
            contrast: Some(s.contrast),
            brightness: Some(s.brightness),
            temperature: Some(s.temperature),
            vignette_radius: Some(s.vignette_radius),
            vignette_strength: Some(s.vignette_strength),
            gamma: Some(s.gamma),
        }
    }
}

// ============================================================================
// Presets
// ============================================================================

/// Named looks for the aisle.
///
/// A preset is a complete bundle: every tone mapping field plus the bloom
/// look is overwritten, so applying the same preset twice leaves the
/// configuration bit-identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneMappingPreset {
    Cinematic,
    Retro,
    NeonNight,
    Vintage,
    Neutral,
}

impl ToneMappingPreset {
    /// Kebab-case name, identical to what [`FromStr`] accepts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cinematic => "cinematic",
            Self::Retro => "retro",
            Self::NeonNight => "neon-night",
            Self::Vintage => "vintage",
            Self::Neutral => "neutral",
        }
    }

    #[must_use]
    pub const fn all() -> &'static [ToneMappingPreset] {
        &[
            Self::Cinematic,
            Self::Retro,
            Self::NeonNight,
            Self::Vintage,
            Self::Neutral,
        ]
    }

    /// Full tone mapping settings of this look.
    #[must_use]
    pub fn tone_mapping(self) -> ToneMappingSettings {
        let base = ToneMappingSettings::default();
        match self {
            Self::Cinematic => ToneMappingSettings {
                mode: ToneMappingMode::Aces,
                exposure: 1.1,
                saturation: 0.95,
                contrast: 1.15,
                brightness: -0.02,
                temperature: 0.1,
                vignette_radius: 0.7,
                vignette_strength: 0.45,
                gamma: 2.2,
            },
            Self::Retro => ToneMappingSettings {
                mode: ToneMappingMode::Reinhard,
                exposure: 1.2,
                saturation: 1.25,
                contrast: 1.1,
                brightness: 0.02,
                temperature: 0.25,
                vignette_radius: 0.65,
                vignette_strength: 0.5,
                gamma: 2.2,
            },
            Self::NeonNight => ToneMappingSettings {
                mode: ToneMappingMode::Aces,
                exposure: 1.3,
                saturation: 1.4,
                contrast: 1.2,
                brightness: -0.04,
                temperature: -0.3,
                vignette_radius: 0.6,
                vignette_strength: 0.55,
                gamma: 2.2,
            },
            Self::Vintage => ToneMappingSettings {
                mode: ToneMappingMode::Filmic,
                exposure: 1.0,
                saturation: 0.7,
                contrast: 0.9,
                brightness: 0.04,
                temperature: 0.35,
                vignette_radius: 0.55,
                vignette_strength: 0.6,
                gamma: 2.2,
            },
            Self::Neutral => base,
        }
    }

    /// Bloom look that goes with this preset.
    #[must_use]
    pub fn bloom(self) -> BloomPatch {
        let (threshold, soft_knee, intensity) = match self {
            Self::Cinematic => (1.0, 0.5, 0.5),
            Self::Retro => (0.9, 0.6, 0.7),
            Self::NeonNight => (0.8, 0.7, 1.1),
            Self::Vintage => (1.1, 0.4, 0.35),
            Self::Neutral => (1.0, 0.5, 0.6),
        };
        BloomPatch {
            threshold: Some(threshold),
            soft_knee: Some(soft_knee),
            intensity: Some(intensity),
            ..Default::default()
        }
    }

    /// Configuration patch that applies the whole look at once.
    #[must_use]
    pub fn patch(self) -> RenderConfigPatch {
        RenderConfigPatch {
            tone_mapping: Some(self.tone_mapping().into()),
            bloom: Some(self.bloom()),
            ..Default::default()
        }
    }
}

impl fmt::Display for ToneMappingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToneMappingPreset {
    type Err = MarqueeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|preset| preset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarqueeError::UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selectors_are_distinct() {
        let selectors: Vec<u32> = ToneMappingMode::all().iter().map(|m| m.selector()).collect();
        assert_eq!(selectors, vec![0, 1, 2]);
    }

    #[test]
    fn preset_names_round_trip_through_from_str() {
        for preset in ToneMappingPreset::all() {
            let parsed: ToneMappingPreset = preset.name().parse().unwrap();
            assert_eq!(parsed, *preset);
        }
        assert!("sepia".parse::<ToneMappingPreset>().is_err());
    }

    #[test]
    fn neutral_preset_matches_defaults() {
        assert_eq!(
            ToneMappingPreset::Neutral.tone_mapping(),
            ToneMappingSettings::default()
        );
    }

    #[test]
    fn uniforms_carry_bloom_intensity() {
        let u = ToneMappingSettings::default().uniforms(0.6);
        assert_eq!(u.mode, 0);
        assert!((u.bloom_intensity - 0.6).abs() < 1e-6);
        assert_eq!(std::mem::size_of::<ToneMappingUniforms>(), 48);
    }
}
