//! Render Configuration
//!
//! [`RenderConfig`] is the complete set of toggles and tunables of the
//! pipeline. [`RenderConfigPatch`] mirrors it with every leaf optional and is
//! what callers hand to the renderer (constructor and `update_config`).
//!
//! # JSON
//!
//! ```rust,ignore
//! let patch = RenderConfigPatch::from_json_str(r#"{
//!     "bloom": { "levels": 6, "intensity": 0.8 },
//!     "fxaa": { "quality": "high" }
//! }"#)?;
//! let config = RenderConfig::default().apply(&patch);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::resources::bloom::{BloomPatch, BloomSettings};
use crate::resources::changes::ConfigChanges;
use crate::resources::fxaa::{FxaaQuality, FxaaSettings};
use crate::resources::shadow::{ShadowPatch, ShadowSettings};
use crate::resources::ssao::{SsaoPatch, SsaoSettings};
use crate::resources::tone_mapping::{ToneMappingPatch, ToneMappingSettings};

/// Background colour of the aisle (deep purple night).
pub const DEFAULT_CLEAR_COLOR: [f32; 4] = [0.02, 0.015, 0.035, 1.0];

/// Full render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub shadow: ShadowSettings,
    pub ssao: SsaoSettings,
    pub bloom: BloomSettings,
    pub tone_mapping: ToneMappingSettings,
    pub fxaa: FxaaSettings,
    /// Linear colour written where no geometry was rasterised.
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadow: ShadowSettings::default(),
            ssao: SsaoSettings::default(),
            bloom: BloomSettings::default(),
            tone_mapping: ToneMappingSettings::default(),
            fxaa: FxaaSettings::default(),
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }
}

impl RenderConfig {
    /// Parses a full configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Clamps every group into its valid range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            shadow: self.shadow.sanitized(),
            ssao: self.ssao.sanitized(),
            bloom: self.bloom.sanitized(),
            tone_mapping: self.tone_mapping.sanitized(),
            fxaa: self.fxaa.sanitized(),
            clear_color: self.clear_color,
        }
    }

    /// Returns a new, sanitized configuration with `patch` applied.
    #[must_use]
    pub fn apply(&self, patch: &RenderConfigPatch) -> Self {
        let mut next = self.clone();
        if let Some(p) = &patch.shadow {
            p.apply_to(&mut next.shadow);
        }
        if let Some(p) = &patch.ssao {
            p.apply_to(&mut next.ssao);
        }
        if let Some(p) = &patch.bloom {
            p.apply_to(&mut next.bloom);
        }
        if let Some(p) = &patch.tone_mapping {
            p.apply_to(&mut next.tone_mapping);
        }
        if let Some(p) = &patch.fxaa {
            p.apply_to(&mut next.fxaa);
        }
        if let Some(color) = patch.clear_color {
            next.clear_color = color;
        }
        next.sanitized()
    }

    /// Classifies what moving from `self` to `next` requires from the GPU side.
    #[must_use]
    pub fn diff(&self, next: &Self) -> ConfigChanges {
        ConfigChanges::between(self, next)
    }
}

crate::define_settings_patch!(
    /// Partial FXAA settings.
    FxaaPatch for FxaaSettings {
        enabled: bool,
        quality: FxaaQuality,
        edge_threshold: f32,
        edge_threshold_min: f32,
        subpixel: f32,
    }
);

/// Partial configuration. Absent groups and fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssao: Option<SsaoPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom: Option<BloomPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone_mapping: Option<ToneMappingPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fxaa: Option<FxaaPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_color: Option<[f32; 4]>,
}

impl RenderConfigPatch {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shadow.is_none_or(|p| p.is_empty())
            && self.ssao.is_none_or(|p| p.is_empty())
            && self.bloom.is_none_or(|p| p.is_empty())
            && self.tone_mapping.is_none_or(|p| p.is_empty())
            && self.fxaa.is_none_or(|p| p.is_empty())
            && self.clear_color.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = RenderConfig::default();
        assert_eq!(c.shadow.map_size, 2048);
        assert_eq!(c.ssao.kernel_size, 16);
        assert!(c.ssao.half_resolution);
        assert_eq!(c.bloom.levels, 5);
        assert_eq!(c.fxaa.quality, FxaaQuality::Medium);
        assert!((c.tone_mapping.gamma - 2.2).abs() < 1e-6);
    }

    #[test]
    fn empty_patch_is_identity() {
        let c = RenderConfig::default();
        let patch = RenderConfigPatch::default();
        assert!(patch.is_empty());
        assert_eq!(c.apply(&patch), c);
    }

    #[test]
    fn patch_values_are_sanitized() {
        let patch = RenderConfigPatch {
            bloom: Some(BloomPatch {
                levels: Some(40),
                ..Default::default()
            }),
            ssao: Some(SsaoPatch {
                kernel_size: Some(1000),
                radius: Some(0.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let c = RenderConfig::default().apply(&patch);
        assert_eq!(c.bloom.levels, 8);
        assert_eq!(c.ssao.kernel_size, 64);
        assert!((c.ssao.radius - 0.05).abs() < 1e-6);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(RenderConfigPatch::from_json_str(r#"{"bloom": {"levles": 3}}"#).is_err());
    }
}
