//! Frame Stage Definitions
//!
//! [`FrameStage`] fixes the order of the passes inside one frame;
//! [`FramePlan`] is the enabled subset for a given configuration. Every
//! frame is encoded by walking the plan front to back into a single
//! command encoder.
//!
//! # Stage Overview
//!
//! | Stage | Reads | Writes |
//! |-------|-------|--------|
//! | `Shadow` | object geometry | shadow map |
//! | `GBuffer` | object geometry, materials | albedo / normal / material / emissive / depth |
//! | `Ssao` | G-Buffer normal + depth | AO (blurred) |
//! | `Lighting` | G-Buffer, AO, shadow map, lights | HDR colour |
//! | `Bloom` | HDR colour | bloom level 0 |
//! | `ToneMapping` | HDR colour, bloom | LDR intermediate |
//! | `AntiAlias` | LDR intermediate | presentation target |

use smallvec::SmallVec;

use crate::resources::config::RenderConfig;

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
#[repr(u8)]
pub enum FrameStage {
    Shadow = 0,
    GBuffer = 1,
    Ssao = 2,
    Lighting = 3,
    Bloom = 4,
    ToneMapping = 5,
    /// Always present: FXAA or its passthrough variant.
    AntiAlias = 6,
}

impl FrameStage {
    pub const ALL: [FrameStage; 7] = [
        Self::Shadow,
        Self::GBuffer,
        Self::Ssao,
        Self::Lighting,
        Self::Bloom,
        Self::ToneMapping,
        Self::AntiAlias,
    ];

    /// Returns the numeric index of the stage (used for sorting).
    #[inline]
    #[must_use]
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// Stage name (for debugging and GPU labels).
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Shadow => "Shadow",
            Self::GBuffer => "GBuffer",
            Self::Ssao => "SSAO",
            Self::Lighting => "Lighting",
            Self::Bloom => "Bloom",
            Self::ToneMapping => "ToneMapping",
            Self::AntiAlias => "AntiAlias",
        }
    }
}

/// Ordered list of the stages a frame runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    stages: SmallVec<[FrameStage; 7]>,
}

impl FramePlan {
    /// Derives the plan from the configuration toggles.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        let stages = FrameStage::ALL
            .into_iter()
            .filter(|stage| match stage {
                FrameStage::Shadow => config.shadow.enabled,
                FrameStage::Ssao => config.ssao.enabled,
                FrameStage::Bloom => config.bloom.enabled,
                FrameStage::GBuffer
                | FrameStage::Lighting
                | FrameStage::ToneMapping
                | FrameStage::AntiAlias => true,
            })
            .collect();
        Self { stages }
    }

    #[inline]
    #[must_use]
    pub fn stages(&self) -> &[FrameStage] {
        &self.stages
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, stage: FrameStage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn iter(&self) -> impl Iterator<Item = FrameStage> + '_ {
        self.stages.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_ordering() {
        assert!(FrameStage::Shadow < FrameStage::GBuffer);
        assert!(FrameStage::GBuffer < FrameStage::Ssao);
        assert!(FrameStage::Ssao < FrameStage::Lighting);
        assert!(FrameStage::Lighting < FrameStage::Bloom);
        assert!(FrameStage::Bloom < FrameStage::ToneMapping);
        assert!(FrameStage::ToneMapping < FrameStage::AntiAlias);
    }

    #[test]
    fn default_config_runs_every_stage_in_order() {
        let plan = FramePlan::from_config(&RenderConfig::default());
        assert_eq!(plan.stages(), &FrameStage::ALL);
        assert!(plan.stages().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn disabling_effects_removes_their_stage_only() {
        let mut config = RenderConfig::default();
        config.shadow.enabled = false;
        config.ssao.enabled = false;
        config.bloom.enabled = false;
        config.fxaa.enabled = false;
        let plan = FramePlan::from_config(&config);
        assert_eq!(
            plan.stages(),
            &[
                FrameStage::GBuffer,
                FrameStage::Lighting,
                FrameStage::ToneMapping,
                FrameStage::AntiAlias,
            ]
        );
    }
}
