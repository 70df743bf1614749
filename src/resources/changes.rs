//! Configuration change classification.
//!
//! Most fields are plain uniforms and can be rewritten in place. A few force
//! GPU resources to be rebuilt: the shadow map size, the SSAO resolution,
//! the bloom level count and the FXAA iteration count (a template constant).

use bitflags::bitflags;

use crate::resources::config::RenderConfig;

bitflags! {
    /// What a configuration update requires from the renderer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ConfigChanges: u32 {
        /// Shadow texture and the lighting bind group must be recreated.
        const SHADOW_MAP         = 1 << 0;
        /// SSAO targets must be recreated at the new resolution.
        const SSAO_TARGETS       = 1 << 1;
        /// Bloom level textures must be recreated.
        const BLOOM_CHAIN        = 1 << 2;
        /// Bloom per-pass uniform buffers must be recreated.
        const BLOOM_UNIFORM_POOL = 1 << 3;
        /// FXAA pipeline must be recompiled.
        const FXAA_PIPELINE      = 1 << 4;
        /// An `enabled` toggle changed, so the frame plan differs.
        const FRAME_PLAN         = 1 << 5;
        /// Uniform values changed; no resource is recreated.
        const UNIFORMS           = 1 << 6;
    }
}

impl ConfigChanges {
    /// Changes that allocate or destroy GPU resources.
    pub const RECREATION: Self = Self::SHADOW_MAP
        .union(Self::SSAO_TARGETS)
        .union(Self::BLOOM_CHAIN)
        .union(Self::BLOOM_UNIFORM_POOL)
        .union(Self::FXAA_PIPELINE);

    /// Compares two sanitized configurations.
    #[must_use]
    pub fn between(old: &RenderConfig, new: &RenderConfig) -> Self {
        let mut changes = Self::empty();

        if old.shadow.map_size != new.shadow.map_size {
            changes |= Self::SHADOW_MAP;
        }
        if old.ssao.half_resolution != new.ssao.half_resolution {
            changes |= Self::SSAO_TARGETS;
        }
        if old.bloom.levels != new.bloom.levels {
            changes |= Self::BLOOM_CHAIN | Self::BLOOM_UNIFORM_POOL;
        }
        if old.fxaa.quality != new.fxaa.quality {
            changes |= Self::FXAA_PIPELINE;
        }
        if old.shadow.enabled != new.shadow.enabled
            || old.ssao.enabled != new.ssao.enabled
            || old.bloom.enabled != new.bloom.enabled
            || old.fxaa.enabled != new.fxaa.enabled
        {
            changes |= Self::FRAME_PLAN;
        }
        if old != new {
            changes |= Self::UNIFORMS;
        }

        changes
    }

    /// Returns `true` when any GPU resource must be rebuilt.
    #[inline]
    #[must_use]
    pub fn requires_recreation(self) -> bool {
        self.intersects(Self::RECREATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_configs_produce_no_changes() {
        let c = RenderConfig::default();
        assert!(ConfigChanges::between(&c, &c).is_empty());
    }

    #[test]
    fn bloom_intensity_is_uniform_only() {
        let old = RenderConfig::default();
        let mut new = old.clone();
        new.bloom.intensity = 2.0;
        new.bloom.threshold = 0.5;
        let changes = ConfigChanges::between(&old, &new);
        assert_eq!(changes, ConfigChanges::UNIFORMS);
        assert!(!changes.requires_recreation());
    }

    #[test]
    fn bloom_levels_rebuild_chain_and_pool() {
        let old = RenderConfig::default();
        let mut new = old.clone();
        new.bloom.levels = 3;
        let changes = ConfigChanges::between(&old, &new);
        assert!(changes.contains(ConfigChanges::BLOOM_CHAIN | ConfigChanges::BLOOM_UNIFORM_POOL));
        assert!(!changes.contains(ConfigChanges::SHADOW_MAP));
    }
}
