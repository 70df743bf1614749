//! Configuration Tests
//!
//! Tests for:
//! - JSON parsing of full configs and partial patches
//! - Change classification (recreation vs. uniform-only)
//! - Frame plan derivation from the toggles
//! - Tone mapping presets (idempotence, parsing)

use marquee::resources::{BloomPatch, FxaaPatch, ShadowPatch, SsaoPatch};
use marquee::{
    ConfigChanges, FramePlan, FrameStage, FxaaQuality, RenderConfig, RenderConfigPatch,
    ToneMappingMode, ToneMappingPreset,
};

const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn full_config_from_partial_json_keeps_defaults() {
    let config = RenderConfig::from_json_str(r#"{ "bloom": { "levels": 3 } }"#).unwrap();
    assert_eq!(config.bloom.levels, 3);
    assert_eq!(config.shadow.map_size, 2048);
    assert!(config.ssao.enabled);
    assert_eq!(config.fxaa.quality, FxaaQuality::Medium);
}

#[test]
fn patch_from_json_applies_only_present_fields() {
    let patch = RenderConfigPatch::from_json_str(
        r#"{ "tone_mapping": { "exposure": 1.5 }, "fxaa": { "quality": "high" } }"#,
    )
    .unwrap();

    let base = RenderConfig::default();
    let next = base.apply(&patch);

    assert!(approx(next.tone_mapping.exposure, 1.5));
    assert!(approx(next.tone_mapping.gamma, base.tone_mapping.gamma));
    assert_eq!(next.fxaa.quality, FxaaQuality::High);
    assert_eq!(next.bloom, base.bloom);
}

#[test]
fn malformed_json_is_an_error() {
    assert!(RenderConfigPatch::from_json_str("{ bloom: ").is_err());
}

#[test]
fn out_of_range_values_are_clamped_on_apply() {
    let patch = RenderConfigPatch {
        ssao: Some(SsaoPatch {
            kernel_size: Some(500),
            radius: Some(0.0),
            ..Default::default()
        }),
        bloom: Some(BloomPatch {
            levels: Some(40),
            ..Default::default()
        }),
        ..Default::default()
    };
    let next = RenderConfig::default().apply(&patch);
    assert_eq!(next.ssao.kernel_size, 64);
    assert!(approx(next.ssao.radius, 0.05));
    assert_eq!(next.bloom.levels, 8);
}

// ============================================================================
// Change classification
// ============================================================================

#[test]
fn resolution_fields_require_recreation() {
    let base = RenderConfig::default();

    let shadow = base.apply(&RenderConfigPatch {
        shadow: Some(ShadowPatch {
            map_size: Some(1024),
            ..Default::default()
        }),
        ..Default::default()
    });
    let changes = base.diff(&shadow);
    assert!(changes.contains(ConfigChanges::SHADOW_MAP));
    assert!(changes.requires_recreation());

    let ssao = base.apply(&RenderConfigPatch {
        ssao: Some(SsaoPatch {
            half_resolution: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    });
    assert!(base.diff(&ssao).contains(ConfigChanges::SSAO_TARGETS));

    let fxaa = base.apply(&RenderConfigPatch {
        fxaa: Some(FxaaPatch {
            quality: Some(FxaaQuality::Low),
            ..Default::default()
        }),
        ..Default::default()
    });
    assert!(base.diff(&fxaa).contains(ConfigChanges::FXAA_PIPELINE));
}

#[test]
fn tunables_are_uniform_only() {
    let base = RenderConfig::default();
    let next = base.apply(&RenderConfigPatch {
        bloom: Some(BloomPatch {
            threshold: Some(0.7),
            intensity: Some(1.2),
            ..Default::default()
        }),
        ..Default::default()
    });
    let changes = base.diff(&next);
    assert_eq!(changes, ConfigChanges::UNIFORMS);
    assert!(!changes.requires_recreation());
}

#[test]
fn toggles_change_the_frame_plan() {
    let base = RenderConfig::default();
    let next = base.apply(&RenderConfigPatch {
        ssao: Some(SsaoPatch {
            enabled: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    });
    let changes = base.diff(&next);
    assert!(changes.contains(ConfigChanges::FRAME_PLAN));
    assert!(!changes.requires_recreation());
}

// ============================================================================
// Frame plan
// ============================================================================

#[test]
fn default_plan_runs_every_stage_in_order() {
    let plan = FramePlan::from_config(&RenderConfig::default());
    assert_eq!(plan.stages(), &FrameStage::ALL);
}

#[test]
fn disabled_effects_leave_the_plan_but_aa_stays() {
    let config = RenderConfig::default().apply(&RenderConfigPatch {
        shadow: Some(ShadowPatch {
            enabled: Some(false),
            ..Default::default()
        }),
        bloom: Some(BloomPatch {
            enabled: Some(false),
            ..Default::default()
        }),
        fxaa: Some(FxaaPatch {
            enabled: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    });
    let plan = FramePlan::from_config(&config);
    assert_eq!(
        plan.stages(),
        &[
            FrameStage::GBuffer,
            FrameStage::Ssao,
            FrameStage::Lighting,
            FrameStage::ToneMapping,
            FrameStage::AntiAlias,
        ]
    );
}

// ============================================================================
// Presets
// ============================================================================

#[test]
fn presets_are_idempotent() {
    for &preset in ToneMappingPreset::all() {
        let once = RenderConfig::default().apply(&preset.patch());
        let twice = once.apply(&preset.patch());
        assert_eq!(once, twice, "preset {preset} is not idempotent");
        assert!(once.diff(&twice).is_empty());
    }
}

#[test]
fn presets_overwrite_previous_look_completely() {
    let vintage_then_cinematic = RenderConfig::default()
        .apply(&ToneMappingPreset::Vintage.patch())
        .apply(&ToneMappingPreset::Cinematic.patch());
    let cinematic = RenderConfig::default().apply(&ToneMappingPreset::Cinematic.patch());
    assert_eq!(vintage_then_cinematic, cinematic);
}

#[test]
fn presets_parse_from_kebab_case() {
    let preset: ToneMappingPreset = "neon-night".parse().unwrap();
    assert_eq!(preset, ToneMappingPreset::NeonNight);
    assert_eq!(preset.tone_mapping().mode, ToneMappingMode::Aces);
    assert!("disco".parse::<ToneMappingPreset>().is_err());
}
