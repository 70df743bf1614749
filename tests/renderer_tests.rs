//! SceneRenderer Integration Tests
//!
//! Require a GPU adapter; each test returns early (with a log line) when
//! none is available.
//!
//! Tests for:
//! - End-to-end frame of a lit cube
//! - G-Buffer clear values and resize
//! - Resize consistency across every pass
//! - Bloom chain recreation counts
//! - Config updates, presets and the frame plan
//! - Scene edits
//! - Shader, construction and config-update failures
//! - Teardown and error states

mod common;

use glam::{Mat4, Vec3};

use marquee::renderer::passes::GeometryBuffer;
use marquee::renderer::shader_manager::ShaderManager;
use marquee::resources::{BloomPatch, ShadowPatch, SsaoPatch};
use marquee::{
    ConfigChanges, FrameStage, Material, MarqueeError, Mesh, RenderConfigPatch, RendererState,
    RendererStatus, SceneRenderer, ToneMappingPreset,
};

use common::{Offscreen, brightness, pixel};

fn cube_scene(ctx: &marquee::GpuContext, width: u32, height: u32) -> SceneRenderer {
    let mut renderer = SceneRenderer::new(ctx.clone(), width, height, None).unwrap();
    renderer
        .add_object(
            &Mesh::cube(),
            Mat4::IDENTITY,
            Material::new(Vec3::new(0.8, 0.75, 0.7), 0.0, 0.5),
        )
        .unwrap();
    renderer.add_point_light(Vec3::new(0.0, 3.0, 0.0), Vec3::ONE, 2.0, 10.0);

    let camera = renderer.camera_mut();
    camera.position = Vec3::new(0.0, 1.5, 3.0);
    camera.look_at(Vec3::ZERO);
    renderer
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn lit_cube_renders_non_black_centre() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 800, 600);
    let output = Offscreen::new(&ctx.device, 800, 600);

    renderer.render(&output.view).unwrap();
    let pixels = output.read_pixels(&ctx);

    let centre = pixel(&pixels, 800, 400, 300);
    let corner = pixel(&pixels, 800, 2, 2);
    assert!(brightness(centre) > 30, "centre too dark: {centre:?}");
    assert!(
        brightness(centre) > brightness(corner),
        "centre {centre:?} should be brighter than background {corner:?}"
    );
    assert_eq!(renderer.packed_point_light_count(), 1);
    assert_eq!(renderer.state(), RendererState::Ready);
}

#[test]
fn every_effect_disabled_still_produces_an_image() {
    let Some(ctx) = common::gpu() else { return };
    let patch = RenderConfigPatch::from_json_str(
        r#"{
            "shadow": { "enabled": false },
            "ssao": { "enabled": false },
            "bloom": { "enabled": false },
            "fxaa": { "enabled": false }
        }"#,
    )
    .unwrap();
    let mut renderer = SceneRenderer::new(ctx.clone(), 320, 240, Some(patch)).unwrap();
    renderer
        .add_object(&Mesh::cube(), Mat4::IDENTITY, Material::default())
        .unwrap();
    renderer.camera_mut().position = Vec3::new(0.0, 1.0, 3.0);
    renderer.camera_mut().look_at(Vec3::ZERO);

    assert_eq!(
        renderer.frame_plan().stages(),
        &[
            FrameStage::GBuffer,
            FrameStage::Lighting,
            FrameStage::ToneMapping,
            FrameStage::AntiAlias
        ]
    );

    let output = Offscreen::new(&ctx.device, 320, 240);
    renderer.render(&output.view).unwrap();
    let pixels = output.read_pixels(&ctx);
    assert!(brightness(pixel(&pixels, 320, 160, 120)) > 0);
}

#[test]
fn emissive_and_instanced_objects_render() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 256, 256);

    let shelf: Vec<Mat4> = (0..12)
        .map(|i| Mat4::from_translation(Vec3::new(i as f32 * 0.3 - 1.8, 0.0, -2.0)))
        .collect();
    renderer
        .add_instanced_object(
            &Mesh::cuboid(Vec3::new(0.2, 0.3, 0.05)),
            Mat4::IDENTITY,
            &shelf,
            Material::neon(Vec3::new(1.0, 0.2, 0.8), 4.0),
        )
        .unwrap();

    let output = Offscreen::new(&ctx.device, 256, 256);
    for _ in 0..2 {
        renderer.render(&output.view).unwrap();
    }
    assert_eq!(renderer.object_count(), 2);
    assert_eq!(renderer.shadow_arena_capacity(), 2);
}

#[test]
fn empty_instance_list_is_rejected() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = SceneRenderer::new(ctx.clone(), 64, 64, None).unwrap();
    let err = renderer
        .add_instanced_object(&Mesh::cube(), Mat4::IDENTITY, &[], Material::default())
        .unwrap_err();
    assert!(matches!(err, MarqueeError::InvalidScene(_)));
    assert_eq!(renderer.object_count(), 0);
}

#[test]
fn point_lights_beyond_capacity_are_truncated() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 64, 64);
    for i in 0..40 {
        renderer.add_point_light(Vec3::new(i as f32, 2.0, 0.0), Vec3::ONE, 1.0, 4.0);
    }
    let output = Offscreen::new(&ctx.device, 64, 64);
    renderer.render(&output.view).unwrap();
    assert_eq!(renderer.point_light_count(), 41);
    assert_eq!(renderer.packed_point_light_count(), 32);
}

// ============================================================================
// G-Buffer
// ============================================================================

#[test]
fn gbuffer_clears_decode_to_neutral_material() {
    let Some(ctx) = common::gpu() else { return };
    let mut shaders = ShaderManager::new();
    let mut gbuffer = GeometryBuffer::new(&ctx.device, &mut shaders, 96, 64).unwrap();

    let clears = gbuffer.render_pass_attachments().clear_colors();
    assert_eq!(clears[2], Some(GeometryBuffer::MATERIAL_CLEAR));
    assert!(clears.iter().all(Option::is_some));

    assert!(!gbuffer.resize(&ctx.device, 96, 64).unwrap());
    assert!(gbuffer.resize(&ctx.device, 48, 40).unwrap());
    assert!(gbuffer.target_sizes().iter().all(|&s| s == (48, 40)));

    assert!(matches!(
        GeometryBuffer::new(&ctx.device, &mut shaders, 0, 64),
        Err(MarqueeError::InvalidDimensions { .. })
    ));
    gbuffer.destroy();
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn resize_keeps_every_target_consistent() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 800, 600);

    for &(w, h) in &[(1024, 768), (333, 217), (800, 600)] {
        renderer.resize(w, h).unwrap();
        let output = Offscreen::new(&ctx.device, w, h);
        renderer.render(&output.view).unwrap();

        assert_eq!(renderer.size(), (w, h));
        assert!(renderer.gbuffer_target_sizes().iter().all(|&s| s == (w, h)));
        assert_eq!(renderer.hdr_size(), (w, h));
        assert_eq!(renderer.ssao_size(), ((w / 2).max(1), (h / 2).max(1)));
        assert_eq!(renderer.bloom_level_sizes()[0], (w / 2, h / 2));
        assert!((renderer.camera().aspect() - w as f32 / h as f32).abs() < 1e-5);
    }
}

#[test]
fn full_resolution_ssao_follows_surface() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 640, 480);
    let changes = renderer
        .update_config(RenderConfigPatch {
            ssao: Some(SsaoPatch {
                half_resolution: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    assert!(changes.contains(ConfigChanges::SSAO_TARGETS));
    assert_eq!(renderer.ssao_size(), (640, 480));

    renderer.resize(300, 200).unwrap();
    assert_eq!(renderer.ssao_size(), (300, 200));
}

#[test]
fn zero_size_is_rejected_and_renderer_survives() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 200, 100);

    let err = renderer.resize(0, 100).unwrap_err();
    assert!(matches!(err, MarqueeError::InvalidDimensions { .. }));
    assert_eq!(renderer.size(), (200, 100));

    let output = Offscreen::new(&ctx.device, 200, 100);
    renderer.render(&output.view).unwrap();
}

#[test]
fn zero_size_construction_fails() {
    let Some(ctx) = common::gpu() else { return };
    let err = SceneRenderer::new(ctx, 0, 0, None).unwrap_err();
    assert!(matches!(err, MarqueeError::InvalidDimensions { .. }));
    assert!(matches!(RendererStatus::from(&err), RendererStatus::InitFailed(_)));
}

// ============================================================================
// Config updates
// ============================================================================

#[test]
fn bloom_levels_recreate_chain_and_pool() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 800, 600);
    let (textures_before, buffers_before) = renderer.bloom_allocations();
    assert_eq!((textures_before, buffers_before), (5, 9));

    let changes = renderer
        .update_config(RenderConfigPatch {
            bloom: Some(BloomPatch {
                levels: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    assert!(changes.contains(ConfigChanges::BLOOM_CHAIN | ConfigChanges::BLOOM_UNIFORM_POOL));

    let (textures, buffers) = renderer.bloom_allocations();
    assert_eq!(textures - textures_before, 3);
    assert_eq!(buffers - buffers_before, 2 * 3 - 1);
    assert_eq!(renderer.bloom_uniform_buffer_count(), 5);
    assert_eq!(renderer.bloom_level_sizes(), vec![(400, 300), (200, 150), (100, 75)]);

    let output = Offscreen::new(&ctx.device, 800, 600);
    renderer.render(&output.view).unwrap();
}

#[test]
fn bloom_tunables_allocate_nothing() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 800, 600);
    let before = renderer.bloom_allocations();

    let changes = renderer
        .update_config(RenderConfigPatch {
            bloom: Some(BloomPatch {
                intensity: Some(1.4),
                threshold: Some(0.6),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(changes, ConfigChanges::UNIFORMS);
    assert_eq!(renderer.bloom_allocations(), before);
}

#[test]
fn shadow_map_size_change_rebinds_lighting() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 128, 128);
    renderer
        .update_config(RenderConfigPatch {
            shadow: Some(ShadowPatch {
                map_size: Some(512),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(renderer.shadow_map_size(), 512);

    let output = Offscreen::new(&ctx.device, 128, 128);
    renderer.render(&output.view).unwrap();
}

#[test]
fn toggling_effects_updates_the_plan() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 128, 128);
    let output = Offscreen::new(&ctx.device, 128, 128);

    let changes = renderer
        .update_config(RenderConfigPatch {
            ssao: Some(SsaoPatch {
                enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    assert!(changes.contains(ConfigChanges::FRAME_PLAN));
    assert!(!renderer.frame_plan().contains(FrameStage::Ssao));
    renderer.render(&output.view).unwrap();

    renderer
        .update_config(RenderConfigPatch {
            ssao: Some(SsaoPatch {
                enabled: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap();
    assert!(renderer.frame_plan().contains(FrameStage::Ssao));
    renderer.render(&output.view).unwrap();
}

#[test]
fn preset_application_is_idempotent() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 64, 64);

    renderer
        .apply_tone_mapping_preset(ToneMappingPreset::NeonNight)
        .unwrap();
    let first = renderer.config().clone();
    let changes = renderer
        .apply_tone_mapping_preset(ToneMappingPreset::NeonNight)
        .unwrap();

    assert!(changes.is_empty());
    assert_eq!(renderer.config(), &first);
}

// ============================================================================
// Scene edits
// ============================================================================

#[test]
fn object_transform_updates_known_ids_only() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = SceneRenderer::new(ctx.clone(), 128, 128, None).unwrap();
    let cube = renderer
        .add_object(&Mesh::cube(), Mat4::IDENTITY, Material::default())
        .unwrap();
    renderer.add_point_light(Vec3::new(0.0, 3.0, 0.0), Vec3::ONE, 2.0, 10.0);

    renderer
        .set_object_transform(cube, Mat4::from_translation(Vec3::new(0.0, 0.5, 0.0)))
        .unwrap();
    let output = Offscreen::new(&ctx.device, 128, 128);
    renderer.render(&output.view).unwrap();

    let mut empty = SceneRenderer::new(ctx, 16, 16, None).unwrap();
    let err = empty.set_object_transform(cube, Mat4::IDENTITY).unwrap_err();
    assert!(matches!(err, MarqueeError::InvalidScene(_)));
    assert_eq!(empty.state(), RendererState::Ready);
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn invalid_wgsl_is_reported_and_not_cached() {
    let Some(ctx) = common::gpu() else { return };
    let mut shaders = ShaderManager::new();

    let err = shaders
        .compile_source(&ctx.device, "broken", "fn vs_main( {".to_string())
        .unwrap_err();
    assert!(
        matches!(&err, MarqueeError::ShaderCompilation { name, .. } if name == "broken"),
        "unexpected error: {err}"
    );
    assert_eq!(shaders.module_count(), 0);

    let source = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }";
    shaders
        .compile_source(&ctx.device, "valid", source.to_string())
        .unwrap();
    assert_eq!(shaders.module_count(), 1);
}

#[test]
fn construction_beyond_device_limits_fails_cleanly() {
    // The default shadow map is 2048²; a 1024 limit must reject it.
    let Some(ctx) = common::gpu_with_texture_limit(1024) else { return };
    let err = SceneRenderer::new(ctx, 64, 64, None).unwrap_err();
    assert!(
        matches!(
            err,
            MarqueeError::GpuValidation { .. } | MarqueeError::ShaderCompilation { .. }
        ),
        "unexpected error: {err}"
    );
    assert!(matches!(RendererStatus::from(&err), RendererStatus::InitFailed(_)));
}

#[test]
fn rejected_config_update_keeps_config_and_fails_renderer() {
    let Some(ctx) = common::gpu_with_texture_limit(1024) else { return };
    let small_shadows = RenderConfigPatch {
        shadow: Some(ShadowPatch {
            map_size: Some(512),
            ..Default::default()
        }),
        ..Default::default()
    };
    let Ok(mut renderer) = SceneRenderer::new(ctx.clone(), 64, 64, Some(small_shadows)) else {
        eprintln!("Skipping: adapter cannot host the renderer under a 1024 limit");
        return;
    };
    let output = Offscreen::new(&ctx.device, 64, 64);
    renderer.render(&output.view).unwrap();

    let err = renderer
        .update_config(RenderConfigPatch {
            shadow: Some(ShadowPatch {
                map_size: Some(2048),
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, MarqueeError::GpuValidation { .. }), "unexpected error: {err}");

    assert_eq!(renderer.config().shadow.map_size, 512);
    assert_eq!(renderer.state(), RendererState::Failed);
    assert!(matches!(renderer.status(), RendererStatus::InitFailed(_)));
    assert!(matches!(
        renderer.render(&output.view),
        Err(MarqueeError::InvalidState { .. })
    ));
    assert!(matches!(
        renderer.update_config(RenderConfigPatch::default()),
        Err(MarqueeError::InvalidState { .. })
    ));

    renderer.destroy();
    assert_eq!(renderer.status(), RendererStatus::Destroyed);
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn destroy_after_three_frames_is_idempotent() {
    let Some(ctx) = common::gpu() else { return };
    let mut renderer = cube_scene(&ctx, 320, 240);
    let output = Offscreen::new(&ctx.device, 320, 240);

    for _ in 0..3 {
        renderer.render(&output.view).unwrap();
    }

    renderer.destroy();
    assert_eq!(renderer.status(), RendererStatus::Destroyed);
    renderer.destroy();
    assert_eq!(renderer.state(), RendererState::Destroyed);

    assert!(matches!(
        renderer.render(&output.view),
        Err(MarqueeError::Destroyed)
    ));
    assert!(matches!(renderer.resize(64, 64), Err(MarqueeError::Destroyed)));
}
