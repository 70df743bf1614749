//! Rendering System
//!
//! The deferred pipeline and its orchestrator.
//!
//! # Architecture
//!
//! ```text
//! SceneRenderer
//!  ├─ ShadowPass        shadow map from the shadow light
//!  ├─ GeometryBuffer    albedo / normal / material / emissive / depth
//!  ├─ SsaoPass          occlusion + separable blur
//!  ├─ LightingPass      G-Buffer → HDR
//!  ├─ BloomPass         HDR → bloom level 0
//!  ├─ ToneMappingPass   HDR (+ bloom) → LDR
//!  └─ FxaaPass          LDR → output view
//! ```
//!
//! Every frame walks the [`FramePlan`] into one command encoder and submits
//! once. `resize`, `update_config` and `destroy` take `&mut self`, so no
//! frame can be recorded while resources are being replaced.
//!
//! # Modules
//!
//! - [`context`]: device / queue / output format
//! - [`surface`]: optional window surface helper
//! - [`settings`]: context creation options
//! - [`shader_manager`]: WGSL templates and module cache
//! - [`passes`]: one module per frame stage
//! - [`frame_plan`]: stage order for a configuration
//! - [`uniform_arena`]: transient per-draw uniforms

pub mod context;
pub mod frame_plan;
pub mod passes;
pub mod pipeline;
pub mod render_target;
pub mod settings;
pub mod shader_manager;
pub mod surface;
pub mod uniform_arena;

use std::sync::Arc;

use glam::{Mat4, Vec3};
use parking_lot::Mutex;

use crate::errors::{MarqueeError, Result, ensure_dimensions};
use crate::renderer::context::validated;
use crate::resources::changes::ConfigChanges;
use crate::resources::config::{RenderConfig, RenderConfigPatch};
use crate::resources::light::{
    AmbientLight, LightingInputs, LightingUniforms, MAX_POINT_LIGHTS, PointLight, PointLightPacker,
    SkyLight,
};
use crate::resources::material::Material;
use crate::resources::mesh::Mesh;
use crate::resources::shadow::ShadowLight;
use crate::resources::tone_mapping::ToneMappingPreset;
use crate::scene::camera::FlyCamera;
use crate::scene::object::{ObjectBindings, ObjectId, SceneObject};

pub use context::GpuContext;
pub use frame_plan::{FramePlan, FrameStage};
pub use settings::RendererSettings;
pub use surface::{PresentationSurface, SurfaceFrame};
pub use uniform_arena::UniformArena;

use passes::{
    BloomPass, FxaaPass, GeometryBuffer, LightingInputViews, LightingPass, ShadowPass, SsaoPass,
    ToneMappingPass,
};
use render_target::RenderTarget;
use shader_manager::ShaderManager;

// ─── Target formats ───────────────────────────────────────────────────────────

pub const GBUFFER_ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const GBUFFER_NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_MATERIAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const GBUFFER_EMISSIVE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const GBUFFER_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const SHADOW_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const SSAO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Tone-mapped, gamma-encoded intermediate read by FXAA.
pub const LDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

// ─── State ────────────────────────────────────────────────────────────────────

/// Lifecycle of a [`SceneRenderer`].
///
/// ```text
/// Uninitialized → Initializing → Ready ⇄ (Resizing | Rendering) → Destroyed
///                      │                        │
///                      └──► Failed              └──► DeviceLost
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Resizing,
    Rendering,
    Destroyed,
    /// Resource creation failed; the renderer is unusable.
    Failed,
    DeviceLost,
}

impl RendererState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initializing => "Initializing",
            Self::Ready => "Ready",
            Self::Resizing => "Resizing",
            Self::Rendering => "Rendering",
            Self::Destroyed => "Destroyed",
            Self::Failed => "Failed",
            Self::DeviceLost => "DeviceLost",
        }
    }
}

/// User-facing status. Initialization failure and device loss stay distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererStatus {
    Ready,
    InitFailed(String),
    DeviceLost(String),
    Destroyed,
}

impl From<&MarqueeError> for RendererStatus {
    /// Status for a renderer whose construction returned `err`.
    fn from(err: &MarqueeError) -> Self {
        match err {
            MarqueeError::DeviceLost(msg) => Self::DeviceLost(msg.clone()),
            other => Self::InitFailed(other.to_string()),
        }
    }
}

// ─── SceneRenderer ────────────────────────────────────────────────────────────

/// Deferred renderer for one scene and one output size.
pub struct SceneRenderer {
    context: GpuContext,
    state: RendererState,
    failure: Option<String>,
    device_lost: Arc<Mutex<Option<String>>>,
    uncaptured_error: Arc<Mutex<Option<String>>>,

    size: (u32, u32),
    config: RenderConfig,
    plan: FramePlan,
    shaders: ShaderManager,

    // Passes
    shadow: ShadowPass,
    gbuffer: GeometryBuffer,
    ssao: SsaoPass,
    lighting: LightingPass,
    bloom: BloomPass,
    tone_mapping: ToneMappingPass,
    fxaa: FxaaPass,

    // Targets between passes
    hdr: RenderTarget,
    ldr: RenderTarget,
    placeholder_albedo: RenderTarget,

    // Scene
    objects: Vec<SceneObject>,
    next_object_id: u32,
    point_lights: Vec<PointLight>,
    light_packer: PointLightPacker,
    packed_light_count: usize,
    sky: SkyLight,
    ambient: AmbientLight,
    shadow_light: ShadowLight,
    camera: FlyCamera,
}

impl SceneRenderer {
    /// Builds every pass for a `width`×`height` output.
    ///
    /// Any failure is fatal: it is logged and returned, and no renderer exists.
    pub fn new(
        context: GpuContext,
        width: u32,
        height: u32,
        config: Option<RenderConfigPatch>,
    ) -> Result<Self> {
        log::info!("SceneRenderer: {} ({width}x{height})", RendererState::Initializing.name());
        Self::initialize(context, width, height, config).inspect_err(|e| {
            log::error!("SceneRenderer initialization failed: {e}");
        })
    }

    fn initialize(
        context: GpuContext,
        width: u32,
        height: u32,
        patch: Option<RenderConfigPatch>,
    ) -> Result<Self> {
        ensure_dimensions("surface", width, height)?;
        let device = context.device.clone();
        validated(&device, "renderer initialization", || {
            Self::build(context, width, height, patch)
        })
    }

    fn build(
        context: GpuContext,
        width: u32,
        height: u32,
        patch: Option<RenderConfigPatch>,
    ) -> Result<Self> {
        let config = match patch {
            Some(patch) => RenderConfig::default().apply(&patch),
            None => RenderConfig::default(),
        };
        let plan = FramePlan::from_config(&config);

        let device = &context.device;
        let queue = &context.queue;
        let mut shaders = ShaderManager::new();

        // 1. Targets between passes
        let hdr = RenderTarget::attachment(device, "HDR Color", width, height, HDR_FORMAT)?;
        let ldr = RenderTarget::attachment(device, "LDR Color", width, height, LDR_FORMAT)?;
        let placeholder_albedo = RenderTarget::solid(
            device,
            queue,
            "Placeholder Albedo",
            wgpu::TextureFormat::Rgba8Unorm,
            &[255, 255, 255, 255],
        )?;

        // 2. Passes, in frame order
        let shadow = ShadowPass::new(device, &mut shaders, config.shadow.map_size)?;
        let gbuffer = GeometryBuffer::new(device, &mut shaders, width, height)?;
        let ssao = SsaoPass::new(
            device,
            queue,
            &mut shaders,
            gbuffer.read_layout(),
            config.ssao,
            width,
            height,
        )?;
        let lighting = LightingPass::new(
            device,
            &mut shaders,
            gbuffer.read_layout(),
            LightingInputViews {
                occlusion: ssao.output_view(config.ssao.enabled),
                shadow_map: shadow.map_view(),
                shadow_sampler: shadow.comparison_sampler(),
            },
        )?;
        let bloom = BloomPass::new(
            device,
            queue,
            &mut shaders,
            config.bloom,
            width,
            height,
            &hdr.view,
        )?;
        let tone_mapping = ToneMappingPass::new(device, &mut shaders, &hdr.view, bloom.output_view())?;
        tone_mapping.update(queue, &config.tone_mapping, config.bloom.intensity);
        let fxaa = FxaaPass::new(
            device,
            &mut shaders,
            context.output_format,
            config.fxaa.quality,
            &ldr.view,
        )?;
        fxaa.update(queue, &config.fxaa);

        // 3. Device loss and stray validation errors flip flags checked by the next call
        let device_lost = Arc::new(Mutex::new(None));
        let flag = Arc::clone(&device_lost);
        device.set_device_lost_callback(move |reason, message: String| {
            log::error!("GPU device lost ({reason:?}): {message}");
            *flag.lock() = Some(format!("{reason:?}: {message}"));
        });

        let uncaptured_error = Arc::new(Mutex::new(None));
        let flag = Arc::clone(&uncaptured_error);
        device.on_uncaptured_error(Arc::new(move |error: wgpu::Error| {
            log::error!("Uncaptured GPU error: {error}");
            flag.lock().get_or_insert_with(|| error.to_string());
        }));

        log::info!(
            "SceneRenderer ready: {} shader modules, stages {:?}",
            shaders.module_count(),
            plan.stages()
        );

        Ok(Self {
            state: RendererState::Ready,
            failure: None,
            device_lost,
            uncaptured_error,
            size: (width, height),
            camera: FlyCamera::aisle_entrance(width as f32 / height as f32),
            config,
            plan,
            shaders,
            shadow,
            gbuffer,
            ssao,
            lighting,
            bloom,
            tone_mapping,
            fxaa,
            hdr,
            ldr,
            placeholder_albedo,
            objects: Vec::new(),
            next_object_id: 0,
            point_lights: Vec::new(),
            light_packer: PointLightPacker::new(),
            packed_light_count: 0,
            sky: SkyLight::default(),
            ambient: AmbientLight::default(),
            shadow_light: ShadowLight::default(),
            context,
        })
    }

    // ─── Lifecycle ────────────────────────────────────────────────────────

    /// Fails unless the renderer can accept work.
    fn ensure_usable(&mut self) -> Result<()> {
        if self.state == RendererState::Ready {
            if let Some(message) = self.device_lost.lock().clone() {
                self.state = RendererState::DeviceLost;
                self.failure = Some(message);
            } else if let Some(message) = self.uncaptured_error.lock().take() {
                log::error!("SceneRenderer failed after an uncaptured GPU error");
                self.state = RendererState::Failed;
                self.failure = Some(message);
            }
        }
        match self.state {
            RendererState::Ready => Ok(()),
            RendererState::Destroyed => Err(MarqueeError::Destroyed),
            RendererState::DeviceLost => Err(MarqueeError::DeviceLost(
                self.failure.clone().unwrap_or_default(),
            )),
            found => Err(MarqueeError::InvalidState {
                expected: RendererState::Ready.name(),
                found: found.name(),
            }),
        }
    }

    /// Recreates every size-dependent resource.
    ///
    /// Zero sizes fail with `InvalidDimensions` and leave the renderer
    /// untouched. The same size is a no-op.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        ensure_dimensions("surface", width, height)?;
        self.ensure_usable()?;
        if (width, height) == self.size {
            return Ok(());
        }

        self.state = RendererState::Resizing;
        let device = self.context.device.clone();
        match validated(&device, "resize", || self.recreate_size_dependent(width, height)) {
            Ok(()) => {
                self.state = RendererState::Ready;
                log::debug!("SceneRenderer resized to {width}x{height}");
                Ok(())
            }
            Err(e) => Err(self.fail("Resize", e)),
        }
    }

    /// Moves to `Failed`. Passes may hold released targets at this point,
    /// so nothing is recorded until the renderer is rebuilt.
    fn fail(&mut self, operation: &str, error: MarqueeError) -> MarqueeError {
        log::error!("{operation} failed: {error}");
        self.state = RendererState::Failed;
        self.failure = Some(error.to_string());
        error
    }

    fn recreate_size_dependent(&mut self, width: u32, height: u32) -> Result<()> {
        let device = &self.context.device;
        let queue = &self.context.queue;

        self.gbuffer.resize(device, width, height)?;

        self.hdr.destroy();
        self.hdr = RenderTarget::attachment(device, "HDR Color", width, height, HDR_FORMAT)?;
        self.ldr.destroy();
        self.ldr = RenderTarget::attachment(device, "LDR Color", width, height, LDR_FORMAT)?;

        self.ssao.resize(device, queue, width, height)?;
        self.bloom.resize(device, queue, width, height, &self.hdr.view)?;

        self.size = (width, height);
        self.camera.set_viewport(width, height);
        self.rewire(self.config.ssao.enabled);
        Ok(())
    }

    /// Rebuilds every bind group that references another pass's output.
    fn rewire(&mut self, ssao_enabled: bool) {
        let device = &self.context.device;
        self.lighting.rebind(
            device,
            LightingInputViews {
                occlusion: self.ssao.output_view(ssao_enabled),
                shadow_map: self.shadow.map_view(),
                shadow_sampler: self.shadow.comparison_sampler(),
            },
        );
        self.bloom.rebind(device, &self.hdr.view);
        self.tone_mapping
            .rebind(device, &self.hdr.view, self.bloom.output_view());
        self.fxaa.rebind(device, &self.ldr.view);
    }

    /// Applies `patch` and rebuilds exactly what the change requires.
    ///
    /// The stored config only changes once every rebuild has succeeded. A
    /// failed rebuild leaves the renderer `Failed`.
    pub fn update_config(&mut self, patch: RenderConfigPatch) -> Result<ConfigChanges> {
        self.ensure_usable()?;

        let next = self.config.apply(&patch);
        let changes = self.config.diff(&next);
        if changes.is_empty() {
            return Ok(changes);
        }

        let device = self.context.device.clone();
        if let Err(e) = validated(&device, "config update", || self.rebuild_for(&next, changes)) {
            return Err(self.fail("Config update", e));
        }

        self.config = next;
        self.plan = FramePlan::from_config(&self.config);
        log::info!("Render config updated: {changes:?}");
        Ok(changes)
    }

    fn rebuild_for(&mut self, next: &RenderConfig, changes: ConfigChanges) -> Result<()> {
        let device = &self.context.device;
        let queue = &self.context.queue;

        if changes.contains(ConfigChanges::SHADOW_MAP) {
            self.shadow.resize_map(device, next.shadow.map_size)?;
        }
        self.ssao.apply_settings(device, queue, next.ssao)?;
        self.bloom
            .apply_settings(device, queue, next.bloom, &self.hdr.view)?;
        if changes.contains(ConfigChanges::FXAA_PIPELINE) {
            self.fxaa
                .set_quality(device, &mut self.shaders, next.fxaa.quality)?;
        }
        self.tone_mapping
            .update(queue, &next.tone_mapping, next.bloom.intensity);
        self.fxaa.update(queue, &next.fxaa);

        if changes.intersects(ConfigChanges::RECREATION | ConfigChanges::FRAME_PLAN) {
            self.rewire(next.ssao.enabled);
        }
        Ok(())
    }

    /// Applies a preset as one atomic configuration update.
    pub fn apply_tone_mapping_preset(&mut self, preset: ToneMappingPreset) -> Result<ConfigChanges> {
        log::debug!("Applying tone mapping preset '{}'", preset.name());
        self.update_config(preset.patch())
    }

    /// Releases every GPU resource. Calling it again does nothing.
    pub fn destroy(&mut self) {
        if self.state == RendererState::Destroyed {
            return;
        }

        for object in self.objects.drain(..) {
            object.destroy();
        }
        self.shadow.destroy();
        self.gbuffer.destroy();
        self.ssao.destroy();
        self.lighting.destroy();
        self.bloom.destroy();
        self.tone_mapping.destroy();
        self.fxaa.destroy();
        self.hdr.destroy();
        self.ldr.destroy();
        self.placeholder_albedo.destroy();
        self.shaders.clear();

        self.state = RendererState::Destroyed;
        log::info!("SceneRenderer destroyed");
    }

    #[must_use]
    pub fn state(&self) -> RendererState {
        self.state
    }

    /// `Failed` (from construction or a later rebuild) reports as `InitFailed`.
    #[must_use]
    pub fn status(&self) -> RendererStatus {
        if let Some(message) = self.device_lost.lock().as_ref() {
            if self.state != RendererState::Destroyed {
                return RendererStatus::DeviceLost(message.clone());
            }
        }
        if self.state == RendererState::Ready {
            if let Some(message) = self.uncaptured_error.lock().as_ref() {
                return RendererStatus::InitFailed(message.clone());
            }
        }
        match self.state {
            RendererState::Destroyed => RendererStatus::Destroyed,
            RendererState::DeviceLost => {
                RendererStatus::DeviceLost(self.failure.clone().unwrap_or_default())
            }
            RendererState::Failed => {
                RendererStatus::InitFailed(self.failure.clone().unwrap_or_default())
            }
            _ => RendererStatus::Ready,
        }
    }

    // ─── Frame ────────────────────────────────────────────────────────────

    /// Renders one frame into `target`, which must match the context's
    /// output format and the current size.
    ///
    /// A frame the device rejects is dropped unsubmitted and the renderer
    /// becomes `Failed`.
    pub fn render(&mut self, target: &wgpu::TextureView) -> Result<()> {
        self.ensure_usable()?;
        self.state = RendererState::Rendering;

        let device = self.context.device.clone();
        let commands = validated(&device, "frame encoding", || {
            // 1. Per-frame uniforms
            self.prepare_frame();

            // 2. Encode the plan
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Marquee Frame Encoder"),
            });
            self.encode(&mut encoder, target);
            Ok(encoder.finish())
        });

        // 3. Submit once
        match commands {
            Ok(commands) => {
                self.context.queue.submit(std::iter::once(commands));
                self.state = RendererState::Ready;
                Ok(())
            }
            Err(e) => Err(self.fail("Frame", e)),
        }
    }

    fn prepare_frame(&mut self) {
        let queue = &self.context.queue;

        self.gbuffer.update_camera(queue, &self.camera.uniforms());
        for object in &self.objects {
            object.upload(queue);
        }

        let block = self.light_packer.pack(&self.point_lights);
        self.packed_light_count = block.len();
        let uniforms = LightingUniforms::new(&LightingInputs {
            inv_view_projection: self.camera.inverse_view_projection_matrix(),
            camera_position: self.camera.position,
            sky: &self.sky,
            ambient: &self.ambient,
            shadow_light: &self.shadow_light,
            shadow: &self.config.shadow,
            clear_color: self.config.clear_color,
        });
        self.lighting.update(queue, &uniforms, &block);

        if self.plan.contains(FrameStage::Ssao) {
            self.ssao.update(
                queue,
                self.camera.view_matrix(),
                self.camera.projection_matrix(),
            );
        }
    }

    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let use_bloom = self.plan.contains(FrameStage::Bloom);
        let use_fxaa = self.config.fxaa.enabled;

        for stage in self.plan.iter() {
            match stage {
                FrameStage::Shadow => {
                    let light_space = self.shadow_light.light_space_matrix();
                    self.shadow.render(
                        &self.context.device,
                        &self.context.queue,
                        encoder,
                        light_space,
                        &self.objects,
                    );
                }
                FrameStage::GBuffer => self.gbuffer.render(encoder, &self.objects),
                FrameStage::Ssao => self.ssao.render(encoder, self.gbuffer.read_bind_group()),
                FrameStage::Lighting => {
                    self.lighting
                        .render(encoder, &self.hdr.view, self.gbuffer.read_bind_group());
                }
                FrameStage::Bloom => self.bloom.render(encoder),
                FrameStage::ToneMapping => {
                    self.tone_mapping.render(encoder, &self.ldr.view, use_bloom);
                }
                FrameStage::AntiAlias => self.fxaa.render(encoder, target, use_fxaa),
            }
        }
    }

    // ─── Scene population ─────────────────────────────────────────────────

    /// Adds a single-instance object; the mesh is uploaded immediately.
    pub fn add_object(&mut self, mesh: &Mesh, transform: Mat4, material: Material) -> Result<ObjectId> {
        self.add_instanced_object(mesh, transform, &[Mat4::IDENTITY], material)
    }

    /// Adds an object drawn once per entry of `instances`.
    pub fn add_instanced_object(
        &mut self,
        mesh: &Mesh,
        transform: Mat4,
        instances: &[Mat4],
        material: Material,
    ) -> Result<ObjectId> {
        self.ensure_usable()?;

        let id = ObjectId(self.next_object_id);
        let device = &self.context.device;
        let object = validated(device, "object upload", || {
            SceneObject::new(
                device,
                id,
                mesh,
                transform,
                instances,
                material,
                ObjectBindings {
                    layout: self.gbuffer.object_layout(),
                    placeholder_albedo: &self.placeholder_albedo.view,
                    sampler: self.gbuffer.albedo_sampler(),
                },
            )
        })?;
        self.next_object_id += 1;
        self.objects.push(object);
        Ok(id)
    }

    /// Moves an existing object. The new model matrix is uploaded with the
    /// next frame's per-object uniforms.
    pub fn set_object_transform(&mut self, id: ObjectId, transform: Mat4) -> Result<()> {
        let object = self
            .objects
            .iter_mut()
            .find(|o| o.id() == id)
            .ok_or_else(|| MarqueeError::InvalidScene(format!("unknown object {}", id.index())))?;
        object.set_transform(transform);
        Ok(())
    }

    /// Lights past the packed capacity are kept but not drawn.
    pub fn add_point_light(&mut self, position: Vec3, color: Vec3, intensity: f32, radius: f32) {
        self.point_lights
            .push(PointLight::new(position, color, intensity, radius));
    }

    pub fn clear_point_lights(&mut self) {
        self.point_lights.clear();
    }

    pub fn set_shadow_light(&mut self, light: ShadowLight) {
        self.shadow_light = light;
    }

    pub fn set_sky_light(&mut self, sky: SkyLight) {
        self.sky = sky;
    }

    pub fn set_ambient(&mut self, ambient: AmbientLight) {
        self.ambient = ambient;
    }

    #[must_use]
    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.camera
    }

    // ─── Inspection ───────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn frame_plan(&self) -> &FramePlan {
        &self.plan
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn point_light_count(&self) -> usize {
        self.point_lights.len()
    }

    /// Lights uploaded by the last frame, at most [`MAX_POINT_LIGHTS`].
    #[must_use]
    pub fn packed_point_light_count(&self) -> usize {
        debug_assert!(self.packed_light_count <= MAX_POINT_LIGHTS);
        self.packed_light_count
    }

    #[must_use]
    pub fn gbuffer_target_sizes(&self) -> [(u32, u32); 5] {
        self.gbuffer.target_sizes()
    }

    #[must_use]
    pub fn hdr_size(&self) -> (u32, u32) {
        self.hdr.size()
    }

    #[must_use]
    pub fn ssao_size(&self) -> (u32, u32) {
        self.ssao.texture_size()
    }

    #[must_use]
    pub fn shadow_map_size(&self) -> u32 {
        self.shadow.map_size()
    }

    /// Transient uniform slots the shadow pass has grown to.
    #[must_use]
    pub fn shadow_arena_capacity(&self) -> usize {
        self.shadow.arena_capacity()
    }

    #[must_use]
    pub fn bloom_level_sizes(&self) -> Vec<(u32, u32)> {
        self.bloom.level_sizes()
    }

    #[must_use]
    pub fn bloom_uniform_buffer_count(&self) -> usize {
        self.bloom.uniform_buffer_count()
    }

    /// Cumulative (level textures, step uniform buffers) created by bloom.
    #[must_use]
    pub fn bloom_allocations(&self) -> (usize, usize) {
        (self.bloom.textures_created(), self.bloom.uniform_buffers_created())
    }

    #[must_use]
    pub fn shader_module_count(&self) -> usize {
        self.shaders.module_count()
    }
}

impl std::fmt::Debug for SceneRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRenderer")
            .field("state", &self.state)
            .field("size", &self.size)
            .field("objects", &self.objects.len())
            .field("point_lights", &self.point_lights.len())
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_errors_map_to_distinct_statuses() {
        let lost = MarqueeError::DeviceLost("driver reset".into());
        assert_eq!(
            RendererStatus::from(&lost),
            RendererStatus::DeviceLost("driver reset".into())
        );

        let dims = MarqueeError::InvalidDimensions {
            target: "surface",
            width: 0,
            height: 600,
        };
        assert!(matches!(RendererStatus::from(&dims), RendererStatus::InitFailed(_)));
    }

    #[test]
    fn state_names_are_unique() {
        let states = [
            RendererState::Uninitialized,
            RendererState::Initializing,
            RendererState::Ready,
            RendererState::Resizing,
            RendererState::Rendering,
            RendererState::Destroyed,
            RendererState::Failed,
            RendererState::DeviceLost,
        ];
        let mut names: Vec<_> = states.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), states.len());
    }
}
