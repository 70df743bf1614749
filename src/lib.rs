#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! # Marquee
//!
//! Deferred, physically-based `wgpu` renderer for a stylised video-club
//! aisle: G-Buffer, shadow map, SSAO, PBR lighting into HDR, bloom, tone
//! mapping and FXAA, sequenced by [`SceneRenderer`].
//!
//! ```rust,ignore
//! use marquee::{GpuContext, Material, Mesh, SceneRenderer};
//!
//! let mut renderer = SceneRenderer::new(context, 1280, 720, None)?;
//! renderer.add_object(&Mesh::cube(), glam::Mat4::IDENTITY, Material::default())?;
//! renderer.add_point_light(glam::Vec3::new(0.0, 3.0, 0.0), glam::Vec3::ONE, 2.0, 10.0);
//! renderer.render(&frame_view)?;
//! ```

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use errors::{MarqueeError, Result};
pub use renderer::{
    FramePlan, FrameStage, GpuContext, PresentationSurface, RendererSettings, RendererState,
    RendererStatus, SceneRenderer, SurfaceFrame,
};
pub use resources::{
    AmbientLight, BloomSettings, ConfigChanges, FxaaQuality, FxaaSettings, Material, Mesh,
    PointLight, RenderConfig, RenderConfigPatch, ShadowLight, ShadowSettings, SkyLight,
    SsaoSettings, ToneMappingMode, ToneMappingPreset, ToneMappingSettings, Vertex,
};
pub use scene::{FlyCamera, ObjectId};
