//! Core data definitions, independent of any GPU object:
//! - Mesh / Vertex / InstanceData: geometry handed in by the asset side
//! - Material: metallic-roughness parameters and G-Buffer flags
//! - Lights: point, sky, ambient, shadow light
//! - Per-effect settings (shadow, SSAO, bloom, tone mapping, FXAA)
//! - RenderConfig / RenderConfigPatch and change classification

mod macros;

pub mod bloom;
pub mod changes;
pub mod config;
pub mod fxaa;
pub mod light;
pub mod material;
pub mod mesh;
pub mod shadow;
pub mod ssao;
pub mod tone_mapping;

pub use bloom::{BloomChainLayout, BloomPatch, BloomSettings, BloomStep};
pub use changes::ConfigChanges;
pub use config::{FxaaPatch, RenderConfig, RenderConfigPatch};
pub use fxaa::{FxaaQuality, FxaaSettings};
pub use light::{
    AmbientLight, MAX_POINT_LIGHTS, PointLight, PointLightBlock, PointLightPacker, SkyLight,
};
pub use material::{Material, MaterialFlags};
pub use mesh::{InstanceData, Mesh, Vertex};
pub use shadow::{ShadowLight, ShadowPatch, ShadowProjection, ShadowSettings};
pub use ssao::{SsaoPatch, SsaoSettings};
pub use tone_mapping::{ToneMappingMode, ToneMappingPatch, ToneMappingPreset, ToneMappingSettings};
