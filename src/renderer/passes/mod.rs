//! Render passes, leaf to root in frame order.
//!
//! Each pass owns its targets, layouts and pipelines. `resize` and
//! `destroy` are the only operations that replace GPU resources; everything
//! else rewrites uniforms.

pub mod bloom;
pub mod fxaa;
pub mod gbuffer;
pub mod lighting;
pub mod shadow;
pub mod ssao;
pub mod tone_mapping;

pub use bloom::BloomPass;
pub use fxaa::FxaaPass;
pub use gbuffer::{GBufferAttachments, GeometryBuffer};
pub use lighting::{LightingInputViews, LightingPass};
pub use shadow::ShadowPass;
pub use ssao::SsaoPass;
pub use tone_mapping::ToneMappingPass;
