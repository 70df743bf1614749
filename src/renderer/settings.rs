//! Renderer Settings
//!
//! Options consumed once when a GPU context is requested: adapter
//! selection, presentation mode and the device's required features and
//! limits. Per-effect tunables live in
//! [`RenderConfig`](crate::resources::config::RenderConfig) instead, since
//! those can change at runtime.
//!
//! ```rust,ignore
//! use marquee::renderer::RendererSettings;
//!
//! let settings = RendererSettings {
//!     vsync: false,
//!     power_preference: wgpu::PowerPreference::LowPower,
//!     ..Default::default()
//! };
//! ```

use crate::resources::config::{DEFAULT_CLEAR_COLOR, RenderConfigPatch};

/// Global configuration for GPU context creation.
///
/// | Field              | Description                         | Default           |
/// |--------------------|-------------------------------------|-------------------|
/// | `vsync`            | Vertical sync enabled               | `true`            |
/// | `power_preference` | GPU adapter selection strategy      | `HighPerformance` |
/// | `clear_color`      | Background where nothing was drawn  | aisle night       |
/// | `required_features`| Required wgpu features              | Empty             |
/// | `required_limits`  | Required wgpu limits                | Default           |
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Caps the frame rate to the display refresh rate when `true`.
    pub vsync: bool,

    /// - `HighPerformance`: Prefer discrete / dedicated GPU
    /// - `LowPower`: Prefer integrated GPU (better battery life)
    pub power_preference: wgpu::PowerPreference,

    /// Linear background colour, forwarded to the initial render config.
    pub clear_color: wgpu::Color,

    /// The context fails to initialize if these features are unavailable.
    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,
}

impl Default for RendererSettings {
    fn default() -> Self {
        let [r, g, b, a] = DEFAULT_CLEAR_COLOR.map(f64::from);
        Self {
            vsync: true,
            power_preference: wgpu::PowerPreference::HighPerformance,
            clear_color: wgpu::Color { r, g, b, a },
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

impl RendererSettings {
    #[must_use]
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }

    /// Render config patch carrying the settings that also exist at runtime.
    #[must_use]
    pub fn initial_config(&self) -> RenderConfigPatch {
        let c = self.clear_color;
        RenderConfigPatch {
            clear_color: Some([c.r as f32, c.g as f32, c.b as f32, c.a as f32]),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_forward_the_aisle_clear_color() {
        let patch = RendererSettings::default().initial_config();
        let color = patch.clear_color.unwrap();
        for (a, b) in color.iter().zip(DEFAULT_CLEAR_COLOR) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn vsync_selects_present_mode() {
        let mut settings = RendererSettings::default();
        assert_eq!(settings.present_mode(), wgpu::PresentMode::AutoVsync);
        settings.vsync = false;
        assert_eq!(settings.present_mode(), wgpu::PresentMode::AutoNoVsync);
    }
}
