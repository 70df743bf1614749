//! Shadow Light & Projection
//!
//! Pure math for the single shadow-casting light, kept apart from the render
//! pass for reuse and testability.
//!
//! # Projection Selection
//!
//! | `ortho_size` | `fov`      | Projection                          |
//! |--------------|------------|-------------------------------------|
//! | `Some(s)`    | any        | orthographic, half-extent `s`       |
//! | `None`       | `Some(d)`  | perspective, vertical fov `d`°      |
//! | `None`       | `None`     | perspective, 45°                    |

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Fallback vertical field of view for lights that specify neither
/// `ortho_size` nor `fov`.
pub const DEFAULT_SHADOW_FOV_DEGREES: f32 = 45.0;

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    pub enabled: bool,
    /// Shadow map edge length. Changing it recreates the shadow texture.
    pub map_size: u32,
    /// Depth comparison bias applied in the lighting shader.
    pub bias: f32,
    /// Offset along the surface normal (world units) before projecting.
    pub normal_bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: 2048,
            bias: 0.002,
            normal_bias: 0.01,
        }
    }
}

impl ShadowSettings {
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.map_size = self.map_size.clamp(1, 8192);
        self.bias = self.bias.max(0.0);
        self.normal_bias = self.normal_bias.max(0.0);
        self
    }
}

crate::define_settings_patch!(
    /// Partial shadow settings.
    ShadowPatch for ShadowSettings {
        enabled: bool,
        map_size: u32,
        bias: f32,
        normal_bias: f32,
    }
);

// ============================================================================
// Shadow light
// ============================================================================

/// The light the shadow map is rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowLight {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Half-extent of an orthographic (directional) projection.
    pub ortho_size: Option<f32>,
    /// Vertical field of view in degrees of a perspective (spot) projection.
    pub fov: Option<f32>,
    pub near: f32,
    pub far: f32,
    /// Linear RGB colour of the light.
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for ShadowLight {
    /// A ceiling spot looking down the aisle.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 6.0, 4.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            ortho_size: None,
            fov: Some(60.0),
            near: 0.5,
            far: 30.0,
            color: Vec3::new(1.0, 0.95, 0.85),
            intensity: 2.0,
        }
    }
}

/// Resolved projection of a [`ShadowLight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShadowProjection {
    Orthographic { half_extent: f32 },
    Perspective { fov_degrees: f32 },
}

impl ShadowLight {
    /// Resolves the projection kind; `ortho_size` wins over `fov`.
    #[must_use]
    pub fn projection_kind(&self) -> ShadowProjection {
        match (self.ortho_size, self.fov) {
            (Some(half_extent), _) => ShadowProjection::Orthographic { half_extent },
            (None, Some(fov_degrees)) => ShadowProjection::Perspective { fov_degrees },
            (None, None) => ShadowProjection::Perspective {
                fov_degrees: DEFAULT_SHADOW_FOV_DEGREES,
            },
        }
    }

    /// Unit vector from the light towards its target.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        let dir = self.target - self.position;
        debug_assert!(
            dir.length_squared() > 1e-8,
            "shadow light position and target coincide"
        );
        dir.try_normalize().unwrap_or(Vec3::NEG_Y)
    }

    /// Right-handed look-at view matrix. The up vector is replaced when it
    /// is (nearly) parallel to the view direction.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        let dir = self.direction();
        let up = self.up.try_normalize().unwrap_or(Vec3::Y);
        let up = if dir.dot(up).abs() > 0.99 {
            if dir.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y }
        } else {
            up
        };
        Mat4::look_at_rh(self.position, self.position + dir, up)
    }

    /// Standard-depth projection matrix (near → 0, far → 1).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        let near = self.near.max(1e-3);
        let far = self.far.max(near + 1e-3);
        match self.projection_kind() {
            ShadowProjection::Orthographic { half_extent } => {
                let s = half_extent.abs().max(1e-3);
                Mat4::orthographic_rh(-s, s, -s, s, near, far)
            }
            ShadowProjection::Perspective { fov_degrees } => {
                let fov = fov_degrees.to_radians().clamp(0.01, std::f32::consts::PI - 0.01);
                Mat4::perspective_rh(fov, 1.0, near, far)
            }
        }
    }

    /// Light-space matrix: projection × view.
    #[must_use]
    pub fn light_space_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Per-draw uniform pair of the shadow pass, allocated from the
/// uniform arena once per shadow-casting object per frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowDrawUniforms {
    pub light_view_projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl ShadowDrawUniforms {
    #[must_use]
    pub fn new(light_view_projection: Mat4, model: Mat4) -> Self {
        Self {
            light_view_projection: light_view_projection.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ortho_size_wins_over_fov() {
        let light = ShadowLight {
            ortho_size: Some(10.0),
            fov: Some(30.0),
            ..Default::default()
        };
        assert_eq!(
            light.projection_kind(),
            ShadowProjection::Orthographic { half_extent: 10.0 }
        );
    }

    #[test]
    fn vertical_light_still_has_valid_basis() {
        let light = ShadowLight {
            position: Vec3::new(0.0, 10.0, 0.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            ..Default::default()
        };
        let m = light.light_space_matrix();
        assert!(m.is_finite());
    }
}
