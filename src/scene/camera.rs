//! First-person fly camera.
//!
//! Right-handed, Y up, standard depth (near → 0, far → 1). Yaw 0 looks down
//! -Z; pitch is clamped to ±89° so the look-at basis never degenerates.

use glam::{Mat4, Vec3};

/// Pitch limit in degrees.
pub const MAX_PITCH_DEGREES: f32 = 89.0;

#[derive(Debug, Clone)]
pub struct FlyCamera {
    pub position: Vec3,
    /// Radians, positive turns right.
    yaw: f32,
    /// Radians, positive looks up.
    pitch: f32,
    /// Vertical field of view in degrees.
    fov: f32,
    near: f32,
    far: f32,
    /// Radians per pixel of mouse movement.
    pub look_sensitivity: f32,
    aspect: f32,
    projection: Mat4,
}

impl FlyCamera {
    #[must_use]
    pub fn new(position: Vec3, fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov,
            near,
            far,
            look_sensitivity: 0.0025,
            aspect: aspect.max(1e-6),
            projection: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    /// Camera at the aisle entrance, eye height, looking down the aisle.
    #[must_use]
    pub fn aisle_entrance(aspect: f32) -> Self {
        Self::new(Vec3::new(0.0, 1.6, 5.0), 60.0, aspect, 0.1, 100.0)
    }

    #[must_use]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[must_use]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        let limit = MAX_PITCH_DEGREES.to_radians();
        self.pitch = pitch.clamp(-limit, limit);
    }

    /// Orients the camera towards `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let Some(dir) = (target - self.position).try_normalize() else {
            return;
        };
        let yaw = dir.x.atan2(-dir.z);
        let pitch = dir.y.clamp(-1.0, 1.0).asin();
        self.set_orientation(yaw, pitch);
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, -cy * cp)
    }

    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    pub fn move_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    pub fn move_up(&mut self, distance: f32) {
        self.position += Vec3::Y * distance;
    }

    /// Applies a mouse delta in pixels. Moving the mouse down looks down.
    pub fn on_mouse_move(&mut self, dx: f32, dy: f32) {
        self.set_orientation(
            self.yaw + dx * self.look_sensitivity,
            self.pitch - dy * self.look_sensitivity,
        );
    }

    /// Keeps the projection in sync with the surface; called on every resize.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        self.update_projection_matrix();
    }

    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Vertical field of view in degrees.
    #[must_use]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, degrees: f32) {
        self.fov = degrees;
        self.update_projection_matrix();
    }

    #[must_use]
    pub fn clip_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        debug_assert!(near > 0.0 && far > near, "invalid clip planes {near}..{far}");
        self.near = near;
        self.far = far;
        self.update_projection_matrix();
    }

    fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    #[must_use]
    pub fn inverse_view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix().inverse()
    }

    #[must_use]
    pub fn inverse_projection_matrix(&self) -> Mat4 {
        self.projection.inverse()
    }

    #[must_use]
    pub fn uniforms(&self) -> CameraUniforms {
        CameraUniforms {
            view_projection: self.view_projection_matrix().to_cols_array_2d(),
            view: self.view_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

/// Per-frame camera block of the geometry pass.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub position: [f32; 4],
}
