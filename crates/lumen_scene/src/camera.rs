//! Fly camera: pixel coordinates to world-space rays.

use std::f32::consts::PI;

use lumen_math::{Mat3, Ray, Vec2, Vec3};

/// Camera positioned in the world with a yaw/pitch orientation and a
/// vertical field of view.
///
/// `generate_ray` maps image coordinates (origin top-left, `[0, w) x
/// [0, h)`) to world-space rays; sub-pixel jitter is already folded into
/// the pixel coordinate by the caller.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    rotation: Mat3,

    /// Vertical field of view in radians.
    fovy: f32,
    image_size: Vec2,
}

impl Camera {
    /// Movement speed of `fly`, in world units per second.
    const FLY_SPEED: f32 = 2.0;

    /// Create a camera at the origin looking down -z.
    pub fn new() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            rotation: Mat3::IDENTITY,
            fovy: 1.0,
            image_size: Vec2::ONE,
        };
        camera.set_position_orientation(Vec3::ZERO, 0.0, 0.0);
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Move and orient the camera, rebuilding the cached rotation.
    pub fn set_position_orientation(&mut self, position: Vec3, yaw: f32, pitch: f32) {
        self.position = position;
        self.yaw = yaw;
        self.pitch = pitch;
        self.rotation = Mat3::from_rotation_y(yaw) * Mat3::from_rotation_x(pitch);
    }

    /// Set the output image size rays are generated for.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_size = Vec2::new(width as f32, height as f32);
    }

    /// Set the vertical field of view in radians.
    pub fn set_fovy(&mut self, fovy: f32) {
        self.fovy = fovy;
    }

    /// Convert an image-space position into a world-space ray.
    pub fn generate_ray(&self, pixel: Vec2) -> Ray {
        let half_tan = (self.fovy * 0.5).tan();
        let aspect = self.image_size.x / self.image_size.y;

        // Image y grows downward, view-space y grows upward.
        let ndc_x = 2.0 * (pixel.x / self.image_size.x) - 1.0;
        let ndc_y = 1.0 - 2.0 * (pixel.y / self.image_size.y);

        let view_dir = Vec3::new(ndc_x * aspect * half_tan, ndc_y * half_tan, -1.0).normalize();

        Ray::new(self.position, self.rotation * view_dir)
    }

    /// Advance the camera by one input frame.
    ///
    /// `movement` holds the intended travel along (side, up, forward) as
    /// -1/0/+1 components; `d_yaw`/`d_pitch` are the orientation deltas
    /// for this frame; `dt` is the frame time in seconds. Pitch is
    /// clamped short of straight up/down. Returns whether anything
    /// changed, which is the caller's cue to restart the preview render.
    pub fn fly(&mut self, movement: Vec3, d_yaw: f32, d_pitch: f32, dt: f32) -> bool {
        let mut changed = false;

        let mut yaw = self.yaw;
        let mut pitch = self.pitch;
        if d_yaw != 0.0 || d_pitch != 0.0 {
            yaw += d_yaw;
            pitch = (pitch + d_pitch).clamp(-0.49 * PI, 0.49 * PI);
            changed = true;
        }

        let mut position = self.position;
        if movement.length() > 0.1 {
            // Forward is the yaw heading flattened onto the ground plane.
            let up = Vec3::Y;
            let forward = Mat3::from_rotation_y(yaw) * Vec3::NEG_Z;
            let forward = (forward - up * forward.dot(up)).normalize();
            let side = forward.cross(up).normalize();

            let world_move = side * movement.x + up * movement.y + forward * movement.z;
            position += world_move.normalize() * Self::FLY_SPEED * dt;
            changed = true;
        }

        if changed {
            self.set_position_orientation(position, yaw, pitch);
        }
        changed
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_ray_points_forward() {
        let mut camera = Camera::new();
        camera.set_image_size(100, 100);

        let ray = camera.generate_ray(Vec2::new(50.0, 50.0));
        assert_eq!(ray.origin, Vec3::ZERO);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_top_of_image_looks_up() {
        let mut camera = Camera::new();
        camera.set_image_size(100, 100);

        let top = camera.generate_ray(Vec2::new(50.0, 0.0));
        let bottom = camera.generate_ray(Vec2::new(50.0, 100.0));
        assert!(top.direction.y > 0.0);
        assert!(bottom.direction.y < 0.0);
    }

    #[test]
    fn test_yaw_rotates_ray_heading() {
        let mut camera = Camera::new();
        camera.set_image_size(100, 100);
        camera.set_position_orientation(Vec3::ZERO, PI * 0.5, 0.0);

        // Quarter turn left: forward becomes -x.
        let ray = camera.generate_ray(Vec2::new(50.0, 50.0));
        assert!((ray.direction - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_fly_reports_changes() {
        let mut camera = Camera::new();

        assert!(!camera.fly(Vec3::ZERO, 0.0, 0.0, 0.016));

        assert!(camera.fly(Vec3::ZERO, 0.1, 0.0, 0.016));
        assert_eq!(camera.yaw(), 0.1);

        let before = camera.position();
        assert!(camera.fly(Vec3::new(0.0, 0.0, 1.0), 0.0, 0.0, 0.5));
        assert!((camera.position() - before).length() > 0.5);
    }

    #[test]
    fn test_fly_clamps_pitch() {
        let mut camera = Camera::new();
        camera.fly(Vec3::ZERO, 0.0, 10.0, 0.016);
        assert!(camera.pitch() <= 0.49 * PI);
    }
}
