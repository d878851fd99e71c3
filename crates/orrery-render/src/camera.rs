//! Orbit camera: spherical coordinates about the world origin with
//! cursor-displacement steering and scroll-wheel zoom.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// A camera orbiting the origin on a sphere of radius `distance`.
///
/// `theta` sweeps around the x-z plane and `phi` is measured down from the
/// positive-y pole, matching the sphere-mesh parameterization. Steering
/// accelerates quadratically with cursor displacement so small nudges give
/// fine control and screen-edge drags spin fast.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Azimuth angle around the y axis, kept in `(-pi, pi]`.
    pub theta: f32,
    /// Polar angle from the +y pole, kept in `(-pi, pi]`.
    pub phi: f32,
    /// Distance from the origin.
    pub distance: f32,
    /// Steering/zoom acceleration factor.
    pub accel: f32,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: std::f32::consts::FRAC_PI_2,
            distance: 1200.0,
            accel: 0.2,
            fov_y: 20.0_f32.to_radians(),
            aspect_ratio: 1.0,
            near: 0.1,
            far: 10_020.0,
        }
    }
}

impl OrbitCamera {
    /// Camera position in world space.
    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.phi.sin() * self.theta.sin(),
            self.distance * self.phi.cos(),
            self.distance * self.theta.cos() * self.phi.sin(),
        )
    }

    /// Steer by a normalized cursor displacement in `[-1, 1]` per axis,
    /// with quadratic acceleration.
    pub fn steer(&mut self, dx: f32, dy: f32) {
        self.theta += (self.accel * dx * dx).abs() * dx.signum();
        self.phi += (self.accel * dy * dy).abs() * dy.signum();
        self.theta = small_pi_bound(self.theta);
        self.phi = small_pi_bound(self.phi);
    }

    /// Zoom by a scroll offset: multiplicative, so zoom speed tracks the
    /// current distance. Positive scroll backs the camera away.
    pub fn zoom(&mut self, scroll: f32) {
        let shift = scroll.abs().sqrt() * scroll.signum() * self.accel;
        self.distance *= 1.0 + shift;
        self.distance = self.distance.max(self.near * 2.0);
    }

    /// Update the aspect ratio after a window resize.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// The view matrix looking at the origin.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.eye();
        // Orient the camera with the vector directly to its right, so the
        // horizon stays level as theta sweeps around.
        let right = Vec3::new(self.theta.cos(), 0.0, -self.theta.sin());
        let up = eye.cross(right).normalize_or(Vec3::Y);
        Mat4::look_at_rh(eye, Vec3::ZERO, up)
    }

    /// The perspective projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    /// Combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Convert to a uniform suitable for GPU upload.
    pub fn to_uniform(&self) -> CameraUniform {
        let eye = self.eye();
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: [eye.x, eye.y, eye.z, 0.0],
        }
    }
}

/// GPU uniform for the camera bind group.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Column-major view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world position (w unused).
    pub camera_pos: [f32; 4],
}

/// Re-bound an angle into `(-pi, pi]` after a single-step increment.
fn small_pi_bound(mut a: f32) -> f32 {
    if a < -std::f32::consts::PI {
        a += std::f32::consts::TAU;
    }
    if a > std::f32::consts::PI {
        a -= std::f32::consts::TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_distance_constant_under_steering() {
        let mut cam = OrbitCamera::default();
        for _ in 0..50 {
            cam.steer(0.7, -0.4);
            assert!((cam.eye().length() - cam.distance).abs() < cam.distance * 1e-5);
        }
    }

    #[test]
    fn test_angles_stay_bounded() {
        let mut cam = OrbitCamera::default();
        for _ in 0..500 {
            cam.steer(1.0, 1.0);
            assert!(cam.theta > -std::f32::consts::PI - 1e-6);
            assert!(cam.theta <= std::f32::consts::PI + 1e-6);
        }
    }

    #[test]
    fn test_zoom_is_multiplicative_and_clamped() {
        let mut cam = OrbitCamera::default();
        let start = cam.distance;
        // Positive scroll zooms out, negative zooms in.
        cam.zoom(1.0);
        assert!(cam.distance > start);
        cam.zoom(-1.0);
        cam.zoom(-1.0);
        assert!(cam.distance < start);
        for _ in 0..1000 {
            cam.zoom(-1.0);
        }
        assert!(cam.distance >= cam.near * 2.0);
    }

    #[test]
    fn test_view_matrix_sends_eye_to_origin() {
        let cam = OrbitCamera::default();
        let eye_in_view = cam.view_matrix().transform_point3(cam.eye());
        assert!(eye_in_view.length() < 1e-3);
    }
}
