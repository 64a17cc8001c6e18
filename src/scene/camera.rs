//! Orbit camera for model navigation
//!
//! Spherical-coordinate camera that orbits around a target point. Pointer
//! input moves goal values; `update` eases the displayed pose toward them so
//! rotation, panning and zoom all settle smoothly instead of stopping dead.

use glam::{Mat4, Vec3};

/// Closest the camera may orbit to the target
pub const MIN_DISTANCE: f32 = 2.0;
/// Farthest the camera may orbit from the target
pub const MAX_DISTANCE: f32 = 50.0;
/// Pitch clamp just short of the poles to avoid gimbal lock
const PITCH_LIMIT: f32 = 1.54;
/// Fraction of the remaining offset consumed per 60 Hz frame
const DAMPING_FACTOR: f32 = 0.05;
/// Pose deltas below this are snapped to the goal
const SETTLE_EPSILON: f32 = 1e-4;

const ROTATE_SENSITIVITY: f32 = 0.005;
const PAN_SENSITIVITY: f32 = 0.0015;

/// Orbit camera for model navigation
pub struct OrbitCamera {
    /// Horizontal angle (yaw) in radians
    yaw: f32,
    /// Vertical angle (pitch) in radians
    pitch: f32,
    /// Distance from target point
    distance: f32,
    /// Point the camera orbits around
    target: Vec3,

    // Goal pose that input mutates; the displayed pose eases toward it
    goal_yaw: f32,
    goal_pitch: f32,
    goal_distance: f32,
    goal_target: Vec3,

    /// Aspect ratio (width/height) for projection
    aspect: f32,
    /// Field of view in radians
    fov: f32,
    /// Near clipping plane
    near: f32,
    /// Far clipping plane
    far: f32,
}

impl OrbitCamera {
    /// Create a new orbit camera with the viewer's default pose
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: 8.0,
            target: Vec3::ZERO,
            goal_yaw: 0.0,
            goal_pitch: 0.0,
            goal_distance: 8.0,
            goal_target: Vec3::ZERO,
            aspect: 16.0 / 9.0,
            fov: 50.0_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Calculate camera position from spherical coordinates
    pub fn eye_position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Handle a left-button drag delta (orbit)
    pub fn on_rotate(&mut self, dx: f32, dy: f32) {
        self.goal_yaw -= dx * ROTATE_SENSITIVITY;
        self.goal_pitch = (self.goal_pitch + dy * ROTATE_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Handle a right-button drag delta (pan)
    ///
    /// Moves the orbit target in the camera plane, scaled by distance so the
    /// gesture covers the same screen-space travel at any zoom level.
    pub fn on_pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.eye_position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);

        let offset =
            (right * -dx + up * dy) * self.goal_distance * PAN_SENSITIVITY;
        self.goal_target += offset;
    }

    /// Handle a scroll delta (zoom)
    pub fn on_zoom(&mut self, delta: f32) {
        // Multiplicative zoom for smooth feel
        self.goal_distance =
            (self.goal_distance * (1.0 - delta * 0.1)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advance damping by `dt` seconds.
    ///
    /// Returns true while the pose is still converging toward its goal.
    pub fn update(&mut self, dt: f32) -> bool {
        // Time-compensated exponential ease so the feel is frame-rate
        // independent: at 60 Hz each frame closes DAMPING_FACTOR of the gap.
        let alpha = 1.0 - (1.0 - DAMPING_FACTOR).powf(dt.max(0.0) * 60.0);

        self.yaw += (self.goal_yaw - self.yaw) * alpha;
        self.pitch += (self.goal_pitch - self.pitch) * alpha;
        self.distance += (self.goal_distance - self.distance) * alpha;
        self.target += (self.goal_target - self.target) * alpha;

        let moving = (self.goal_yaw - self.yaw).abs() > SETTLE_EPSILON
            || (self.goal_pitch - self.pitch).abs() > SETTLE_EPSILON
            || (self.goal_distance - self.distance).abs() > SETTLE_EPSILON
            || (self.goal_target - self.target).length() > SETTLE_EPSILON;

        if !moving {
            self.yaw = self.goal_yaw;
            self.pitch = self.goal_pitch;
            self.distance = self.goal_distance;
            self.target = self.goal_target;
        }
        moving
    }

    /// Update aspect ratio on resize
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Move the orbit target (e.g. after loading a model), skipping damping
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.goal_target = target;
    }

    /// Get current yaw
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Get current pitch
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Get current distance
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Set camera pose directly (for loading saved settings)
    pub fn set_pose(&mut self, yaw: f32, pitch: f32, distance: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.goal_yaw = self.yaw;
        self.goal_pitch = self.pitch;
        self.goal_distance = self.distance;
    }

    /// Reset camera to the default pose
    pub fn reset(&mut self) {
        self.goal_yaw = 0.0;
        self.goal_pitch = 0.0;
        self.goal_distance = 8.0;
        self.goal_target = Vec3::ZERO;
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose() {
        let camera = OrbitCamera::new();
        // yaw 0 / pitch 0 / distance 8 puts the eye on the +Z axis
        let eye = camera.eye_position();
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 0.0, 8.0), 1e-5));
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut camera = OrbitCamera::new();
        for _ in 0..100 {
            camera.on_zoom(5.0);
        }
        camera.update(10.0);
        assert!(camera.distance() >= MIN_DISTANCE - 1e-4);

        for _ in 0..200 {
            camera.on_zoom(-5.0);
        }
        camera.update(10.0);
        assert!(camera.distance() <= MAX_DISTANCE + 1e-4);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = OrbitCamera::new();
        camera.on_rotate(0.0, 10_000.0);
        camera.update(10.0);
        assert!(camera.pitch() <= PITCH_LIMIT + 1e-4);
    }

    #[test]
    fn test_damping_converges_and_settles() {
        let mut camera = OrbitCamera::new();
        camera.on_rotate(100.0, 0.0);
        assert!(camera.update(1.0 / 60.0), "should still be easing");

        // After plenty of simulated time the pose snaps onto the goal
        let mut moving = true;
        for _ in 0..1000 {
            moving = camera.update(1.0 / 60.0);
            if !moving {
                break;
            }
        }
        assert!(!moving, "damping never settled");
        let settled_yaw = camera.yaw();
        assert!(!camera.update(1.0 / 60.0));
        assert_eq!(camera.yaw(), settled_yaw);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut camera = OrbitCamera::new();
        camera.on_pan(50.0, 0.0);
        camera.update(10.0);
        // Panning right from the default pose slides the target along -X
        let eye = camera.eye_position();
        assert!(eye.x.abs() > 1e-4);
        assert!((eye.z - 8.0).abs() < 1e-3);
    }

    #[test]
    fn test_set_pose_clamps() {
        let mut camera = OrbitCamera::new();
        camera.set_pose(1.0, 10.0, 500.0);
        assert_eq!(camera.yaw(), 1.0);
        assert!(camera.pitch() <= PITCH_LIMIT);
        assert!(camera.distance() <= MAX_DISTANCE);
    }

    #[test]
    fn test_reset_returns_to_default() {
        let mut camera = OrbitCamera::new();
        camera.on_rotate(300.0, 120.0);
        camera.on_zoom(3.0);
        camera.update(10.0);
        camera.reset();
        for _ in 0..1000 {
            if !camera.update(1.0 / 60.0) {
                break;
            }
        }
        assert!(camera.eye_position().abs_diff_eq(Vec3::new(0.0, 0.0, 8.0), 1e-3));
    }
}
