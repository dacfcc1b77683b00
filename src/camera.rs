//! First-person camera and perspective projection.
//!
//! # Coordinate System
//!
//! The world is **Z-up**. With yaw and pitch at zero the camera looks along
//! +Y, +X is to its right and +Z is up.
//!
//! # Orientation
//!
//! Orientation is stored as yaw/pitch and the basis `{normal, right, up}` is
//! recomputed eagerly on every change, since projection reads it for every
//! vertex of every frame.
//!
//! - **Yaw**: rotation around Z, unbounded (wraps through the trig functions)
//! - **Pitch**: elevation above the XY plane, clamped to `[-π/2, π/2]`

use std::f32::consts::FRAC_PI_2;

use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;

/// One of the four movement directions driven by the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Back,
            Direction::Back => Direction::Forward,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Logical movement key state.
///
/// Opposing directions are mutually exclusive: pressing one releases the
/// other, so at most one direction per axis is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
}

impl MoveKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, direction: Direction) {
        *self.slot_mut(direction.opposite()) = false;
        *self.slot_mut(direction) = true;
    }

    pub fn release(&mut self, direction: Direction) {
        *self.slot_mut(direction) = false;
    }

    pub fn is_pressed(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Back => self.back,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut bool {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Back => &mut self.back,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// A world point mapped into pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Pixel-space position; y grows downward in buffer row order.
    pub screen: Vec2,
    /// Camera-space depth along the view normal. Always positive.
    pub depth: f32,
}

/// First-person camera with a yaw/pitch orientation and a pinhole projection.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,

    normal: Vec3,
    right: Vec3,
    up: Vec3,

    /// Field of view in radians.
    fov: f32,
    width: u32,
    height: u32,

    /// Radians of rotation per unit of pointer motion.
    sensitivity: f32,
    /// World units per unit of delta time.
    speed: f32,
}

impl Camera {
    /// Creates a camera at the origin looking along +Y.
    ///
    /// The viewport starts at 1x1; call [`update_viewport`](Self::update_viewport)
    /// before projecting anything meaningful.
    pub fn new(fov: f32, sensitivity: f32, speed: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            normal: Vec3::ZERO,
            right: Vec3::ZERO,
            up: Vec3::ZERO,
            fov,
            width: 1,
            height: 1,
            sensitivity,
            speed,
        };
        camera.compute_basis();
        camera
    }

    // =========================================================================
    // Basis
    // =========================================================================

    fn compute_basis(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();

        self.normal = Vec3::new(cos_pitch * sin_yaw, cos_pitch * cos_yaw, sin_pitch);
        self.right = self.normal.cross(Vec3::UP).normalize();
        self.up = self.right.cross(self.normal);
    }

    // =========================================================================
    // Input bridge
    // =========================================================================

    /// Stores the viewport size used for aspect correction and pixel mapping.
    ///
    /// Any depth buffer sized to the previous viewport is stale afterwards;
    /// reallocating it is the caller's job.
    pub fn update_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Moves the camera along its view normal and right vector.
    ///
    /// The combined direction is normalized so diagonal movement is not
    /// faster. With no key pressed the camera stays put.
    pub fn update_position(&mut self, keys: &MoveKeys, dt: f32) {
        let mut direction = Vec3::ZERO;
        if keys.is_pressed(Direction::Forward) {
            direction += self.normal;
        }
        if keys.is_pressed(Direction::Back) {
            direction += -self.normal;
        }
        if keys.is_pressed(Direction::Left) {
            direction += -self.right;
        }
        if keys.is_pressed(Direction::Right) {
            direction += self.right;
        }

        self.position += direction.normalize_or_zero() * (self.speed * dt);
    }

    /// Applies relative pointer motion. Positive `dx` turns right, positive
    /// `dy` looks down.
    pub fn update_orientation(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
        self.compute_basis();
    }

    /// Sets yaw and pitch directly. Pitch is clamped like pointer input.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-FRAC_PI_2, FRAC_PI_2);
        self.compute_basis();
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Projects a world point into pixel space.
    ///
    /// Returns `None` when the point is on or behind the camera plane
    /// (`depth <= 0`). That is an expected outcome, not an error.
    #[inline]
    pub fn project_point(&self, point: Vec3) -> Option<ProjectedPoint> {
        let rel = point - self.position;
        let depth = rel.dot(self.normal);
        if depth <= 0.0 {
            return None;
        }

        let f = 1.0 / (self.fov * 0.5).tan();
        let aspect = self.width as f32 / self.height as f32;

        let x = rel.dot(self.right) / depth * (f / aspect);
        let y = rel.dot(self.up) / depth * f;

        // (-1, 1] to pixel space, flipping y into buffer row order
        let screen = Vec2::new(
            (x + 1.0) * 0.5 * self.width as f32,
            (1.0 - (y + 1.0) * 0.5) * self.height as f32,
        );
        Some(ProjectedPoint { screen, depth })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// The view direction.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        let mut camera = Camera::new(FRAC_PI_2, 0.01, 2.0);
        camera.update_viewport(100, 100);
        camera
    }

    fn assert_orthonormal(camera: &Camera) {
        let (n, r, u) = (camera.normal(), camera.right(), camera.up());
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(r.magnitude(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(u.magnitude(), 1.0, epsilon = 1e-4);
        assert_relative_eq!(n.dot(r), 0.0, epsilon = 1e-4);
        assert_relative_eq!(n.dot(u), 0.0, epsilon = 1e-4);
        assert_relative_eq!(r.dot(u), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn camera_starts_looking_along_y() {
        let camera = camera();
        assert_relative_eq!(camera.normal().y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.right().x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.up().z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn pitch_is_clamped_not_wrapped() {
        let mut camera = camera();
        camera.update_orientation(0.0, -10_000.0);
        assert_relative_eq!(camera.pitch(), FRAC_PI_2);

        camera.update_orientation(0.0, 1_000_000.0);
        assert_relative_eq!(camera.pitch(), -FRAC_PI_2);
        assert!(camera.pitch().abs() <= FRAC_PI_2);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut camera = camera();
        camera.update_orientation(10_000.0, 0.0);
        assert_relative_eq!(camera.yaw(), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut camera = camera();
        let inputs = [
            (12.0, 5.0),
            (-300.0, 40.0),
            (77.0, -1_000.0),
            (3.0, 0.5),
            (-9_000.0, 2_000.0),
            (1.0, -1.0),
        ];
        for (dx, dy) in inputs {
            camera.update_orientation(dx, dy);
            assert_orthonormal(&camera);
        }
    }

    #[test]
    fn move_forward_follows_normal() {
        let mut camera = camera();
        let mut keys = MoveKeys::new();
        keys.press(Direction::Forward);
        camera.update_position(&keys, 1.5);
        assert_relative_eq!(camera.position().y, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut camera = camera();
        let mut keys = MoveKeys::new();
        keys.press(Direction::Forward);
        keys.press(Direction::Right);
        camera.update_position(&keys, 1.0);
        assert_relative_eq!(camera.position().magnitude(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn no_keys_means_no_movement() {
        let mut camera = camera();
        camera.update_position(&MoveKeys::new(), 10.0);
        assert_eq!(camera.position(), Vec3::ZERO);
    }

    #[test]
    fn pressing_a_direction_releases_its_opposite() {
        let mut keys = MoveKeys::new();
        keys.press(Direction::Left);
        keys.press(Direction::Right);
        assert!(!keys.is_pressed(Direction::Left));
        assert!(keys.is_pressed(Direction::Right));

        keys.release(Direction::Right);
        assert!(!keys.any());
    }

    #[test]
    fn project_point_on_axis_hits_center() {
        let camera = camera();
        let p = camera.project_point(Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert_relative_eq!(p.depth, 5.0);
        assert_relative_eq!(p.screen.x, 50.0, epsilon = 1e-4);
        assert_relative_eq!(p.screen.y, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn project_point_flips_y() {
        let camera = camera();
        // fov 90 degrees: f = 1, so z == depth lands on the top edge
        let p = camera.project_point(Vec3::new(0.0, 4.0, 4.0)).unwrap();
        assert_relative_eq!(p.screen.y, 0.0, epsilon = 1e-4);
        let p = camera.project_point(Vec3::new(4.0, 4.0, 0.0)).unwrap();
        assert_relative_eq!(p.screen.x, 100.0, epsilon = 1e-4);
    }

    #[test]
    fn project_point_corrects_aspect_ratio() {
        let mut camera = camera();
        camera.update_viewport(200, 100);
        let p = camera.project_point(Vec3::new(4.0, 4.0, 0.0)).unwrap();
        // x' = 1 / 2 -> three quarters across
        assert_relative_eq!(p.screen.x, 150.0, epsilon = 1e-4);
    }

    #[test]
    fn points_behind_camera_are_unprojectable() {
        let camera = camera();
        assert!(camera.project_point(Vec3::new(0.0, -1.0, 0.0)).is_none());
        assert!(camera.project_point(Vec3::new(3.0, 0.0, 1.0)).is_none());
    }
}
