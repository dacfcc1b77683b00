//! Local transform of a scene node and its composition rule.
//!
//! A [`Transform`] is a position, an orthonormal rotation matrix and a
//! uniform scale. Points are mapped rotate → scale → translate.
//!
//! # Composition
//!
//! [`Transform::compose`] combines a node's local transform with the
//! transform accumulated from its ancestors:
//!
//! ```text
//! world.position = local.position + parent.position
//! world.rotation = parent.rotation * local.rotation
//! world.scale    = local.scale * parent.scale
//! ```
//!
//! Child translations are **not** carried through the ancestors' rotation or
//! scale; a local position is a plain world-space offset added on top of the
//! parent's. This differs from a conventional scene graph, where a child's
//! offset would be rotated and scaled by the parent. Existing scene layouts
//! depend on the additive behaviour, so it is kept as is.

use crate::math::{mat3::Mat3, vec3::Vec3};

/// A 3D transform with position, rotation matrix, and uniform scale.
///
/// Setters return `&mut Self` for chaining:
///
/// ```ignore
/// transform
///     .set_position_xyz(500.0, 0.0, 0.0)
///     .set_rotation_euler(Vec3::new(FRAC_PI_2, 0.0, 0.0))
///     .set_scale(10.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Mat3,
    scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Zero position, identity rotation, scale 1.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Mat3::IDENTITY,
        scale: 1.0,
    };

    pub fn new() -> Self {
        Self::default()
    }

    // ============ Position ============

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    pub fn set_position_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    // ============ Rotation ============

    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Mat3) -> &mut Self {
        self.rotation = rotation;
        self
    }

    /// Set the rotation from angles in radians: `x` = pitch, `y` = roll,
    /// `z` = yaw.
    ///
    /// The matrix is always `Rz(yaw) * Rx(pitch) * Ry(roll)`.
    pub fn set_rotation_euler(&mut self, angles: Vec3) -> &mut Self {
        self.rotation = Self::euler_matrix(angles);
        self
    }

    pub fn euler_matrix(angles: Vec3) -> Mat3 {
        Mat3::rotation_z(angles.z) * Mat3::rotation_x(angles.x) * Mat3::rotation_y(angles.y)
    }

    // ============ Scale ============

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) -> &mut Self {
        self.scale = scale;
        self
    }

    // ============ Application ============

    /// Compose this local transform with the transform accumulated from the
    /// parent chain. See the module docs for the exact rule.
    pub fn compose(&self, parent: &Transform) -> Transform {
        Transform {
            position: self.position + parent.position,
            rotation: parent.rotation * self.rotation,
            scale: self.scale * parent.scale,
        }
    }

    /// Map a model-space point: rotate, then scale, then translate.
    #[inline]
    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        (self.rotation * point) * self.scale + self.position
    }

    /// Map a model-space normal. Only the rotation applies.
    #[inline]
    pub fn apply_normal(&self, normal: Vec3) -> Vec3 {
        self.rotation * normal
    }
}
