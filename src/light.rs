//! Lighting types for the renderer.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::math::vec3::Vec3;

/// A directional light that illuminates the scene uniformly from a direction.
///
/// Directional lights are ideal for simulating distant light sources like the sun,
/// where all rays are effectively parallel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector compared against surface normals.
    pub direction: Vec3,
    /// Lower bound of the direction factor, so unlit sides stay visible.
    pub min_factor: f32,
}

/// The single light every shaded face is lit by.
pub const SUN: DirectionalLight = DirectionalLight {
    direction: Vec3::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2, 0.0),
    min_factor: 0.2,
};

impl DirectionalLight {
    /// `max(dot(normal, direction), min_factor)` for a unit `normal`.
    #[inline]
    pub fn direction_factor(&self, normal: Vec3) -> f32 {
        normal.dot(self.direction).max(self.min_factor)
    }
}
