//! Pixel shaders for triangle rasterization.
//!
//! This module provides a trait-based abstraction for per-pixel shading computations,
//! similar to how GPUs separate the fixed-function rasterizer from programmable
//! fragment/pixel shaders.
//!
//! # Architecture
//!
//! The rasterizer handles:
//! - Bounding box computation
//! - Barycentric coordinate calculation and coverage
//! - Depth testing
//!
//! The shader handles:
//! - Attribute interpolation (texture coordinates, normals)
//! - Texture sampling
//! - Final color computation
//!
//! Shaders only run for pixels that pass the depth test.

use crate::colors::{self, pack_rgb};
use crate::light::SUN;
use crate::material::Material;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;

/// Trait for per-pixel shading computations.
///
/// The rasterizer calls `shade()` for each visible pixel inside the triangle,
/// providing the barycentric coordinates for attribute interpolation.
///
/// # Barycentric Coordinates
///
/// The `lambda` parameter contains three weights [α, β, γ] that:
/// - Sum to 1.0
/// - Are all non-negative for covered pixels
/// - Weight the attributes of vertices 0, 1 and 2 respectively
pub trait PixelShader {
    /// Compute the ARGB color for a pixel given its barycentric coordinates.
    fn shade(&self, lambda: [f32; 3]) -> u32;
}

/// Flat shader - returns a constant color for all pixels.
///
/// Faces that cannot be material-shaded (no texture coordinates, or no
/// active material) are drawn with [`colors::DEBUG`] through this shader.
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self { color }
    }

    pub fn debug() -> Self {
        Self::new(colors::DEBUG)
    }
}

impl PixelShader for FlatShader {
    #[inline]
    fn shade(&self, _lambda: [f32; 3]) -> u32 {
        self.color
    }
}

/// Material shader - texture × diffuse × directional light.
///
/// ```text
/// color  = white
/// color *= texture(perspective-correct uv)   if the material has a texture
/// color *= material.diffuse
/// color *= max(dot(n, light), 0.2)           if the face has normals
/// ```
pub struct MaterialShader<'a> {
    material: &'a Material,
    texcoords: [Vec2; 3],
    normals: Option<[Vec3; 3]>,
    /// Camera-space depth of each vertex.
    depths: [f32; 3],
}

impl<'a> MaterialShader<'a> {
    pub fn new(
        material: &'a Material,
        texcoords: [Vec2; 3],
        normals: Option<[Vec3; 3]>,
        depths: [f32; 3],
    ) -> Self {
        Self {
            material,
            texcoords,
            normals,
            depths,
        }
    }

    /// Perspective-correct texture coordinates, clamped to [0, 1].
    ///
    /// Attributes are weighted by `lambda_i / depth_i` and renormalized by
    /// the sum of those weights.
    #[inline]
    fn interpolate_uv(&self, lambda: [f32; 3]) -> (f32, f32) {
        let w = [
            lambda[0] / self.depths[0],
            lambda[1] / self.depths[1],
            lambda[2] / self.depths[2],
        ];
        let mut denom = w[0] + w[1] + w[2];
        if denom == 0.0 {
            denom = 1.0;
        }

        let [t0, t1, t2] = self.texcoords;
        let u = (w[0] * t0.x + w[1] * t1.x + w[2] * t2.x) / denom;
        let v = (w[0] * t0.y + w[1] * t1.y + w[2] * t2.y) / denom;
        (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
    }

    #[inline]
    fn interpolate_normal(normals: &[Vec3; 3], lambda: [f32; 3]) -> Vec3 {
        (lambda[0] * normals[0] + lambda[1] * normals[1] + lambda[2] * normals[2]).normalize()
    }
}

impl PixelShader for MaterialShader<'_> {
    #[inline]
    fn shade(&self, lambda: [f32; 3]) -> u32 {
        let mut color = Vec3::ONE;

        if let Some(texture) = &self.material.texture {
            let (u, v) = self.interpolate_uv(lambda);
            color = color.mul_elements(texture.sample_nearest(u, v));
        }

        color = color.mul_elements(self.material.diffuse);

        if let Some(normals) = &self.normals {
            let normal = Self::interpolate_normal(normals, lambda);
            color = color * SUN.direction_factor(normal);
        }

        pack_rgb(color)
    }
}
