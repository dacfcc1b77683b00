//! Edge function-based triangle rasterization.
//!
//! This module implements triangle rasterization using edge functions
//! (signed sub-triangle areas), the foundation of modern GPU rasterization.
//!
//! # Algorithm Overview
//!
//! 1. Compute the integer bounding box of the projected triangle, clamped to
//!    the frame buffer
//! 2. For each pixel center in the box, compute barycentric coordinates
//! 3. A pixel is covered if all three coordinates are non-negative
//!
//! # Signed Area
//!
//! For screen points A, B, C the shoelace formula gives
//!
//! ```text
//! area(A, B, C) = ((B.x - A.x) * (C.y - A.y) - (C.x - A.x) * (B.y - A.y)) / 2
//! ```
//!
//! Screen y grows downward, so a triangle that is counter-clockwise as seen
//! by the viewer has **negative** signed area. Those are the front faces;
//! everything with `area >= 0` is culled before reaching this module.
//!
//! # Barycentric Coordinates
//!
//! ```text
//! alpha = area(V1, V2, P) / area(V0, V1, V2)
//! beta  = area(V2, V0, P) / area(V0, V1, V2)
//! gamma = area(V0, V1, P) / area(V0, V1, V2)
//! ```
//!
//! Each coordinate is the weight of the vertex opposite the sub-triangle.
//!
//! # References
//!
//! - Juan Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988)
//! - Scratchapixel: <https://www.scratchapixel.com/lessons/3d-basic-rendering/rasterization-practical-implementation>

use super::shader::PixelShader;
use crate::math::vec2::Vec2;
use crate::render::framebuffer::FrameBuffer;

/// Signed area of the screen-space triangle (a, b, c).
#[inline]
pub fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)) * 0.5
}

/// Barycentric coordinates `[alpha, beta, gamma]` of `p` against `triangle`.
///
/// The triangle must not be degenerate.
#[inline]
pub fn barycentric(triangle: &[Vec2; 3], p: Vec2) -> [f32; 3] {
    let [v0, v1, v2] = *triangle;
    let inv_area = 1.0 / signed_area(v0, v1, v2);
    [
        signed_area(v1, v2, p) * inv_area,
        signed_area(v2, v0, p) * inv_area,
        signed_area(v0, v1, p) * inv_area,
    ]
}

/// Pixel range `[start, end)` along both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub start_x: u32,
    pub end_x: u32,
    pub start_y: u32,
    pub end_y: u32,
}

impl BoundingBox {
    /// Integer bounds of the triangle clamped to `[0, width) x [0, height)`.
    pub fn of_triangle(triangle: &[Vec2; 3], width: u32, height: u32) -> Self {
        let [v0, v1, v2] = *triangle;
        let clamp = |value: f32, max: u32| value.clamp(0.0, max as f32) as u32;

        Self {
            start_x: clamp(v0.x.min(v1.x).min(v2.x).floor(), width),
            end_x: clamp(v0.x.max(v1.x).max(v2.x).ceil(), width),
            start_y: clamp(v0.y.min(v1.y).min(v2.y).floor(), height),
            end_y: clamp(v0.y.max(v1.y).max(v2.y).ceil(), height),
        }
    }
}

/// Fill a front-facing triangle with depth testing.
///
/// Depth is interpolated affinely from the per-vertex camera-space depths.
/// The shader only runs for pixels that pass the depth test.
///
/// Returns the number of pixels written.
pub fn rasterize_with_shader<S: PixelShader>(
    triangle: &[Vec2; 3],
    depths: [f32; 3],
    buffer: &mut FrameBuffer,
    shader: &S,
) -> u32 {
    let bounds = BoundingBox::of_triangle(triangle, buffer.width(), buffer.height());
    let mut written = 0;

    for y in bounds.start_y..bounds.end_y {
        for x in bounds.start_x..bounds.end_x {
            // Sample at pixel center
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let lambda = barycentric(triangle, p);
            if lambda[0] < 0.0 || lambda[1] < 0.0 || lambda[2] < 0.0 {
                continue;
            }

            let depth = lambda[0] * depths[0] + lambda[1] * depths[1] + lambda[2] * depths[2];
            if buffer.set_pixel_with_depth(x, y, depth, || shader.shade(lambda)) {
                written += 1;
            }
        }
    }

    written
}
