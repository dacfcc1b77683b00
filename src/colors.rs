//! Color constants and ARGB8888 packing helpers.

use crate::math::vec3::Vec3;

/// Frame background.
pub const SKY: u32 = 0xFF87CEEB;
/// Faces without texture coordinates or without a material.
pub const DEBUG: u32 = 0xFF00FFFF;

/// Pack normalized RGB components into an opaque ARGB8888 pixel.
///
/// Components are clamped to [0, 1] and truncated to 8 bits.
#[inline]
pub fn pack_rgb(color: Vec3) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u32;
    0xFF00_0000 | (channel(color.x) << 16) | (channel(color.y) << 8) | channel(color.z)
}

/// Unpack the RGB channels of an ARGB8888 pixel into [0, 1] components.
#[inline]
pub fn unpack_rgb(color: u32) -> Vec3 {
    Vec3::new(
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    )
}
