use std::path::Path;

use crate::colors;
use crate::math::vec3::Vec3;

/// A decoded 2D texture, shared between materials through `Rc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    data: Vec<u32>, // The pixel data of the texture in ARGB format.
    width: u32,     // The width of the texture in pixels.
    height: u32,    // The height of the texture in pixels.
}

impl Texture {
    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(width, height, img.as_raw()))
    }

    /// Build a texture from tightly packed RGBA bytes, row 0 first.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);

        // Convert RGBA bytes to ARGB u32
        let data = rgba
            .chunks_exact(4)
            .map(|p| {
                let [r, g, b, a] = [p[0], p[1], p[2], p[3]];
                ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
            })
            .collect();

        Self {
            data,
            width,
            height,
        }
    }

    /// Build a texture from ARGB texels, row 0 first.
    pub fn from_argb(width: u32, height: u32, data: Vec<u32>) -> Self {
        debug_assert_eq!(data.len(), (width * height) as usize);
        Self {
            data,
            width,
            height,
        }
    }

    /// Nearest-neighbor lookup returning normalized RGB.
    ///
    /// `u` and `v` must already be in [0, 1]. V is flipped since texture
    /// coordinates have a bottom-left origin while rows are stored top first:
    ///
    /// ```text
    /// x = floor(u * (width - 1))
    /// y = floor((1 - v) * (height - 1))
    /// ```
    #[inline]
    pub fn sample_nearest(&self, u: f32, v: f32) -> Vec3 {
        let x = (u * (self.width - 1) as f32) as u32;
        let y = ((1.0 - v) * (self.height - 1) as f32) as u32;
        colors::unpack_rgb(self.data[(y * self.width + x) as usize])
    }

    pub fn texel(&self, x: u32, y: u32) -> u32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
