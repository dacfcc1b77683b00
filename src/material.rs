//! Surface materials as described by MTL libraries.

use std::rc::Rc;

use crate::math::vec3::Vec3;
use crate::texture::Texture;

/// Surface description consumed by the shader.
///
/// Only `diffuse` and `texture` influence rendering; the remaining
/// properties are carried so loaders do not lose information.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub ambient: Vec3,
    pub shininess: f32,
    pub opacity: f32,
    pub illumination_model: u8,
    /// Shared with every other material that references the same image.
    pub texture: Option<Rc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            ambient: Vec3::ZERO,
            shininess: 0.0,
            opacity: 1.0,
            illumination_model: 0,
            texture: None,
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>, diffuse: Vec3) -> Self {
        Self {
            name: name.into(),
            diffuse,
            ..Self::default()
        }
    }

    pub fn with_texture(mut self, texture: Rc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }
}
