//! Small linear algebra types used by the renderer.

pub mod mat3;
pub mod vec2;
pub mod vec3;
