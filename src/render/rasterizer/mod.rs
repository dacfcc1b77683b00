//! Per-face pipeline: gather → transform → project → cull → fill.
//!
//! Faces are processed one at a time straight out of the mesh; nothing is
//! sorted or batched. Visibility is resolved entirely by the depth buffer.
//!
//! A face is dropped without drawing when
//! - any of its vertices projects on or behind the camera plane (there is
//!   no near-plane clipping), or
//! - its projected signed area is `>= 0` (back-facing or degenerate).

mod edgefunction;
mod shader;

pub use edgefunction::{barycentric, rasterize_with_shader, signed_area, BoundingBox};
pub use shader::{FlatShader, MaterialShader, PixelShader};

use super::frame::FrameStats;
use super::framebuffer::FrameBuffer;
use crate::camera::Camera;
use crate::material::Material;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::mesh::{Face, Mesh};
use crate::transform::Transform;

/// What happened to a single face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceOutcome {
    /// Rasterized; `pixels` passed the depth test.
    Drawn { pixels: u32 },
    /// At least one vertex had `depth <= 0`.
    BehindCamera,
    /// Back-facing or zero-area on screen.
    Culled,
}

/// Attributes of one face resolved from the mesh arrays.
///
/// Normals and texture coordinates are only present when all three
/// vertices supply them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRenderData {
    pub positions: [Vec3; 3],
    pub normals: Option<[Vec3; 3]>,
    pub texcoords: Option<[Vec2; 3]>,
}

impl FaceRenderData {
    /// Resolve a face's indices. Indices are trusted to be in range.
    pub fn gather(mesh: &Mesh, face: &Face) -> Self {
        let [a, b, c] = face.vertices;
        let positions = mesh.positions();

        let normals = match (a.normal, b.normal, c.normal) {
            (Some(i), Some(j), Some(k)) => {
                let n = mesh.normals();
                Some([n[i], n[j], n[k]])
            }
            _ => None,
        };
        let texcoords = match (a.texcoord, b.texcoord, c.texcoord) {
            (Some(i), Some(j), Some(k)) => {
                let t = mesh.texcoords();
                Some([t[i], t[j], t[k]])
            }
            _ => None,
        };

        Self {
            positions: [positions[a.position], positions[b.position], positions[c.position]],
            normals,
            texcoords,
        }
    }

    /// Move the face into world space. Normals are only rotated.
    pub fn transform(&mut self, transform: &Transform) {
        for p in &mut self.positions {
            *p = transform.apply_point(*p);
        }
        if let Some(normals) = &mut self.normals {
            for n in normals {
                *n = transform.apply_normal(*n);
            }
        }
    }
}

/// Rasterize one face of a mesh with its world transform and active
/// material.
pub fn rasterize_face(
    mesh: &Mesh,
    face: &Face,
    material: Option<&Material>,
    transform: &Transform,
    camera: &Camera,
    buffer: &mut FrameBuffer,
) -> FaceOutcome {
    let mut data = FaceRenderData::gather(mesh, face);
    data.transform(transform);

    let mut screen = [Vec2::ZERO; 3];
    let mut depths = [0.0; 3];
    for i in 0..3 {
        let Some(projected) = camera.project_point(data.positions[i]) else {
            return FaceOutcome::BehindCamera;
        };
        screen[i] = projected.screen;
        depths[i] = projected.depth;
    }

    if signed_area(screen[0], screen[1], screen[2]) >= 0.0 {
        return FaceOutcome::Culled;
    }

    let pixels = match (data.texcoords, material) {
        (Some(texcoords), Some(material)) => {
            let shader = MaterialShader::new(material, texcoords, data.normals, depths);
            rasterize_with_shader(&screen, depths, buffer, &shader)
        }
        _ => rasterize_with_shader(&screen, depths, buffer, &FlatShader::debug()),
    };
    FaceOutcome::Drawn { pixels }
}

/// Rasterize every face of `mesh` in array order, resolving materials from
/// the mesh's spans as faces are visited.
pub fn rasterize_mesh(
    mesh: &Mesh,
    transform: &Transform,
    camera: &Camera,
    buffer: &mut FrameBuffer,
    stats: &mut FrameStats,
) {
    let mut materials = mesh.material_cursor();
    stats.meshes += 1;

    for (index, face) in mesh.faces().iter().enumerate() {
        let material = materials.advance(index);
        stats.faces += 1;
        match rasterize_face(mesh, face, material, transform, camera, buffer) {
            FaceOutcome::Drawn { pixels } => stats.pixels_written += u64::from(pixels),
            FaceOutcome::BehindCamera => stats.faces_behind_camera += 1,
            FaceOutcome::Culled => stats.faces_culled += 1,
        }
    }
}
