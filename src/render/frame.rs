//! Per-frame scene traversal.

use log::trace;

use super::framebuffer::FrameBuffer;
use super::rasterizer::rasterize_mesh;
use crate::camera::Camera;
use crate::colors;
use crate::scene::{NodeId, NodeKind, SceneError, SceneGraph};
use crate::transform::Transform;

/// Work counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes: usize,
    pub faces: usize,
    pub faces_behind_camera: usize,
    pub faces_culled: usize,
    pub pixels_written: u64,
}

/// Clear `buffer` and draw every mesh reachable from the scene root.
///
/// Children are visited in the order they appear in their group, each with
/// its local transform composed onto the accumulated one. The root's own
/// transform is not applied. A polygon node anywhere in the tree aborts the
/// frame with [`SceneError::Unimplemented`]; whatever was drawn up to that
/// point stays in the buffer.
pub fn render_frame(
    scene: &SceneGraph,
    camera: &Camera,
    buffer: &mut FrameBuffer,
) -> Result<FrameStats, SceneError> {
    buffer.clear(colors::SKY);

    let mut stats = FrameStats::default();
    let root_children = scene.children(scene.root())?;
    render_children(scene, root_children, &Transform::IDENTITY, camera, buffer, &mut stats)?;

    trace!(
        "frame: {} meshes, {} faces ({} behind camera, {} culled), {} pixels",
        stats.meshes,
        stats.faces,
        stats.faces_behind_camera,
        stats.faces_culled,
        stats.pixels_written
    );
    Ok(stats)
}

fn render_children(
    scene: &SceneGraph,
    children: &[NodeId],
    accumulated: &Transform,
    camera: &Camera,
    buffer: &mut FrameBuffer,
    stats: &mut FrameStats,
) -> Result<(), SceneError> {
    for &child in children {
        let node = scene.get(child).ok_or(SceneError::InvalidNode(child))?;
        let world = node.transform().compose(accumulated);

        match node.kind() {
            NodeKind::Mesh(mesh) => rasterize_mesh(mesh, &world, camera, buffer, stats),
            NodeKind::Group(grandchildren) => {
                render_children(scene, grandchildren, &world, camera, buffer, stats)?
            }
            NodeKind::Polygon(_) => {
                return Err(SceneError::Unimplemented("rendering polygon scene nodes"))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::math::vec2::Vec2;
    use crate::math::vec3::Vec3;
    use crate::mesh::{Face, MaterialSpan, Mesh, Vertex};
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    const W: u32 = 16;
    const H: u32 = 16;

    fn camera() -> Camera {
        let mut camera = Camera::new(FRAC_PI_2, 0.01, 1.0);
        camera.update_viewport(W, H);
        camera
    }

    /// Right triangle two units in front of the camera, facing it, with
    /// normals pointing back at the viewer and a plain white material.
    ///
    /// Projects to (8, 8), (16, 8), (8, 0) in a 16x16 viewport.
    fn lit_triangle() -> Rc<Mesh> {
        let corner = |p| Vertex::new(p).with_normal(0).with_texcoord(0);
        Rc::new(
            Mesh::new(
                "lit",
                vec![
                    Vec3::new(0.0, 2.0, 0.0),
                    Vec3::new(2.0, 2.0, 0.0),
                    Vec3::new(0.0, 2.0, 2.0),
                ],
                vec![Face::new([corner(0), corner(1), corner(2)])],
            )
            .with_normals(vec![Vec3::new(0.0, -1.0, 0.0)])
            .with_texcoords(vec![Vec2::ZERO])
            .with_materials(
                vec![Material::new("white", Vec3::ONE)],
                vec![MaterialSpan {
                    face_index: 0,
                    material: 0,
                }],
            ),
        )
    }

    fn render(scene: &SceneGraph) -> (Vec<u32>, Vec<f32>, FrameStats) {
        let mut color = vec![0; (W * H) as usize];
        let mut depth = vec![0.0; (W * H) as usize];
        let stats = {
            let mut fb = FrameBuffer::new(&mut color, &mut depth, W, H);
            render_frame(scene, &camera(), &mut fb).unwrap()
        };
        (color, depth, stats)
    }

    fn at(x: u32, y: u32) -> usize {
        (y * W + x) as usize
    }

    #[test]
    fn empty_scene_is_all_sky_at_infinite_depth() {
        let (color, depth, stats) = render(&SceneGraph::new());
        assert!(color.iter().all(|c| *c == colors::SKY));
        assert!(depth.iter().all(|d| *d == f32::INFINITY));
        assert_eq!(stats, FrameStats::default());
    }

    #[test]
    fn single_lit_triangle_end_to_end() {
        let mut scene = SceneGraph::new();
        scene.add_mesh(Some(scene.root()), lit_triangle()).unwrap();
        let (color, depth, stats) = render(&scene);

        // dot((0,-1,0), (-1/sqrt2, -1/sqrt2, 0)) = 0.7071 -> 180
        assert_eq!(color[at(9, 6)], 0xFFB4B4B4);
        assert_relative_eq!(depth[at(9, 6)], 2.0, epsilon = 1e-5);

        for (x, y) in [(2, 2), (15, 1), (9, 12)] {
            assert_eq!(color[at(x, y)], colors::SKY);
            assert_eq!(depth[at(x, y)], f32::INFINITY);
        }

        let drawn = color.iter().filter(|c| **c != colors::SKY).count() as u64;
        assert_eq!(stats.pixels_written, drawn);
        assert_eq!(stats.meshes, 1);
        assert_eq!(stats.faces, 1);
    }

    #[test]
    fn group_offsets_are_accumulated() {
        let mut scene = SceneGraph::new();
        let outer = scene.add_group(Some(scene.root())).unwrap();
        let inner = scene.add_group(Some(outer)).unwrap();
        scene.add_mesh(Some(inner), lit_triangle()).unwrap();

        // +50 then -50 along x cancels out
        scene.set_position(outer, Vec3::new(50.0, 0.0, 0.0)).unwrap();
        scene.set_position(inner, Vec3::new(-50.0, 0.0, 0.0)).unwrap();
        let (color, _, _) = render(&scene);
        assert_eq!(color[at(9, 6)], 0xFFB4B4B4);

        scene.set_position(inner, Vec3::ZERO).unwrap();
        let (color, _, stats) = render(&scene);
        assert!(color.iter().all(|c| *c == colors::SKY));
        assert_eq!(stats.faces, 1);
    }

    #[test]
    fn root_transform_is_ignored() {
        let mut scene = SceneGraph::new();
        scene.add_mesh(Some(scene.root()), lit_triangle()).unwrap();
        scene.set_position(scene.root(), Vec3::new(100.0, 0.0, 0.0)).unwrap();
        let (color, _, _) = render(&scene);
        assert_eq!(color[at(9, 6)], 0xFFB4B4B4);
    }

    #[test]
    fn detached_meshes_are_not_drawn() {
        let mut scene = SceneGraph::new();
        scene.add_mesh(None, lit_triangle()).unwrap();
        let (color, _, stats) = render(&scene);
        assert!(color.iter().all(|c| *c == colors::SKY));
        assert_eq!(stats.meshes, 0);
    }

    #[test]
    fn shared_mesh_drawn_once_per_node() {
        let mesh = lit_triangle();
        let mut scene = SceneGraph::new();
        let a = scene.add_mesh(Some(scene.root()), Rc::clone(&mesh)).unwrap();
        scene.add_mesh(Some(scene.root()), Rc::clone(&mesh)).unwrap();
        // push the first copy behind the second
        scene.set_position(a, Vec3::new(0.0, 1.0, 0.0)).unwrap();

        let (_, depth, stats) = render(&scene);
        assert_eq!(stats.meshes, 2);
        assert_relative_eq!(depth[at(9, 6)], 2.0, epsilon = 1e-5);
    }
}
