//! Scene graph: an ownership tree of meshes and groups.
//!
//! Nodes live in a [`SlotMap`] arena and are addressed by [`NodeId`]
//! handles. A group owns the ordered list of its children's ids; every node
//! keeps a non-owning `parent` id used for detaching. A node is listed in at
//! most one group, and that group is its `parent`. Only the root and
//! explicitly detached nodes have no parent.
//!
//! Local transforms are edited in place. World transforms are never cached;
//! the frame driver recomputes them on every traversal.

use std::rc::Rc;

use log::{debug, warn};
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

use crate::math::vec3::Vec3;
use crate::mesh::Mesh;
use crate::transform::Transform;

new_key_type! {
    /// Stable handle to a node in a [`SceneGraph`].
    pub struct NodeId;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0:?} does not exist in this scene")]
    InvalidNode(NodeId),
    #[error("node {0:?} is not a group and cannot have children")]
    NotAGroup(NodeId),
    #[error("the scene root cannot be reparented")]
    RootNode,
    #[error("cannot move node {0:?} underneath itself")]
    Cycle(NodeId),
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),
}

/// Variant-specific payload of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Shares an externally owned mesh asset.
    Mesh(Rc<Mesh>),
    /// Reserved; polygon nodes cannot be created yet.
    Polygon(Vec<Vec3>),
    /// Children in insertion order, which is also traversal order.
    Group(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    transform: Transform,
    parent: Option<NodeId>,
    kind: NodeKind,
}

impl SceneNode {
    /// Transform relative to the parent.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Group(children) => children,
            _ => &[],
        }
    }
}

pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a scene holding only an empty root group.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode {
            transform: Transform::IDENTITY,
            parent: None,
            kind: NodeKind::Group(Vec::new()),
        });
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(self.node(id)?.children())
    }

    /// All nodes below `id` in pre-order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id)?.children().iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.nodes.get(next) {
                stack.extend(node.children().iter().rev());
            }
        }
        Ok(out)
    }

    // ============ Construction ============

    /// Add a mesh node. With `parent == None` the node starts detached.
    pub fn add_mesh(
        &mut self,
        parent: Option<NodeId>,
        mesh: Rc<Mesh>,
    ) -> Result<NodeId, SceneError> {
        debug!("adding mesh node '{}'", mesh.name());
        self.insert(parent, NodeKind::Mesh(mesh))
    }

    pub fn add_group(&mut self, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        self.insert(parent, NodeKind::Group(Vec::new()))
    }

    /// Polygon nodes are not supported. Always fails without touching the
    /// scene.
    pub fn add_polygon(
        &mut self,
        _parent: Option<NodeId>,
        vertices: &[Vec3],
    ) -> Result<NodeId, SceneError> {
        warn!("refusing to add a polygon node with {} vertices", vertices.len());
        Err(SceneError::Unimplemented("polygon scene nodes"))
    }

    fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            self.group_children_mut(parent)?;
        }

        let id = self.nodes.insert(SceneNode {
            transform: Transform::IDENTITY,
            parent,
            kind,
        });
        if let Some(parent) = parent {
            self.group_children_mut(parent)?.push(id);
        }
        Ok(id)
    }

    // ============ Local transform ============

    pub fn transform(&self, id: NodeId) -> Result<&Transform, SceneError> {
        Ok(&self.node(id)?.transform)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.set_position(position);
        Ok(())
    }

    /// Set the rotation from angles: `x` = pitch, `y` = roll, `z` = yaw.
    pub fn set_rotation(&mut self, id: NodeId, angles: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.set_rotation_euler(angles);
        Ok(())
    }

    pub fn set_scale(&mut self, id: NodeId, scale: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.set_scale(scale);
        Ok(())
    }

    // ============ Structure ============

    /// Move `id` under `new_parent`, or detach it when `new_parent` is `None`.
    ///
    /// Removal from the old parent is a swap-remove, so the order of the
    /// remaining siblings is not preserved.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootNode);
        }
        self.node(id)?;
        if let Some(target) = new_parent {
            self.group_children_mut(target)?;
            if target == id || self.descendants(id)?.contains(&target) {
                return Err(SceneError::Cycle(id));
            }
        }

        self.detach(id);
        self.node_mut(id)?.parent = new_parent;
        if let Some(target) = new_parent {
            self.group_children_mut(target)?.push(id);
        }
        Ok(())
    }

    /// Detach `id` from its parent and destroy it together with every
    /// descendant. Shared mesh assets are released, not destroyed.
    ///
    /// The root itself always survives: removing it clears its children and
    /// leaves an empty scene. Detached nodes are not reachable from the root
    /// and are left alone.
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.node(id)?;

        let mut doomed = self.descendants(id)?;
        if id != self.root {
            doomed.push(id);
        }
        if doomed
            .iter()
            .any(|n| matches!(self.nodes[*n].kind, NodeKind::Polygon(_)))
        {
            return Err(SceneError::Unimplemented("removing polygon scene nodes"));
        }

        if id == self.root {
            self.group_children_mut(id)?.clear();
        } else {
            self.detach(id);
        }
        for node in &doomed {
            self.nodes.remove(*node);
        }
        debug!("removed {} scene nodes", doomed.len());
        Ok(())
    }

    /// Unlink `id` from its parent's child list. The node keeps a stale
    /// `parent` id until the caller overwrites it.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(NodeKind::Group(children)) = self.nodes.get_mut(parent).map(|n| &mut n.kind) {
            if let Some(pos) = children.iter().position(|c| *c == id) {
                children.swap_remove(pos);
            }
        }
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id).ok_or(SceneError::InvalidNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::InvalidNode(id))
    }

    fn group_children_mut(&mut self, id: NodeId) -> Result<&mut Vec<NodeId>, SceneError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Group(children) => Ok(children),
            _ => Err(SceneError::NotAGroup(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Face;

    fn mesh() -> Rc<Mesh> {
        Rc::new(Mesh::new(
            "tri",
            vec![Vec3::ZERO, Vec3::ONE, Vec3::UP],
            vec![Face::positions(0, 1, 2)],
        ))
    }

    #[test]
    fn new_scene_has_empty_root() {
        let scene = SceneGraph::new();
        assert_eq!(scene.len(), 1);
        assert!(scene.children(scene.root()).unwrap().is_empty());
        assert_eq!(scene.parent(scene.root()).unwrap(), None);
    }

    #[test]
    fn add_appends_in_insertion_order() {
        let mut scene = SceneGraph::new();
        let root = Some(scene.root());
        let a = scene.add_group(root).unwrap();
        let b = scene.add_mesh(root, mesh()).unwrap();
        let c = scene.add_group(root).unwrap();
        assert_eq!(scene.children(scene.root()).unwrap(), &[a, b, c]);
        assert_eq!(scene.parent(b).unwrap(), Some(scene.root()));
        assert_eq!(*scene.transform(b).unwrap(), Transform::IDENTITY);
    }

    #[test]
    fn detached_nodes_have_no_parent() {
        let mut scene = SceneGraph::new();
        let g = scene.add_group(None).unwrap();
        assert_eq!(scene.parent(g).unwrap(), None);
        assert!(scene.children(scene.root()).unwrap().is_empty());
    }

    #[test]
    fn mesh_nodes_cannot_be_parents() {
        let mut scene = SceneGraph::new();
        let m = scene.add_mesh(Some(scene.root()), mesh()).unwrap();
        assert_eq!(scene.add_group(Some(m)), Err(SceneError::NotAGroup(m)));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn add_polygon_is_unimplemented() {
        let mut scene = SceneGraph::new();
        let result = scene.add_polygon(Some(scene.root()), &[Vec3::ZERO, Vec3::ONE, Vec3::UP]);
        assert!(matches!(result, Err(SceneError::Unimplemented(_))));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn setters_edit_the_local_transform_only() {
        let mut scene = SceneGraph::new();
        let g = scene.add_group(Some(scene.root())).unwrap();
        let m = scene.add_mesh(Some(g), mesh()).unwrap();
        scene.set_position(g, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        scene.set_scale(g, 4.0).unwrap();
        scene.set_rotation(g, Vec3::new(0.1, 0.2, 0.3)).unwrap();

        assert_eq!(scene.transform(g).unwrap().position(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.transform(g).unwrap().scale(), 4.0);
        assert_eq!(
            scene.transform(g).unwrap().rotation(),
            Transform::euler_matrix(Vec3::new(0.1, 0.2, 0.3))
        );
        assert_eq!(*scene.transform(m).unwrap(), Transform::IDENTITY);
    }

    #[test]
    fn reparent_swap_removes_from_old_parent() {
        let mut scene = SceneGraph::new();
        let root = Some(scene.root());
        let a = scene.add_mesh(root, mesh()).unwrap();
        let b = scene.add_mesh(root, mesh()).unwrap();
        let c = scene.add_mesh(root, mesh()).unwrap();
        let g = scene.add_group(root).unwrap();

        scene.reparent(a, Some(g)).unwrap();
        // last child moved into the vacated slot
        assert_eq!(scene.children(scene.root()).unwrap(), &[g, b, c]);
        assert_eq!(scene.children(g).unwrap(), &[a]);
        assert_eq!(scene.parent(a).unwrap(), Some(g));
    }

    #[test]
    fn reparent_to_none_detaches() {
        let mut scene = SceneGraph::new();
        let a = scene.add_mesh(Some(scene.root()), mesh()).unwrap();
        scene.reparent(a, None).unwrap();
        assert!(scene.children(scene.root()).unwrap().is_empty());
        assert_eq!(scene.parent(a).unwrap(), None);
        assert!(scene.contains(a));
    }

    #[test]
    fn reparent_rejects_cycles_and_root() {
        let mut scene = SceneGraph::new();
        let outer = scene.add_group(Some(scene.root())).unwrap();
        let inner = scene.add_group(Some(outer)).unwrap();
        assert_eq!(scene.reparent(outer, Some(inner)), Err(SceneError::Cycle(outer)));
        assert_eq!(scene.reparent(outer, Some(outer)), Err(SceneError::Cycle(outer)));
        assert_eq!(scene.reparent(scene.root(), Some(inner)), Err(SceneError::RootNode));
        assert_eq!(scene.children(outer).unwrap(), &[inner]);
    }

    #[test]
    fn remove_group_frees_every_descendant() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let keep = scene.add_mesh(Some(root), mesh()).unwrap();
        let group = scene.add_group(Some(root)).unwrap();
        let nested = scene.add_group(Some(group)).unwrap();
        let leaf_a = scene.add_mesh(Some(group), mesh()).unwrap();
        let leaf_b = scene.add_mesh(Some(nested), mesh()).unwrap();

        scene.remove(group).unwrap();

        assert_eq!(scene.children(root).unwrap(), &[keep]);
        for gone in [group, nested, leaf_a, leaf_b] {
            assert!(!scene.contains(gone));
        }
        let reachable = scene.descendants(root).unwrap();
        assert_eq!(reachable, vec![keep]);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn remove_mesh_releases_only_the_node() {
        let asset = mesh();
        let mut scene = SceneGraph::new();
        let m = scene.add_mesh(Some(scene.root()), Rc::clone(&asset)).unwrap();
        assert_eq!(Rc::strong_count(&asset), 2);
        scene.remove(m).unwrap();
        assert_eq!(Rc::strong_count(&asset), 1);
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut scene = SceneGraph::new();
        let m = scene.add_mesh(Some(scene.root()), mesh()).unwrap();
        scene.remove(m).unwrap();
        assert_eq!(scene.remove(m), Err(SceneError::InvalidNode(m)));
        assert_eq!(
            scene.set_scale(m, 2.0),
            Err(SceneError::InvalidNode(m))
        );
    }

    #[test]
    fn removing_the_root_empties_the_scene() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let group = scene.add_group(Some(root)).unwrap();
        let nested = scene.add_mesh(Some(group), mesh()).unwrap();
        let loose = scene.add_group(None).unwrap();

        scene.remove(root).unwrap();
        assert!(scene.contains(root));
        assert!(scene.children(root).unwrap().is_empty());
        assert!(!scene.contains(group));
        assert!(!scene.contains(nested));
        assert!(scene.contains(loose));
        assert_eq!(scene.len(), 2);

        let again = scene.add_mesh(Some(root), mesh()).unwrap();
        assert_eq!(scene.children(root).unwrap(), &[again]);
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut scene = SceneGraph::new();
        let root = Some(scene.root());
        let a = scene.add_group(root).unwrap();
        let a1 = scene.add_mesh(Some(a), mesh()).unwrap();
        let b = scene.add_mesh(root, mesh()).unwrap();
        assert_eq!(scene.descendants(scene.root()).unwrap(), vec![a, a1, b]);
    }
}
