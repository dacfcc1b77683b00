//! Triangle mesh data consumed by the rasterizer.
//!
//! A [`Mesh`] is an immutable asset: attribute arrays, faces indexing into
//! them, and the materials assigned to runs of faces. Loaders are expected
//! to validate every index; the renderer trusts them.

use crate::material::Material;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;

/// One corner of a face: indices into the mesh's attribute arrays.
///
/// Normals and texture coordinates are optional per corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vertex {
    pub position: usize,
    pub normal: Option<usize>,
    pub texcoord: Option<usize>,
}

impl Vertex {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            normal: None,
            texcoord: None,
        }
    }

    pub fn with_normal(mut self, normal: usize) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_texcoord(mut self, texcoord: usize) -> Self {
        self.texcoord = Some(texcoord);
        self
    }
}

/// A triangle referencing three vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face {
    pub vertices: [Vertex; 3],
}

impl Face {
    pub fn new(vertices: [Vertex; 3]) -> Self {
        Self { vertices }
    }

    /// A face with positions only.
    pub fn positions(a: usize, b: usize, c: usize) -> Self {
        Self::new([Vertex::new(a), Vertex::new(b), Vertex::new(c)])
    }
}

/// "Starting at `face_index`, faces use `materials[material]`."
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialSpan {
    pub face_index: usize,
    pub material: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    name: String,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    faces: Vec<Face>,
    materials: Vec<Material>,
    /// Sorted ascending by `face_index`.
    material_spans: Vec<MaterialSpan>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self {
            name: name.into(),
            positions,
            faces,
            ..Self::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_texcoords(mut self, texcoords: Vec<Vec2>) -> Self {
        self.texcoords = texcoords;
        self
    }

    /// Attach materials and their face spans. Spans are sorted by face index.
    pub fn with_materials(mut self, materials: Vec<Material>, mut spans: Vec<MaterialSpan>) -> Self {
        spans.sort_by_key(|span| span.face_index);
        self.materials = materials;
        self.material_spans = spans;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn texcoords(&self) -> &[Vec2] {
        &self.texcoords
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material_spans(&self) -> &[MaterialSpan] {
        &self.material_spans
    }

    /// A cursor resolving the active material while walking faces in order.
    pub fn material_cursor(&self) -> MaterialCursor<'_> {
        MaterialCursor {
            materials: &self.materials,
            spans: &self.material_spans,
            next: 0,
            current: None,
        }
    }
}

/// Resolves the material of each face during a single forward pass.
///
/// The material of face `i` is the one from the last span with
/// `face_index <= i`, or `None` before the first span. Face indices passed
/// to [`advance`](Self::advance) must not decrease.
pub struct MaterialCursor<'a> {
    materials: &'a [Material],
    spans: &'a [MaterialSpan],
    next: usize,
    current: Option<&'a Material>,
}

impl<'a> MaterialCursor<'a> {
    #[inline]
    pub fn advance(&mut self, face_index: usize) -> Option<&'a Material> {
        while let Some(span) = self.spans.get(self.next) {
            if span.face_index > face_index {
                break;
            }
            self.current = Some(&self.materials[span.material]);
            self.next += 1;
        }
        self.current
    }
}
