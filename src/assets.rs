//! Mesh and texture loading with path-keyed sharing.
//!
//! Meshes come from Wavefront OBJ files (with their MTL libraries) through
//! `tobj`; textures are decoded with `image`. Every index in a loaded mesh
//! is checked here so the rasterizer never has to.
//!
//! tobj fills in normal and texcoord indices for corners that name none
//! when any corner of the same model does, so the face lines are scanned
//! once more to tell which corners really carry `vt`/`vn`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, warn};
use thiserror::Error;

use crate::material::Material;
use crate::math::vec2::Vec2;
use crate::math::vec3::Vec3;
use crate::mesh::{Face, MaterialSpan, Mesh, Vertex};
use crate::texture::Texture;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to load texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path}: {what} index {index} out of range (have {len})")]
    IndexOutOfRange {
        path: PathBuf,
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// Owns every loaded mesh and texture and hands out shared references.
///
/// Loading the same file twice returns the same `Rc`. Files are identified
/// by their canonical path, so different spellings of one path share an
/// entry.
#[derive(Default)]
pub struct AssetStore {
    meshes: HashMap<PathBuf, Rc<Mesh>>,
    textures: HashMap<PathBuf, Rc<Texture>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> Result<Rc<Mesh>, LoadError> {
        let path = canonical(path.as_ref())?;
        if let Some(mesh) = self.meshes.get(&path) {
            return Ok(Rc::clone(mesh));
        }

        let mesh = Rc::new(self.read_obj(&path)?);
        debug!(
            "loaded mesh {} ({} positions, {} faces, {} materials)",
            path.display(),
            mesh.positions().len(),
            mesh.faces().len(),
            mesh.materials().len()
        );
        self.meshes.insert(path, Rc::clone(&mesh));
        Ok(mesh)
    }

    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<Rc<Texture>, LoadError> {
        let path = canonical(path.as_ref())?;
        if let Some(texture) = self.textures.get(&path) {
            return Ok(Rc::clone(texture));
        }

        let texture = Texture::from_file(&path).map_err(|source| LoadError::Texture {
            path: path.clone(),
            source,
        })?;
        debug!(
            "loaded texture {} ({}x{})",
            path.display(),
            texture.width(),
            texture.height()
        );
        let texture = Rc::new(texture);
        self.textures.insert(path, Rc::clone(&texture));
        Ok(texture)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Drop every asset nobody outside the store holds a reference to.
    ///
    /// Meshes go first so textures only they referenced are released in the
    /// same call. Returns the number of entries dropped.
    pub fn purge_unused(&mut self) -> usize {
        let before = self.meshes.len() + self.textures.len();
        self.meshes.retain(|_, mesh| Rc::strong_count(mesh) > 1);
        self.textures.retain(|_, texture| Rc::strong_count(texture) > 1);
        let purged = before - self.meshes.len() - self.textures.len();
        if purged > 0 {
            debug!("purged {} unused assets", purged);
        }
        purged
    }

    fn read_obj(&mut self, path: &Path) -> Result<Mesh, LoadError> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: false,
            ..Default::default()
        };
        let (models, materials) =
            tobj::load_obj(path, &options).map_err(|source| LoadError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let text = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let triangles: usize = models.iter().map(|m| m.mesh.indices.len() / 3).sum();
        let attributes = corner_attributes(&String::from_utf8_lossy(&text));
        let attributes = if attributes.len() == triangles {
            Some(attributes)
        } else {
            warn!(
                "{}: scanned {} triangles but tobj produced {}, trusting its attribute indices",
                path.display(),
                attributes.len(),
                triangles
            );
            None
        };

        let materials = materials.unwrap_or_else(|err| {
            warn!("{}: material library not loaded: {}", path.display(), err);
            Vec::new()
        });
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let materials = materials
            .iter()
            .map(|mtl| self.convert_material(base, mtl))
            .collect::<Vec<_>>();

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut texcoords = Vec::new();
        let mut faces = Vec::new();
        let mut spans = Vec::new();

        for model in &models {
            let m = &model.mesh;
            let (p_base, n_base, t_base) = (positions.len(), normals.len(), texcoords.len());

            positions.extend(m.positions.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2])));
            normals.extend(m.normals.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2])));
            texcoords.extend(m.texcoords.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])));

            if let Some(material) = m.material_id {
                check(path, "material", material, materials.len())?;
                spans.push(MaterialSpan {
                    face_index: faces.len(),
                    material,
                });
            }

            let has_normals = !m.normal_indices.is_empty();
            let has_texcoords = !m.texcoord_indices.is_empty();
            for (f, triangle) in m.indices.chunks_exact(3).enumerate() {
                let present = attributes
                    .as_ref()
                    .map_or([CornerAttributes::ALL; 3], |a| a[faces.len()]);
                let mut corners = [Vertex::new(0); 3];
                for (k, corner) in corners.iter_mut().enumerate() {
                    let i = f * 3 + k;
                    let p = p_base + triangle[k] as usize;
                    check(path, "position", p, positions.len())?;
                    *corner = Vertex::new(p);

                    if has_normals && present[k].normal {
                        let n = n_base + index_at(path, &m.normal_indices, i)?;
                        check(path, "normal", n, normals.len())?;
                        *corner = corner.with_normal(n);
                    }
                    if has_texcoords && present[k].texcoord {
                        let t = t_base + index_at(path, &m.texcoord_indices, i)?;
                        check(path, "texcoord", t, texcoords.len())?;
                        *corner = corner.with_texcoord(t);
                    }
                }
                faces.push(Face::new(corners));
            }
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Mesh::new(name, positions, faces)
            .with_normals(normals)
            .with_texcoords(texcoords)
            .with_materials(materials, spans))
    }

    /// A texture that fails to load leaves the material untextured.
    fn convert_material(&mut self, base: &Path, mtl: &tobj::Material) -> Material {
        let vec3 = |c: Option<[f32; 3]>, default: Vec3| c.map(Vec3::from).unwrap_or(default);

        let mut material = Material {
            name: mtl.name.clone(),
            diffuse: vec3(mtl.diffuse, Vec3::ONE),
            specular: vec3(mtl.specular, Vec3::ZERO),
            ambient: vec3(mtl.ambient, Vec3::ZERO),
            shininess: mtl.shininess.unwrap_or(0.0),
            opacity: mtl.dissolve.unwrap_or(1.0),
            illumination_model: mtl.illumination_model.unwrap_or(0),
            texture: None,
        };

        if let Some(file) = &mtl.diffuse_texture {
            match self.load_texture(base.join(file)) {
                Ok(texture) => material.texture = Some(texture),
                Err(err) => warn!("material '{}': {}", mtl.name, err),
            }
        }
        material
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CornerAttributes {
    texcoord: bool,
    normal: bool,
}

impl CornerAttributes {
    const ALL: Self = Self {
        texcoord: true,
        normal: true,
    };

    /// Parse one `f` element such as `3`, `3/1`, `3//2` or `3/1/2`.
    fn of(element: &str) -> Self {
        let mut parts = element.split('/').skip(1);
        let texcoord = parts.next().is_some_and(|t| !t.is_empty());
        let normal = parts.next().is_some_and(|n| !n.is_empty());
        Self { texcoord, normal }
    }
}

/// Attribute presence for every triangle in file order, fanned out of each
/// polygon as `(0, i, i + 1)` the way tobj triangulates. Points and lines
/// become degenerate triangles there too.
fn corner_attributes(text: &str) -> Vec<[CornerAttributes; 3]> {
    let mut triangles = Vec::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        if !matches!(tokens.next(), Some("f" | "l")) {
            continue;
        }
        let polygon: Vec<CornerAttributes> = tokens.map(CornerAttributes::of).collect();
        match polygon[..] {
            [] => {}
            [a] => triangles.push([a; 3]),
            [a, b] => triangles.push([a, b, b]),
            _ => {
                for i in 1..polygon.len() - 1 {
                    triangles.push([polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
        }
    }
    triangles
}

fn canonical(path: &Path) -> Result<PathBuf, LoadError> {
    path.canonicalize().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn check(path: &Path, what: &'static str, index: usize, len: usize) -> Result<(), LoadError> {
    if index < len {
        Ok(())
    } else {
        Err(LoadError::IndexOutOfRange {
            path: path.to_path_buf(),
            what,
            index,
            len,
        })
    }
}

/// Per-corner attribute index; the index arrays must run parallel to the
/// position indices.
fn index_at(path: &Path, indices: &[u32], corner: usize) -> Result<usize, LoadError> {
    indices
        .get(corner)
        .map(|i| *i as usize)
        .ok_or(LoadError::IndexOutOfRange {
            path: path.to_path_buf(),
            what: "corner",
            index: corner,
            len: indices.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// A scratch directory unique to one test.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("softscene-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const QUAD: &str = "\
mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 -1 0
usemtl red
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    const QUAD_MTL: &str = "\
newmtl red
Kd 1 0 0
Ks 0.5 0.5 0.5
Ns 10
d 0.5
illum 2
map_Kd checker.png
";

    fn write_quad(dir: &Path, with_mtl: bool) -> PathBuf {
        let obj = dir.join("quad.obj");
        fs::write(&obj, QUAD).unwrap();
        if with_mtl {
            fs::write(dir.join("quad.mtl"), QUAD_MTL).unwrap();
            image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]))
                .save(dir.join("checker.png"))
                .unwrap();
        }
        obj
    }

    #[test]
    fn obj_quad_is_triangulated_with_material() {
        let dir = scratch("quad");
        let obj = write_quad(&dir, true);
        let mut store = AssetStore::new();
        let mesh = store.load_mesh(&obj).unwrap();

        assert_eq!(mesh.name(), "quad");
        assert_eq!(mesh.positions().len(), 4);
        assert_eq!(mesh.faces().len(), 2);
        for face in mesh.faces() {
            assert!(face.vertices.iter().all(|v| v.normal == Some(0)));
            assert!(face.vertices.iter().all(|v| v.texcoord.is_some()));
        }

        assert_eq!(
            mesh.material_spans(),
            &[MaterialSpan {
                face_index: 0,
                material: 0
            }]
        );
        let red = &mesh.materials()[0];
        assert_eq!(red.name, "red");
        assert_eq!(red.diffuse, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(red.opacity, 0.5);
        assert_eq!(red.illumination_model, 2);
        let texture = red.texture.as_ref().unwrap();
        assert_eq!(texture.texel(0, 0), 0xFF00FF00);
        assert_eq!(store.texture_count(), 1);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_mtl_still_loads_geometry() {
        let dir = scratch("no-mtl");
        let obj = write_quad(&dir, false);
        let mesh = AssetStore::new().load_mesh(&obj).unwrap();
        assert_eq!(mesh.faces().len(), 2);
        assert!(mesh.materials().is_empty());
        assert!(mesh.material_spans().is_empty());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn repeated_loads_share_one_mesh() {
        let dir = scratch("shared");
        let obj = write_quad(&dir, true);
        let mut store = AssetStore::new();
        let a = store.load_mesh(&obj).unwrap();
        let b = store.load_mesh(dir.join(".").join("quad.obj")).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(store.mesh_count(), 1);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn purge_releases_meshes_then_their_textures() {
        let dir = scratch("purge");
        let obj = write_quad(&dir, true);
        let mut store = AssetStore::new();

        let mesh = store.load_mesh(&obj).unwrap();
        assert_eq!(store.purge_unused(), 0);

        drop(mesh);
        assert_eq!(store.purge_unused(), 2);
        assert_eq!(store.mesh_count(), 0);
        assert_eq!(store.texture_count(), 0);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn corners_without_attributes_stay_empty() {
        let dir = scratch("mixed");
        let obj = dir.join("mixed.obj");
        fs::write(
            &obj,
            "\
v 0 0 0
v 1 0 0
v 0 0 1
v 1 0 1
vt 0 0
vt 1 0
vt 0 1
vn 0 -1 0
f 1/1/1 2/2/1 3/3/1
f 2 4 3
",
        )
        .unwrap();
        let mesh = AssetStore::new().load_mesh(&obj).unwrap();

        assert_eq!(mesh.faces().len(), 2);
        let [lit, bare] = [&mesh.faces()[0], &mesh.faces()[1]];
        assert!(lit.vertices.iter().all(|v| v.normal == Some(0)));
        assert!(lit.vertices.iter().all(|v| v.texcoord.is_some()));
        assert!(bare.vertices.iter().all(|v| v.normal.is_none()));
        assert!(bare.vertices.iter().all(|v| v.texcoord.is_none()));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn face_elements_report_their_attributes() {
        let all = CornerAttributes::ALL;
        assert_eq!(CornerAttributes::of("3/1/2"), all);
        assert_eq!(CornerAttributes::of("3"), CornerAttributes::default());
        assert!(CornerAttributes::of("3//2").normal);
        assert!(!CornerAttributes::of("3//2").texcoord);
        assert!(CornerAttributes::of("3/1").texcoord);
        assert!(!CornerAttributes::of("3/1").normal);

        let fanned = corner_attributes("v 0 0 0\nf 1/1 2 3 4//1\n");
        assert_eq!(fanned.len(), 2);
        assert!(fanned[0][0].texcoord);
        assert!(fanned[1][2].normal);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AssetStore::new()
            .load_mesh("/definitely/not/here.obj")
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
