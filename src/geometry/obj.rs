//! Wavefront OBJ import.
//!
//! Faces must be triangles or quads; quads split along their `0-2` diagonal. Every object and
//! group in the file is merged into one [`MeshData`], with one vertex per distinct
//! position/uv/normal index triple.

use std::io::BufRead;
use std::path::Path;

use anyhow::Context as _;
use glam::{Mat4, Vec3};

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::scene::mesh::Mesh;

#[derive(Clone, Debug, Default, PartialEq)]
/// Indexed triangle geometry read from a file.
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex normals, when every face in the file carries them.
    pub normals: Option<Vec<Vec3>>,
    /// Per-vertex texture coordinates, when every face in the file carries them.
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Triangles as vertex index triples.
    pub triangles: Vec<[u32; 3]>,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Read an OBJ file. Materials are ignored.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_obj(path: impl AsRef<Path>) -> SceneResult<MeshData> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())
        .with_context(|| format!("load OBJ '{}'", path.display()))?;
    let data = merge_models(&models)?;
    tracing::debug!(
        vertices = data.vertex_count(),
        triangles = data.triangles.len(),
        "loaded OBJ"
    );
    Ok(data)
}

/// Parse OBJ text from a reader. `mtllib` references are not followed.
pub fn parse_obj(reader: &mut impl BufRead) -> SceneResult<MeshData> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
            .context("parse OBJ")?;
    merge_models(&models)
}

fn face_triangles(model: &tobj::Model, offset: u32, out: &mut Vec<[u32; 3]>) -> SceneResult<()> {
    let mesh = &model.mesh;
    let shifted = |i: u32| i + offset;
    if mesh.face_arities.is_empty() {
        if mesh.indices.len() % 3 != 0 {
            return Err(SceneError::validation(format!(
                "OBJ object '{}' has {} triangle indices",
                model.name,
                mesh.indices.len()
            )));
        }
        out.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|t| [shifted(t[0]), shifted(t[1]), shifted(t[2])]),
        );
        return Ok(());
    }

    let mut start = 0usize;
    for &arity in &mesh.face_arities {
        let end = start + arity as usize;
        let Some(face) = mesh.indices.get(start..end) else {
            return Err(SceneError::validation(format!(
                "OBJ object '{}' face indices end early",
                model.name
            )));
        };
        match *face {
            [a, b, c] => out.push([shifted(a), shifted(b), shifted(c)]),
            [a, b, c, d] => {
                out.push([shifted(a), shifted(b), shifted(c)]);
                out.push([shifted(c), shifted(d), shifted(a)]);
            }
            _ => {
                return Err(SceneError::validation(format!(
                    "OBJ object '{}' has a {arity}-sided face; only triangles and quads are supported",
                    model.name
                )));
            }
        }
        start = end;
    }
    Ok(())
}

fn vec3s(flat: &[f32]) -> Vec<Vec3> {
    flat.chunks_exact(3)
        .map(|v| Vec3::new(v[0], v[1], v[2]))
        .collect()
}

fn merge_models(models: &[tobj::Model]) -> SceneResult<MeshData> {
    let mut data = MeshData::default();
    let mut normals = Some(Vec::new());
    let mut uvs = Some(Vec::new());
    for model in models {
        let mesh = &model.mesh;
        let offset = u32::try_from(data.positions.len())
            .map_err(|_| SceneError::out_of_range("OBJ has more than u32::MAX vertices"))?;
        let count = mesh.positions.len() / 3;
        face_triangles(model, offset, &mut data.triangles)?;
        data.positions.extend(vec3s(&mesh.positions));

        normals = normals
            .take()
            .filter(|_| mesh.normals.len() == 3 * count)
            .map(|mut n: Vec<Vec3>| {
                n.extend(vec3s(&mesh.normals));
                n
            });
        uvs = uvs
            .take()
            .filter(|_| mesh.texcoords.len() == 2 * count)
            .map(|mut u: Vec<[f32; 2]>| {
                u.extend(mesh.texcoords.chunks_exact(2).map(|t| [t[0], t[1]]));
                u
            });
    }
    if data.positions.is_empty() {
        return Err(SceneError::validation("OBJ contains no faces"));
    }
    data.normals = normals;
    data.uvs = uvs;
    Ok(data)
}

impl Mesh {
    /// Append imported geometry. File normals are used when present, otherwise normals are
    /// computed from the triangles.
    pub fn add_mesh_data(
        &mut self,
        data: &MeshData,
        colors: Option<&[Color]>,
        transform: Mat4,
    ) -> SceneResult<()> {
        match &data.normals {
            Some(normals) => self.add_mesh_with_normals(
                &data.positions,
                normals,
                &data.triangles,
                colors,
                data.uvs.as_deref(),
                transform,
            ),
            None => self.add_mesh_without_normals(
                &data.positions,
                &data.triangles,
                colors,
                data.uvs.as_deref(),
                transform,
            ),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/obj.rs"]
mod tests;
