use std::collections::HashSet;

use glam::{Mat4, Quat, Vec3};

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::normal_matrix;
use crate::geometry::vertex_buffer::{VertexAttribute, VertexBuffer, VertexLayout};
use crate::script::codec::encode_matrix;
use crate::script::command::{Command, DefineMesh, IndexBufferType, MeshDefinition, PrimitiveType};

/// Named triangle/line geometry resource.
///
/// The packed vertex layout follows from the color/texture settings, which therefore have to be
/// chosen before any geometry is added:
///
/// - a texture id gives [`VertexLayout::Textured`] (position, normal, uv),
/// - a shared color gives [`VertexLayout::Plain`] (position, normal),
/// - otherwise colors are stored per vertex in [`VertexLayout::Colored`].
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub(crate) mesh_id: String,
    layer_id: Option<String>,
    shared_color: Option<Color>,
    texture_id: Option<String>,
    double_sided: bool,
    camera_space: bool,
    is_billboard: bool,
    is_label: bool,
    nn_texture: bool,
    use_texture_alpha: bool,
    pub(crate) vertices: VertexBuffer,
    pub(crate) triangles: Vec<[u32; 3]>,
    pub(crate) lines: Vec<[u32; 2]>,
    instances: Option<VertexBuffer>,
}

impl Mesh {
    /// Empty per-vertex-colored mesh.
    pub fn new(mesh_id: impl Into<String>) -> Self {
        Self {
            mesh_id: mesh_id.into(),
            layer_id: None,
            shared_color: None,
            texture_id: None,
            double_sided: false,
            camera_space: false,
            is_billboard: false,
            is_label: false,
            nn_texture: true,
            use_texture_alpha: false,
            vertices: VertexBuffer::with_layout(VertexLayout::Colored),
            triangles: Vec::new(),
            lines: Vec::new(),
            instances: None,
        }
    }

    fn relayout(&mut self) -> SceneResult<()> {
        if !self.vertices.is_empty() {
            return Err(SceneError::invalid_state(format!(
                "mesh '{}' already has geometry; set color and texture before adding primitives",
                self.mesh_id
            )));
        }
        let layout = if self.texture_id.is_some() {
            VertexLayout::Textured
        } else if self.shared_color.is_some() {
            VertexLayout::Plain
        } else {
            VertexLayout::Colored
        };
        self.vertices = VertexBuffer::with_layout(layout);
        Ok(())
    }

    /// One color for the whole mesh.
    pub fn with_shared_color(mut self, color: Color) -> SceneResult<Self> {
        self.shared_color = Some(color);
        self.relayout()?;
        Ok(self)
    }

    /// Texture the mesh with a defined image.
    pub fn with_texture(mut self, texture_id: impl Into<String>) -> SceneResult<Self> {
        self.texture_id = Some(texture_id.into());
        self.relayout()?;
        Ok(self)
    }

    /// Layer tag.
    pub fn with_layer(mut self, layer_id: impl Into<String>) -> Self {
        let layer_id = layer_id.into();
        self.layer_id = (!layer_id.is_empty()).then_some(layer_id);
        self
    }

    /// Render back faces.
    pub fn double_sided(mut self, value: bool) -> Self {
        self.double_sided = value;
        self
    }

    /// Interpret coordinates in camera space.
    pub fn camera_space(mut self, value: bool) -> Self {
        self.camera_space = value;
        self
    }

    /// Always face the camera.
    pub fn billboard(mut self, value: bool) -> Self {
        self.is_billboard = value;
        self
    }

    /// Nearest-neighbour texture sampling.
    pub fn nn_texture(mut self, value: bool) -> Self {
        self.nn_texture = value;
        self
    }

    /// Blend with the texture alpha channel.
    pub fn use_texture_alpha(mut self, value: bool) -> Self {
        self.use_texture_alpha = value;
        self
    }

    pub(crate) fn label(mut self, value: bool) -> Self {
        self.is_label = value;
        self
    }

    /// Identifier.
    pub fn mesh_id(&self) -> &str {
        &self.mesh_id
    }

    /// Layer tag.
    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }

    /// Shared color, if any.
    pub fn shared_color(&self) -> Option<Color> {
        self.shared_color
    }

    /// Texture image id, if any.
    pub fn texture_id(&self) -> Option<&str> {
        self.texture_id.as_deref()
    }

    /// Packed layout of the vertex buffer.
    pub fn layout(&self) -> VertexLayout {
        self.vertices.layout().unwrap_or(VertexLayout::Colored)
    }

    /// Vertex buffer.
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.rows()
    }

    /// Triangle index buffer.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Line index buffer.
    pub fn lines(&self) -> &[[u32; 2]] {
        &self.lines
    }

    /// Whether [`Mesh::enable_instancing`] was called.
    pub fn is_instanced(&self) -> bool {
        self.instances.is_some()
    }

    /// Per-instance buffer (position, optional rotation, optional color).
    pub fn instance_buffer(&self) -> Option<&VertexBuffer> {
        self.instances.as_ref()
    }

    /// Number of instances, if instanced.
    pub fn instance_count(&self) -> Option<usize> {
        self.instances.as_ref().map(VertexBuffer::rows)
    }

    /// Vertex positions.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices
            .slice(VertexAttribute::Position)
            .map(|v| v.to_vec3s())
            .unwrap_or_default()
    }

    /// Empty mesh with the same layout and flags, used to assemble a primitive.
    pub(crate) fn scratch(&self) -> Mesh {
        Mesh {
            mesh_id: String::new(),
            layer_id: None,
            shared_color: self.shared_color,
            texture_id: self.texture_id.clone(),
            double_sided: self.double_sided,
            camera_space: self.camera_space,
            is_billboard: self.is_billboard,
            is_label: self.is_label,
            nn_texture: self.nn_texture,
            use_texture_alpha: self.use_texture_alpha,
            vertices: VertexBuffer::with_layout(self.layout()),
            triangles: Vec::new(),
            lines: Vec::new(),
            instances: None,
        }
    }

    /// Color written into per-vertex-colored layouts.
    pub(crate) fn vertex_color(&self, color: Option<Color>) -> SceneResult<Color> {
        match (self.layout(), color) {
            (VertexLayout::Colored, None) => Err(SceneError::validation(format!(
                "mesh '{}' stores per-vertex colors; pass a color",
                self.mesh_id
            ))),
            (_, Some(c)) => Ok(c),
            (_, None) => Ok(self.shared_color.unwrap_or_default()),
        }
    }

    /// Append one vertex. Normals are normalized; `color`/`uv` are written only when the layout
    /// has room for them.
    pub(crate) fn push_vertex(&mut self, position: Vec3, normal: Vec3, color: Color, uv: [f32; 2]) -> u32 {
        let index = self.vertices.rows() as u32;
        let n = normal.normalize_or_zero();
        let mut row = [0.0f32; 9];
        row[..3].copy_from_slice(&position.to_array());
        row[3..6].copy_from_slice(&n.to_array());
        let cols = match self.layout() {
            VertexLayout::Plain => 6,
            VertexLayout::Colored => {
                row[6..9].copy_from_slice(&color.to_array());
                9
            }
            VertexLayout::Textured => {
                row[6..8].copy_from_slice(&uv);
                8
            }
        };
        // The row width always matches the layout's column count.
        let _ = self.vertices.push_row(&row[..cols]);
        index
    }

    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.push([a, b, c]);
    }

    pub(crate) fn push_line(&mut self, a: u32, b: u32) {
        self.lines.push([a, b]);
    }

    /// Append the geometry of `other`, which must share this mesh's layout.
    pub fn append_mesh(&mut self, other: &Mesh) -> SceneResult<()> {
        self.check_not_instanced("append geometry")?;
        if other.layout() != self.layout() {
            return Err(SceneError::validation(format!(
                "cannot append a {:?} mesh to '{}' ({:?})",
                other.layout(),
                self.mesh_id,
                self.layout()
            )));
        }
        let offset = self.vertices.rows() as u32;
        self.vertices.append(&other.vertices)?;
        self.triangles
            .extend(other.triangles.iter().map(|t| t.map(|i| i + offset)));
        self.lines
            .extend(other.lines.iter().map(|l| l.map(|i| i + offset)));
        Ok(())
    }

    /// Transform positions and normals in place.
    pub fn apply_transform(&mut self, transform: Mat4) {
        if transform == Mat4::IDENTITY {
            return;
        }
        let normals = normal_matrix(transform);
        if let Ok(mut pos) = self.vertices.slice_mut(VertexAttribute::Position) {
            for p in pos.iter_mut() {
                let v = transform.transform_point3(Vec3::new(p[0], p[1], p[2]));
                p.copy_from_slice(&v.to_array());
            }
        }
        if let Ok(mut nrm) = self.vertices.slice_mut(VertexAttribute::Normal) {
            for n in nrm.iter_mut() {
                let v = (normals * Vec3::new(n[0], n[1], n[2])).normalize_or_zero();
                n.copy_from_slice(&v.to_array());
            }
        }
    }

    /// Rotate positions and normals in place.
    pub fn apply_rotation(&mut self, rotation: Quat) {
        self.apply_transform(Mat4::from_quat(rotation));
    }

    /// Flip the winding of every triangle.
    pub fn reverse_triangle_order(&mut self) {
        for t in &mut self.triangles {
            t.swap(1, 2);
        }
    }

    /// Mean vertex position, origin for an empty mesh.
    pub fn center_of_mass(&self) -> Vec3 {
        let positions = self.positions();
        if positions.is_empty() {
            return Vec3::ZERO;
        }
        positions.iter().copied().sum::<Vec3>() / positions.len() as f32
    }

    /// Recompute area-weighted vertex normals from the triangles.
    pub fn compute_normals(&mut self) {
        let normals = area_weighted_normals(&self.positions(), &self.triangles);
        if let Ok(mut view) = self.vertices.slice_mut(VertexAttribute::Normal) {
            // Same row count by construction.
            let _ = view.set_vec3s(&normals);
        }
    }

    /// Add one line per unique triangle edge.
    pub fn add_wireframe(&mut self) {
        let mut seen: HashSet<(u32, u32)> = self.lines.iter().map(|&[a, b]| (a.min(b), a.max(b))).collect();
        let mut new_lines = Vec::new();
        for &[a, b, c] in &self.triangles {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                if seen.insert((u.min(v), u.max(v))) {
                    new_lines.push([u, v]);
                }
            }
        }
        self.lines.extend(new_lines);
    }

    /// Append raw geometry with explicit normals.
    ///
    /// `colors` are required for per-vertex-colored meshes and `uvs` for textured ones.
    #[allow(clippy::too_many_arguments)]
    pub fn add_mesh_with_normals(
        &mut self,
        vertices: &[Vec3],
        normals: &[Vec3],
        triangles: &[[u32; 3]],
        colors: Option<&[Color]>,
        uvs: Option<&[[f32; 2]]>,
        transform: Mat4,
    ) -> SceneResult<()> {
        self.check_not_instanced("add geometry")?;
        let ctx = format!("mesh '{}' geometry", self.mesh_id);
        if normals.len() != vertices.len() {
            return Err(SceneError::shape_mismatch(ctx, vertices.len(), normals.len()));
        }
        if let Some(c) = colors
            && c.len() != vertices.len()
        {
            return Err(SceneError::shape_mismatch(ctx, vertices.len(), c.len()));
        }
        if let Some(u) = uvs
            && u.len() != vertices.len()
        {
            return Err(SceneError::shape_mismatch(ctx, vertices.len(), u.len()));
        }
        if let Some(bad) = triangles
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertices.len())
        {
            return Err(SceneError::validation(format!(
                "{ctx}: triangle index {bad} out of bounds for {} vertices",
                vertices.len()
            )));
        }
        match self.layout() {
            VertexLayout::Colored if colors.is_none() => {
                return Err(SceneError::validation(format!(
                    "{ctx}: per-vertex colors are required"
                )));
            }
            VertexLayout::Textured if uvs.is_none() => {
                return Err(SceneError::validation(format!("{ctx}: uvs are required")));
            }
            _ => {}
        }

        let mut part = self.scratch();
        for (i, (&p, &n)) in vertices.iter().zip(normals).enumerate() {
            let color = colors
                .map(|c| c[i])
                .or(self.shared_color)
                .unwrap_or_default();
            let uv = uvs.map(|u| u[i]).unwrap_or([0.0, 0.0]);
            part.push_vertex(p, n, color, uv);
        }
        part.triangles.extend_from_slice(triangles);
        part.apply_transform(transform);
        self.append_mesh(&part)
    }

    /// Append raw geometry; normals are computed from the triangles.
    pub fn add_mesh_without_normals(
        &mut self,
        vertices: &[Vec3],
        triangles: &[[u32; 3]],
        colors: Option<&[Color]>,
        uvs: Option<&[[f32; 2]]>,
        transform: Mat4,
    ) -> SceneResult<()> {
        if let Some(bad) = triangles
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertices.len())
        {
            return Err(SceneError::validation(format!(
                "mesh '{}' geometry: triangle index {bad} out of bounds for {} vertices",
                self.mesh_id,
                vertices.len()
            )));
        }
        let normals = area_weighted_normals(vertices, triangles);
        self.add_mesh_with_normals(vertices, &normals, triangles, colors, uvs, transform)
    }

    /// Replicate the mesh once per position, optionally rotated and recolored per instance.
    /// Replaces any previous instance buffer.
    pub fn enable_instancing(
        &mut self,
        positions: &[Vec3],
        rotations: Option<&[Quat]>,
        colors: Option<&[Color]>,
    ) -> SceneResult<()> {
        let ctx = format!("mesh '{}' instances", self.mesh_id);
        if let Some(r) = rotations
            && r.len() != positions.len()
        {
            return Err(SceneError::shape_mismatch(ctx, positions.len(), r.len()));
        }
        if let Some(c) = colors
            && c.len() != positions.len()
        {
            return Err(SceneError::shape_mismatch(ctx, positions.len(), c.len()));
        }
        if self.instances.is_some() {
            tracing::warn!(mesh_id = %self.mesh_id, "enable_instancing replaces the existing instance buffer");
        }

        let attributes = instance_attributes(rotations.is_some(), colors.is_some());
        let mut buffer = VertexBuffer::zeros(&attributes, positions.len())?;
        buffer
            .slice_mut(VertexAttribute::Position)?
            .set_vec3s(positions)?;
        if let Some(r) = rotations {
            buffer.slice_mut(VertexAttribute::Rotation)?.set_quats(r)?;
        }
        if let Some(c) = colors {
            let flat: Vec<f32> = c.iter().flat_map(|c| c.to_array()).collect();
            buffer
                .slice_mut(VertexAttribute::Color)?
                .copy_from_flat(&flat)?;
        }
        self.instances = Some(buffer);
        Ok(())
    }

    /// Switch a shared-color mesh to the per-vertex-colored layout, filling in the shared color.
    pub(crate) fn convert_to_vertex_colors(&mut self) -> SceneResult<()> {
        match self.layout() {
            VertexLayout::Colored => Ok(()),
            VertexLayout::Textured => Err(SceneError::validation(format!(
                "textured mesh '{}' cannot store per-vertex colors",
                self.mesh_id
            ))),
            VertexLayout::Plain => {
                tracing::warn!(mesh_id = %self.mesh_id, "converting shared-color mesh to per-vertex colors");
                let color = self.shared_color.take().unwrap_or_default().to_array();
                let mut colored = VertexBuffer::with_layout(VertexLayout::Colored);
                for row in self.vertices.as_slice().chunks_exact(VertexLayout::Plain.cols()) {
                    let mut packed = [0.0f32; 9];
                    packed[..6].copy_from_slice(row);
                    packed[6..].copy_from_slice(&color);
                    colored.push_row(&packed)?;
                }
                self.vertices = colored;
                Ok(())
            }
        }
    }

    pub(crate) fn check_not_instanced(&self, action: &str) -> SceneResult<()> {
        if self.instances.is_some() {
            return Err(SceneError::invalid_state(format!(
                "cannot {action} on mesh '{}' after enable_instancing",
                self.mesh_id
            )));
        }
        Ok(())
    }

    pub(crate) fn to_command(&self) -> SceneResult<Command> {
        let index_type = IndexBufferType::for_vertex_count(self.vertices.rows());
        let flat_tris: Vec<u32> = self.triangles.iter().flatten().copied().collect();
        let flat_lines: Vec<u32> = self.lines.iter().flatten().copied().collect();
        let (triangle_buffer, line_buffer) = match index_type {
            IndexBufferType::UInt16 => (
                encode_matrix(&narrow(&flat_tris), 3)?,
                encode_matrix(&narrow(&flat_lines), 2)?,
            ),
            IndexBufferType::UInt32 => (
                encode_matrix(&flat_tris, 3)?,
                encode_matrix(&flat_lines, 2)?,
            ),
        };
        let primitive_type = match self.layout() {
            VertexLayout::Plain => PrimitiveType::SingleColorMesh,
            VertexLayout::Colored => PrimitiveType::MultiColorMesh,
            VertexLayout::Textured => PrimitiveType::TexturedMesh,
        };
        let instance_buffer = self
            .instances
            .as_ref()
            .map(|b| encode_matrix(b.as_slice(), b.cols()))
            .transpose()?;
        Ok(Command::DefineMesh(DefineMesh {
            mesh_id: self.mesh_id.clone(),
            layer_id: self.layer_id.clone(),
            double_sided: self.double_sided,
            camera_space: self.camera_space,
            is_billboard: self.is_billboard,
            is_label: self.is_label,
            definition: MeshDefinition {
                vertex_buffer: encode_matrix(self.vertices.as_slice(), self.vertices.cols())?,
                index_buffer_type: index_type,
                triangle_buffer,
                line_buffer,
                primitive_type,
                color: self.shared_color.map(Color::to_html_hex),
                texture_id: self.texture_id.clone(),
                nearest_neighbor_texture: self.nn_texture,
                use_texture_alpha: self.use_texture_alpha,
                instance_buffer,
                instance_buffer_has_rotations: self
                    .instances
                    .as_ref()
                    .is_some_and(|b| b.has(VertexAttribute::Rotation)),
                instance_buffer_has_colors: self
                    .instances
                    .as_ref()
                    .is_some_and(|b| b.has(VertexAttribute::Color)),
            },
        }))
    }
}

/// Column set of an instance buffer.
pub(crate) fn instance_attributes(rotations: bool, colors: bool) -> Vec<VertexAttribute> {
    let mut attributes = vec![VertexAttribute::Position];
    if rotations {
        attributes.push(VertexAttribute::Rotation);
    }
    if colors {
        attributes.push(VertexAttribute::Color);
    }
    attributes
}

fn narrow(indices: &[u32]) -> Vec<u16> {
    indices.iter().map(|&i| i as u16).collect()
}

/// Per-vertex normals summed from unnormalized face normals (so larger faces weigh more).
pub(crate) fn area_weighted_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for &[a, b, c] in triangles {
        let (pa, pb, pc) = (
            positions[a as usize],
            positions[b as usize],
            positions[c as usize],
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a as usize] += face;
        normals[b as usize] += face;
        normals[c as usize] += face;
    }
    normals.iter().map(|n| n.normalize_or_zero()).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mesh.rs"]
mod tests;
