use std::ops::BitOr;

use glam::{Quat, Vec3};

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::geometry::vertex_buffer::{VertexAttribute, VertexBuffer};
use crate::scene::mesh::instance_attributes;
use crate::script::codec::encode_matrix;
use crate::script::command::{Command, UpdateMesh};

/// Largest magnitude of a quantized delta; values are centred on zero.
const MAX_QUANTIZED: f32 = i16::MAX as f32;

/// Bit set of the channels carried by an update, serialized as `UpdateFlags`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    /// No channels.
    pub const NONE: Self = Self(0);
    /// Vertex or instance positions.
    pub const POSITIONS: Self = Self(1);
    /// Vertex normals.
    pub const NORMALS: Self = Self(2);
    /// Vertex or instance colors.
    pub const COLORS: Self = Self(4);
    /// Instance rotations.
    pub const ROTATIONS: Self = Self(8);

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn from_attributes(attributes: impl Iterator<Item = VertexAttribute>) -> Self {
        attributes.fold(Self::NONE, |flags, attribute| {
            flags
                | match attribute {
                    VertexAttribute::Position => Self::POSITIONS,
                    VertexAttribute::Normal => Self::NORMALS,
                    VertexAttribute::Color => Self::COLORS,
                    VertexAttribute::Rotation => Self::ROTATIONS,
                    VertexAttribute::Uv => Self::NONE,
                }
        })
    }
}

impl BitOr for UpdateFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// What an update replaces on its base mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    /// Positions plus optional normals and colors.
    Geometry,
    /// Positions only; everything else comes from the base mesh.
    Positions,
    /// Per-instance positions plus optional rotations and colors.
    Instances,
}

/// Fixed-point delta against a keyframe: `value = offset + q * scale`.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantizedDelta {
    /// `frame_index` of the keyframe the delta applies to.
    pub keyframe_index: u32,
    /// Centre of the encoded range.
    pub offset: f32,
    /// Size of one quantization step.
    pub scale: f32,
    /// Row-major quantized values, same shape as the update buffer.
    pub values: Vec<i16>,
}

impl QuantizedDelta {
    /// Dequantized delta values.
    pub fn decode(&self) -> Vec<f32> {
        self.values
            .iter()
            .map(|&q| self.offset + f32::from(q) * self.scale)
            .collect()
    }
}

/// One frame of a base mesh's animation stream.
///
/// The full-precision buffer is always kept, so quantization can be cleared and redone with a
/// different error budget.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshUpdate {
    base_mesh_id: String,
    mesh_id: String,
    frame_index: u32,
    flags: UpdateFlags,
    kind: UpdateKind,
    buffer: VertexBuffer,
    quantized: Option<QuantizedDelta>,
}

impl MeshUpdate {
    fn from_buffer(
        base_mesh_id: String,
        mesh_id: String,
        frame_index: u32,
        kind: UpdateKind,
        buffer: VertexBuffer,
    ) -> Self {
        Self {
            flags: UpdateFlags::from_attributes(buffer.attributes()),
            base_mesh_id,
            mesh_id,
            frame_index,
            kind,
            buffer,
            quantized: None,
        }
    }

    /// Vertex update. Without normals and colors this is a positions-only update.
    pub(crate) fn geometry(
        base_mesh_id: String,
        mesh_id: String,
        frame_index: u32,
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
        colors: Option<&[Color]>,
    ) -> SceneResult<Self> {
        let ctx = format!("update '{mesh_id}' of mesh '{base_mesh_id}'");
        let mut attributes = vec![VertexAttribute::Position];
        if let Some(n) = normals {
            if n.len() != positions.len() {
                return Err(SceneError::shape_mismatch(ctx, positions.len(), n.len()));
            }
            attributes.push(VertexAttribute::Normal);
        }
        if let Some(c) = colors {
            if c.len() != positions.len() {
                return Err(SceneError::shape_mismatch(ctx, positions.len(), c.len()));
            }
            attributes.push(VertexAttribute::Color);
        }

        let mut buffer = VertexBuffer::zeros(&attributes, positions.len())?;
        buffer
            .slice_mut(VertexAttribute::Position)?
            .set_vec3s(positions)?;
        if let Some(n) = normals {
            let unit: Vec<Vec3> = n.iter().map(|v| v.normalize_or_zero()).collect();
            buffer.slice_mut(VertexAttribute::Normal)?.set_vec3s(&unit)?;
        }
        if let Some(c) = colors {
            let flat: Vec<f32> = c.iter().flat_map(|c| c.to_array()).collect();
            buffer
                .slice_mut(VertexAttribute::Color)?
                .copy_from_flat(&flat)?;
        }
        let kind = if normals.is_none() && colors.is_none() {
            UpdateKind::Positions
        } else {
            UpdateKind::Geometry
        };
        Ok(Self::from_buffer(
            base_mesh_id,
            mesh_id,
            frame_index,
            kind,
            buffer,
        ))
    }

    /// Instance update for a mesh with instancing enabled.
    pub(crate) fn instances(
        base_mesh_id: String,
        mesh_id: String,
        frame_index: u32,
        positions: &[Vec3],
        rotations: Option<&[Quat]>,
        colors: Option<&[Color]>,
    ) -> SceneResult<Self> {
        let ctx = format!("instance update '{mesh_id}' of mesh '{base_mesh_id}'");
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
        Ok(Self::from_buffer(
            base_mesh_id,
            mesh_id,
            frame_index,
            UpdateKind::Instances,
            buffer,
        ))
    }

    /// Mesh this update animates.
    pub fn base_mesh_id(&self) -> &str {
        &self.base_mesh_id
    }

    /// Identifier of the update, usable in [`Frame3D::add_mesh`](crate::Frame3D::add_mesh).
    pub fn mesh_id(&self) -> &str {
        &self.mesh_id
    }

    /// Position in the base mesh's update stream.
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Channels carried by the update.
    pub fn flags(&self) -> UpdateFlags {
        self.flags
    }

    /// Geometry, positions-only or instance update.
    pub fn kind(&self) -> UpdateKind {
        self.kind
    }

    /// Full-precision data as supplied by the caller.
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.buffer
    }

    /// Number of vertex (or instance) rows.
    pub fn rows(&self) -> usize {
        self.buffer.rows()
    }

    /// Whether the update is currently encoded as a delta.
    pub fn is_quantized(&self) -> bool {
        self.quantized.is_some()
    }

    /// Quantized payload, if any.
    pub fn quantized(&self) -> Option<&QuantizedDelta> {
        self.quantized.as_ref()
    }

    /// Keyframe the delta refers to, `None` for keyframes and unquantized updates.
    pub fn keyframe_index(&self) -> Option<u32> {
        self.quantized.as_ref().map(|q| q.keyframe_index)
    }

    fn check_shape(&self, other: &VertexBuffer, what: &str) -> SceneResult<()> {
        if other.rows() != self.buffer.rows() {
            return Err(SceneError::shape_mismatch(
                format!("update '{}' of mesh '{}' vs {what}", self.mesh_id, self.base_mesh_id),
                other.rows(),
                self.buffer.rows(),
            ));
        }
        if !other.same_columns(&self.buffer) {
            return Err(SceneError::validation(format!(
                "update '{}' has {} columns, {what} has {}",
                self.mesh_id,
                self.buffer.cols(),
                other.cols()
            )));
        }
        Ok(())
    }

    /// Elementwise `self - keyframe`.
    pub(crate) fn delta(&self, keyframe: &VertexBuffer) -> SceneResult<Vec<f32>> {
        self.check_shape(keyframe, "keyframe")?;
        Ok(self
            .buffer
            .as_slice()
            .iter()
            .zip(keyframe.as_slice())
            .map(|(a, b)| a - b)
            .collect())
    }

    /// Encode the update as a 16-bit delta against `keyframe`.
    ///
    /// `range` fixes the width of the encoded interval (shared-range mode); `None` uses the span of
    /// this delta. Returns `Ok(false)` without touching the payload if the update is already
    /// quantized.
    pub fn quantize(
        &mut self,
        keyframe_index: u32,
        keyframe: &VertexBuffer,
        range: Option<f32>,
    ) -> SceneResult<bool> {
        if self.quantized.is_some() {
            return Ok(false);
        }
        let delta = self.delta(keyframe)?;
        let (min, max) = span_of(&delta);
        let span = max - min;
        let range = range.unwrap_or(span);
        if range < span {
            return Err(SceneError::out_of_range(format!(
                "update '{}' delta span {span} exceeds the encodable range {range}",
                self.mesh_id
            )));
        }

        let offset = 0.5 * (min + max);
        let scale = if range > 0.0 {
            range / (2.0 * MAX_QUANTIZED)
        } else {
            0.0
        };
        let values = delta
            .iter()
            .map(|&d| {
                if scale > 0.0 {
                    ((d - offset) / scale)
                        .round()
                        .clamp(-MAX_QUANTIZED, MAX_QUANTIZED) as i16
                } else {
                    0
                }
            })
            .collect();
        self.quantized = Some(QuantizedDelta {
            keyframe_index,
            offset,
            scale,
            values,
        });
        Ok(true)
    }

    /// Drop the quantized payload; the update becomes full precision again.
    pub(crate) fn clear_quantization(&mut self) {
        self.quantized = None;
    }

    /// Dequantized delta, if the update is quantized.
    pub fn unquantize(&self) -> Option<Vec<f32>> {
        self.quantized.as_ref().map(QuantizedDelta::decode)
    }

    /// Buffer as the viewer will see it: `keyframe + delta` for quantized updates, the
    /// full-precision buffer otherwise.
    pub fn reconstruct(&self, keyframe: &VertexBuffer) -> SceneResult<VertexBuffer> {
        let Some(delta) = self.unquantize() else {
            return Ok(self.buffer.clone());
        };
        self.check_shape(keyframe, "keyframe")?;
        let data = keyframe
            .as_slice()
            .iter()
            .zip(delta)
            .map(|(k, d)| k + d)
            .collect();
        self.buffer.with_data(data)
    }

    /// Largest absolute elementwise difference between the reconstructed buffer (see
    /// [`MeshUpdate::reconstruct`]) and `reference`.
    pub fn difference_range(
        &self,
        keyframe: &VertexBuffer,
        reference: &VertexBuffer,
    ) -> SceneResult<f32> {
        self.check_shape(reference, "reference")?;
        let rebuilt = self.reconstruct(keyframe)?;
        Ok(max_abs_difference(rebuilt.as_slice(), reference.as_slice()))
    }

    /// Largest absolute elementwise difference between the full-precision buffer and
    /// `reference`, ignoring any quantization.
    pub fn full_precision_difference(&self, reference: &VertexBuffer) -> SceneResult<f32> {
        self.check_shape(reference, "reference")?;
        Ok(max_abs_difference(self.buffer.as_slice(), reference.as_slice()))
    }

    pub(crate) fn to_command(&self) -> SceneResult<Command> {
        let cols = self.buffer.cols();
        let mut cmd = UpdateMesh {
            base_mesh_id: self.base_mesh_id.clone(),
            mesh_id: self.mesh_id.clone(),
            frame_index: self.frame_index,
            update_flags: self.flags.bits(),
            vertex_buffer: None,
            keyframe_index: None,
            offset: None,
            scale: None,
            quantized_buffer: None,
        };
        match &self.quantized {
            Some(q) => {
                cmd.keyframe_index = Some(q.keyframe_index);
                cmd.offset = Some(q.offset);
                cmd.scale = Some(q.scale);
                cmd.quantized_buffer = Some(encode_matrix(&q.values, cols)?);
            }
            None => cmd.vertex_buffer = Some(encode_matrix(self.buffer.as_slice(), cols)?),
        }
        Ok(Command::UpdateMesh(cmd))
    }
}

/// `(min, max)` of `values`, `(0, 0)` when empty.
pub(crate) fn span_of(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

pub(crate) fn max_abs_difference(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mesh_update.rs"]
mod tests;
