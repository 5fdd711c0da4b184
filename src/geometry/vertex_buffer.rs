use glam::{Quat, Vec3};

use crate::foundation::error::{SceneError, SceneResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
/// Named column range of a vertex buffer.
pub enum VertexAttribute {
    /// `xyz` position.
    Position,
    /// `xyz` normal.
    Normal,
    /// `rgb` color.
    Color,
    /// `uv` texture coordinate. Shares the color columns in packed mesh layouts.
    Uv,
    /// `xyzw` rotation quaternion (instance buffers only).
    Rotation,
}

impl VertexAttribute {
    /// Number of columns occupied by the attribute.
    pub const fn width(self) -> usize {
        match self {
            Self::Position | Self::Normal | Self::Color => 3,
            Self::Uv => 2,
            Self::Rotation => 4,
        }
    }

    /// Lowercase name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::Color => "color",
            Self::Uv => "uv",
            Self::Rotation => "rotation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Packed per-vertex layouts used by mesh vertex buffers.
pub enum VertexLayout {
    /// Position + normal. Meshes with a shared color.
    Plain,
    /// Position + normal + color.
    Colored,
    /// Position + normal + uv.
    Textured,
}

impl VertexLayout {
    /// Attributes in column order.
    pub const fn attributes(self) -> &'static [VertexAttribute] {
        match self {
            Self::Plain => &[VertexAttribute::Position, VertexAttribute::Normal],
            Self::Colored => &[
                VertexAttribute::Position,
                VertexAttribute::Normal,
                VertexAttribute::Color,
            ],
            Self::Textured => &[
                VertexAttribute::Position,
                VertexAttribute::Normal,
                VertexAttribute::Uv,
            ],
        }
    }

    /// Total column count.
    pub const fn cols(self) -> usize {
        match self {
            Self::Plain => 6,
            Self::Colored => 9,
            Self::Textured => 8,
        }
    }

    /// Infer the layout of a packed buffer from its column count.
    pub fn from_cols(cols: usize) -> SceneResult<Self> {
        match cols {
            6 => Ok(Self::Plain),
            8 => Ok(Self::Textured),
            9 => Ok(Self::Colored),
            c if c < 6 => Err(SceneError::out_of_range(format!(
                "packed vertex buffers need at least 6 columns, got {c}"
            ))),
            c => Err(SceneError::out_of_range(format!(
                "no packed vertex layout has {c} columns (expected 6, 8 or 9)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    attribute: VertexAttribute,
    offset: usize,
}

/// Row-major `f32` block of per-vertex attributes.
///
/// The column map is fixed at construction; asking for an attribute the buffer does not carry
/// fails with [`SceneError::OutOfRange`]. Cloning (or [`VertexBuffer::copy`]) is the only way to
/// share contents between two buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexBuffer {
    data: Vec<f32>,
    cols: usize,
    slots: Vec<Slot>,
}

impl VertexBuffer {
    /// Empty buffer with the given attribute columns, in order.
    pub fn new(attributes: &[VertexAttribute]) -> SceneResult<Self> {
        if attributes.is_empty() {
            return Err(SceneError::validation(
                "vertex buffer needs at least one attribute",
            ));
        }
        let mut slots = Vec::with_capacity(attributes.len());
        let mut offset = 0;
        for &attribute in attributes {
            if slots.iter().any(|s: &Slot| s.attribute == attribute) {
                return Err(SceneError::validation(format!(
                    "vertex attribute '{}' listed twice",
                    attribute.name()
                )));
            }
            slots.push(Slot { attribute, offset });
            offset += attribute.width();
        }
        if attributes.contains(&VertexAttribute::Color) && attributes.contains(&VertexAttribute::Uv)
        {
            return Err(SceneError::validation(
                "color and uv share columns and cannot both be present",
            ));
        }
        Ok(Self {
            data: Vec::new(),
            cols: offset,
            slots,
        })
    }

    /// Empty buffer in a packed mesh layout.
    pub fn with_layout(layout: VertexLayout) -> Self {
        let mut slots = Vec::with_capacity(3);
        let mut offset = 0;
        for &attribute in layout.attributes() {
            slots.push(Slot { attribute, offset });
            offset += attribute.width();
        }
        Self {
            data: Vec::new(),
            cols: offset,
            slots,
        }
    }

    /// Wrap packed mesh data of shape `(N, cols)` with `cols >= 6`.
    pub fn from_packed(data: Vec<f32>, cols: usize) -> SceneResult<Self> {
        let mut out = Self::with_layout(VertexLayout::from_cols(cols)?);
        out.set_data(data)?;
        Ok(out)
    }

    /// Buffer with the given attributes over existing row-major data.
    pub fn from_rows(attributes: &[VertexAttribute], data: Vec<f32>) -> SceneResult<Self> {
        let mut out = Self::new(attributes)?;
        out.set_data(data)?;
        Ok(out)
    }

    /// `rows` zero-filled rows.
    pub fn zeros(attributes: &[VertexAttribute], rows: usize) -> SceneResult<Self> {
        let mut out = Self::new(attributes)?;
        out.data = vec![0.0; rows * out.cols];
        Ok(out)
    }

    /// New buffer with this buffer's column map over `data`.
    pub fn with_data(&self, data: Vec<f32>) -> SceneResult<Self> {
        let mut out = Self {
            data: Vec::new(),
            cols: self.cols,
            slots: self.slots.clone(),
        };
        out.set_data(data)?;
        Ok(out)
    }

    fn set_data(&mut self, data: Vec<f32>) -> SceneResult<()> {
        if data.len() % self.cols != 0 {
            return Err(SceneError::validation(format!(
                "vertex data length {} is not a multiple of {} columns",
                data.len(),
                self.cols
            )));
        }
        self.data = data;
        Ok(())
    }

    /// Number of vertices.
    pub fn rows(&self) -> usize {
        self.data.len() / self.cols
    }

    /// Number of `f32` columns per vertex.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `true` when the buffer has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Attributes in column order.
    pub fn attributes(&self) -> impl Iterator<Item = VertexAttribute> + '_ {
        self.slots.iter().map(|s| s.attribute)
    }

    /// Whether the buffer carries `attribute`.
    pub fn has(&self, attribute: VertexAttribute) -> bool {
        self.slots.iter().any(|s| s.attribute == attribute)
    }

    /// Packed mesh layout, if the column map matches one.
    pub fn layout(&self) -> Option<VertexLayout> {
        [
            VertexLayout::Plain,
            VertexLayout::Colored,
            VertexLayout::Textured,
        ]
        .into_iter()
        .find(|layout| {
            layout.attributes().len() == self.slots.len()
                && layout
                    .attributes()
                    .iter()
                    .zip(&self.slots)
                    .all(|(a, s)| *a == s.attribute)
        })
    }

    /// Whether `other` has the same column map.
    pub fn same_columns(&self, other: &VertexBuffer) -> bool {
        self.cols == other.cols && self.slots == other.slots
    }

    /// First column of `attribute`.
    pub fn column_offset(&self, attribute: VertexAttribute) -> SceneResult<usize> {
        self.slots
            .iter()
            .find(|s| s.attribute == attribute)
            .map(|s| s.offset)
            .ok_or_else(|| {
                SceneError::out_of_range(format!(
                    "vertex buffer has no {} columns ({} columns: {})",
                    attribute.name(),
                    self.cols,
                    self.slots
                        .iter()
                        .map(|s| s.attribute.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    /// Raw row-major data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable raw row-major data.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume into the raw row-major data.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// One vertex row.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.data.chunks_exact(self.cols).nth(index)
    }

    /// One mutable vertex row.
    pub fn row_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.data.chunks_exact_mut(self.cols).nth(index)
    }

    /// Append one row; `values` must hold exactly `cols()` entries.
    pub fn push_row(&mut self, values: &[f32]) -> SceneResult<()> {
        if values.len() != self.cols {
            return Err(SceneError::validation(format!(
                "vertex row has {} values, buffer has {} columns",
                values.len(),
                self.cols
            )));
        }
        self.data.extend_from_slice(values);
        Ok(())
    }

    /// Append all rows of `other`, which must share the column map.
    pub fn append(&mut self, other: &VertexBuffer) -> SceneResult<()> {
        if !self.same_columns(other) {
            return Err(SceneError::validation(format!(
                "cannot append a {}-column buffer to a {}-column buffer with a different layout",
                other.cols, self.cols
            )));
        }
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    /// Smallest coefficient, `0` for an empty buffer.
    pub fn min_coeff(&self) -> f32 {
        self.data.iter().copied().reduce(f32::min).unwrap_or(0.0)
    }

    /// Largest coefficient, `0` for an empty buffer.
    pub fn max_coeff(&self) -> f32 {
        self.data.iter().copied().reduce(f32::max).unwrap_or(0.0)
    }

    /// `max_coeff() - min_coeff()`.
    pub fn coefficient_range(&self) -> f32 {
        self.max_coeff() - self.min_coeff()
    }

    /// Independent deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Read view over one attribute's columns.
    pub fn slice(&self, attribute: VertexAttribute) -> SceneResult<AttributeView<'_>> {
        let offset = self.column_offset(attribute)?;
        Ok(AttributeView {
            data: &self.data,
            cols: self.cols,
            offset,
            width: attribute.width(),
        })
    }

    /// Write view over one attribute's columns; writes land in this buffer.
    pub fn slice_mut(&mut self, attribute: VertexAttribute) -> SceneResult<AttributeViewMut<'_>> {
        let offset = self.column_offset(attribute)?;
        Ok(AttributeViewMut {
            data: &mut self.data,
            cols: self.cols,
            offset,
            width: attribute.width(),
        })
    }
}

/// Borrowed view over one attribute of a [`VertexBuffer`].
#[derive(Clone, Copy, Debug)]
pub struct AttributeView<'a> {
    data: &'a [f32],
    cols: usize,
    offset: usize,
    width: usize,
}

impl<'a> AttributeView<'a> {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.len() / self.cols
    }

    /// Columns per row in this view.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The attribute values of one row.
    pub fn get(&self, row: usize) -> Option<&'a [f32]> {
        let start = row.checked_mul(self.cols)? + self.offset;
        self.data.get(start..start + self.width)
    }

    /// Iterate the attribute values row by row.
    pub fn iter(&self) -> impl Iterator<Item = &'a [f32]> + 'a {
        let (offset, width) = (self.offset, self.width);
        self.data
            .chunks_exact(self.cols)
            .map(move |row| &row[offset..offset + width])
    }

    /// Copy out as a flat row-major vector.
    pub fn to_flat(&self) -> Vec<f32> {
        self.iter().flatten().copied().collect()
    }

    /// Copy out the first three columns of each row as vectors.
    pub fn to_vec3s(&self) -> Vec<Vec3> {
        self.iter()
            .map(|v| {
                let at = |i: usize| v.get(i).copied().unwrap_or(0.0);
                Vec3::new(at(0), at(1), at(2))
            })
            .collect()
    }
}

/// Mutable view over one attribute of a [`VertexBuffer`].
#[derive(Debug)]
pub struct AttributeViewMut<'a> {
    data: &'a mut [f32],
    cols: usize,
    offset: usize,
    width: usize,
}

impl AttributeViewMut<'_> {
    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.data.len() / self.cols
    }

    /// Columns per row in this view.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mutable attribute values of one row.
    pub fn get_mut(&mut self, row: usize) -> Option<&mut [f32]> {
        let start = row.checked_mul(self.cols)? + self.offset;
        self.data.get_mut(start..start + self.width)
    }

    /// Iterate mutable attribute values row by row.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut [f32]> + '_ {
        let (offset, width) = (self.offset, self.width);
        self.data
            .chunks_exact_mut(self.cols)
            .map(move |row| &mut row[offset..offset + width])
    }

    /// Set every row to `value`.
    pub fn fill(&mut self, value: &[f32]) -> SceneResult<()> {
        if value.len() != self.width {
            return Err(SceneError::validation(format!(
                "fill value has {} entries, attribute has {}",
                value.len(),
                self.width
            )));
        }
        for row in self.iter_mut() {
            row.copy_from_slice(value);
        }
        Ok(())
    }

    /// Overwrite from a flat row-major slice of `rows() * width()` values.
    pub fn copy_from_flat(&mut self, values: &[f32]) -> SceneResult<()> {
        let width = self.width;
        if values.len() != self.rows() * width {
            return Err(SceneError::shape_mismatch(
                "attribute copy",
                self.rows(),
                values.len() / width.max(1),
            ));
        }
        for (dst, src) in self.iter_mut().zip(values.chunks_exact(width)) {
            dst.copy_from_slice(src);
        }
        Ok(())
    }

    /// Overwrite a three-column attribute from vectors.
    pub fn set_vec3s(&mut self, values: &[Vec3]) -> SceneResult<()> {
        if self.width != 3 {
            return Err(SceneError::out_of_range(format!(
                "attribute has {} columns, vectors need 3",
                self.width
            )));
        }
        if values.len() != self.rows() {
            return Err(SceneError::shape_mismatch(
                "attribute copy",
                self.rows(),
                values.len(),
            ));
        }
        for (dst, v) in self.iter_mut().zip(values) {
            dst.copy_from_slice(&v.to_array());
        }
        Ok(())
    }

    /// Overwrite a rotation attribute from quaternions (`xyzw`).
    pub fn set_quats(&mut self, values: &[Quat]) -> SceneResult<()> {
        if self.width != 4 {
            return Err(SceneError::out_of_range(format!(
                "attribute has {} columns, quaternions need 4",
                self.width
            )));
        }
        if values.len() != self.rows() {
            return Err(SceneError::shape_mismatch(
                "attribute copy",
                self.rows(),
                values.len(),
            ));
        }
        for (dst, q) in self.iter_mut().zip(values) {
            dst.copy_from_slice(&q.to_array());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/vertex_buffer.rs"]
mod tests;
