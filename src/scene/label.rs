//! Text labels: a billboard quad textured with its own rendered text.

use glam::{Mat4, Vec3};

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::scene::mesh::Mesh;
use crate::script::command::{Command, DefineLabel};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Horizontal anchor of the text relative to the label position.
pub enum HorizontalAlign {
    /// Text starts at the anchor.
    #[default]
    Left,
    /// Text is centred on the anchor.
    Center,
    /// Text ends at the anchor.
    Right,
}

impl HorizontalAlign {
    fn offset(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Center => 0,
            Self::Right => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Vertical anchor of the text relative to the label position.
pub enum VerticalAlign {
    /// Anchor at the top of the text.
    Top,
    /// Anchor at the middle of the text.
    #[default]
    Middle,
    /// Anchor at the bottom of the text.
    Bottom,
}

impl VerticalAlign {
    fn offset(self) -> i8 {
        match self {
            Self::Top => -1,
            Self::Middle => 0,
            Self::Bottom => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Settings of a new label.
pub struct Label {
    /// Label id; empty for an automatic `Label-<n>` id.
    pub label_id: String,
    /// Text.
    pub text: String,
    /// Text color, also the shared color of the label mesh.
    pub color: Color,
    /// Font size in pixels.
    pub size_in_pixels: f32,
    /// CSS font family.
    pub font_family: String,
    /// Layer tag of the label mesh.
    pub layer_id: Option<String>,
    /// Horizontal anchor.
    pub horizontal_align: HorizontalAlign,
    /// Vertical anchor.
    pub vertical_align: VerticalAlign,
    /// Distance between anchor and text, in mesh units.
    pub offset_distance: f32,
    /// Place the label in camera space.
    pub camera_space: bool,
}

impl Label {
    /// White 12px sans-serif text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            label_id: String::new(),
            text: text.into(),
            color: Color::WHITE,
            size_in_pixels: 12.0,
            font_family: "sans-serif".to_string(),
            layer_id: None,
            horizontal_align: HorizontalAlign::Left,
            vertical_align: VerticalAlign::Middle,
            offset_distance: 0.1,
            camera_space: false,
        }
    }

    /// Set an explicit id.
    pub fn id(mut self, label_id: impl Into<String>) -> Self {
        self.label_id = label_id.into();
        self
    }

    /// Text color.
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Font size in pixels.
    pub fn size(mut self, size_in_pixels: f32) -> Self {
        self.size_in_pixels = size_in_pixels;
        self
    }

    /// CSS font family.
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Layer tag.
    pub fn layer(mut self, layer_id: impl Into<String>) -> Self {
        self.layer_id = Some(layer_id.into());
        self
    }

    /// Text anchors.
    pub fn align(mut self, horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        self.horizontal_align = horizontal;
        self.vertical_align = vertical;
        self
    }

    /// Distance between anchor and text.
    pub fn offset_distance(mut self, distance: f32) -> Self {
        self.offset_distance = distance;
        self
    }

    /// Place the label in camera space.
    pub fn camera_space(mut self, value: bool) -> Self {
        self.camera_space = value;
        self
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        if !(self.size_in_pixels.is_finite() && self.size_in_pixels > 0.0) {
            return Err(SceneError::validation(format!(
                "label font size must be > 0, got {}",
                self.size_in_pixels
            )));
        }
        if !self.offset_distance.is_finite() {
            return Err(SceneError::validation("label offset distance must be finite"));
        }
        Ok(())
    }

    /// Unit quad in the xy plane, textured with the label id.
    pub(crate) fn mesh(&self, mesh_id: &str) -> SceneResult<Mesh> {
        let mut mesh = Mesh::new(mesh_id)
            .with_shared_color(self.color)?
            .with_texture(self.label_id.clone())?
            .nn_texture(false)
            .label(true)
            .camera_space(self.camera_space);
        if let Some(layer) = &self.layer_id {
            mesh = mesh.with_layer(layer.clone());
        }
        mesh.add_image(
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::X,
            Vec3::Y,
            false,
            Mat4::IDENTITY,
        )?;
        Ok(mesh)
    }

    pub(crate) fn to_command(&self, mesh_id: &str) -> Command {
        Command::DefineLabel(DefineLabel {
            label_id: self.label_id.clone(),
            mesh_id: mesh_id.to_string(),
            text: self.text.clone(),
            fill_style: self.color.to_html_hex(),
            font_family: self.font_family.clone(),
            font_size_px: self.size_in_pixels,
            horizontal_align: self.horizontal_align.offset(),
            vertical_align: self.vertical_align.offset(),
            offset_distance: self.offset_distance,
        })
    }
}
