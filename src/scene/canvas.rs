//! Canvas settings and frame contents.
//!
//! Canvases and frames are plain values built by client code and handed to the
//! [`Scene`](crate::Scene), which validates references and logs the matching commands.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use kurbo::{Circle, Point, Rect};

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::math::row_major;
use crate::scene::camera::{Camera, FocusPoint};
use crate::script::codec::encode_matrix;
use crate::script::command::{
    AddMesh, Command, DrawCircle, DrawImage, DrawPolyline, DrawRectangle, DrawText, DrawVideo,
    SetLayerSettings, SetShading, ShadingValue,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Visibility and blending of one layer.
pub struct LayerSettings {
    /// Draw filled triangles.
    pub filled: bool,
    /// Draw wireframe lines.
    pub wireframe: bool,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Lower orders draw first; unset layers draw after ordered ones.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_order: Option<i32>,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            filled: true,
            wireframe: false,
            opacity: 1.0,
            render_order: None,
        }
    }
}

impl LayerSettings {
    pub(crate) fn validate(&self, layer_id: &str) -> SceneResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(SceneError::out_of_range(format!(
                "layer '{layer_id}' opacity {} must be in [0, 1]",
                self.opacity
            )));
        }
        Ok(())
    }
}

pub(crate) fn layer_settings_command(
    settings: &BTreeMap<String, LayerSettings>,
) -> SceneResult<Command> {
    for (layer_id, s) in settings {
        s.validate(layer_id)?;
    }
    Ok(Command::SetLayerSettings(SetLayerSettings {
        value: settings.clone(),
    }))
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Interaction tuning for a 3D canvas.
pub struct UiParameters {
    /// Speed-up factor while the alt key is held.
    pub pointer_alt_key_multiplier: f32,
    /// Radians per pixel of pointer drag.
    pub pointer_rotation_speed: f32,
    /// Units per wheel tick.
    pub mouse_wheel_translation_speed: f32,
    /// CSS visibility of the layer drop-down.
    pub layer_dropdown_visibility: String,
}

impl Default for UiParameters {
    fn default() -> Self {
        Self {
            pointer_alt_key_multiplier: 4.0,
            pointer_rotation_speed: 0.01,
            mouse_wheel_translation_speed: 0.005,
            layer_dropdown_visibility: "visible".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Background and lights of a 3D canvas.
pub struct Shading {
    /// Background color.
    pub bg_color: Color,
    /// Ambient light color.
    pub ambient_light_color: Color,
    /// Directional light color.
    pub directional_light_color: Color,
    /// Directional light direction.
    pub directional_light_dir: Vec3,
}

impl Default for Shading {
    fn default() -> Self {
        Self {
            bg_color: Color::BLACK,
            ambient_light_color: Color::from_bytes(179, 179, 179),
            directional_light_color: Color::from_bytes(77, 77, 77),
            directional_light_dir: Vec3::new(2.0, 1.0, 2.0),
        }
    }
}

impl Shading {
    pub(crate) fn to_command(self) -> Command {
        Command::SetShading(SetShading {
            value: ShadingValue {
                bg_color: self.bg_color.to_html_hex(),
                ambient_light_color: self.ambient_light_color.to_html_hex(),
                directional_light_color: self.directional_light_color.to_html_hex(),
                directional_light_dir: self.directional_light_dir.to_array(),
            },
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Settings of a new 3D canvas.
pub struct Canvas3D {
    /// Canvas id; empty for an automatic `Canvas-<n>` id.
    pub canvas_id: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Host element id.
    pub html_id: Option<String>,
    /// Initial camera.
    pub camera: Option<Camera>,
    /// Initial focus point.
    pub focus_point: Option<FocusPoint>,
    /// Lighting.
    pub shading: Option<Shading>,
    /// Interaction tuning.
    pub ui_parameters: Option<UiParameters>,
    /// Audio track or video driving playback.
    pub media_id: Option<String>,
}

impl Canvas3D {
    /// Canvas of the given size with viewer defaults.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas_id: String::new(),
            width,
            height,
            html_id: None,
            camera: None,
            focus_point: None,
            shading: None,
            ui_parameters: None,
            media_id: None,
        }
    }

    /// Set an explicit id.
    pub fn id(mut self, canvas_id: impl Into<String>) -> Self {
        self.canvas_id = canvas_id.into();
        self
    }

    /// Set the initial camera.
    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Set the lighting.
    pub fn shading(mut self, shading: Shading) -> Self {
        self.shading = Some(shading);
        self
    }

    /// Set the interaction tuning.
    pub fn ui_parameters(mut self, ui: UiParameters) -> Self {
        self.ui_parameters = Some(ui);
        self
    }

    /// Set the initial focus point.
    pub fn focus_point(mut self, focus_point: FocusPoint) -> Self {
        self.focus_point = Some(focus_point);
        self
    }

    /// Drive playback from an audio track or video.
    pub fn media(mut self, media_id: impl Into<String>) -> Self {
        self.media_id = Some(media_id.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Settings of a new 2D canvas.
pub struct Canvas2D {
    /// Canvas id; empty for an automatic `Canvas-<n>` id.
    pub canvas_id: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Host element id.
    pub html_id: Option<String>,
    /// CSS background.
    pub background_style: String,
    /// Audio track or video driving playback.
    pub media_id: Option<String>,
}

impl Canvas2D {
    /// Canvas of the given size on a white background.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas_id: String::new(),
            width,
            height,
            html_id: None,
            background_style: "#ffffff".to_string(),
            media_id: None,
        }
    }

    /// Set an explicit id.
    pub fn id(mut self, canvas_id: impl Into<String>) -> Self {
        self.canvas_id = canvas_id.into();
        self
    }

    /// Set the CSS background.
    pub fn background(mut self, style: impl Into<String>) -> Self {
        self.background_style = style.into();
        self
    }

    /// Drive playback from an audio track or video.
    pub fn media(mut self, media_id: impl Into<String>) -> Self {
        self.media_id = Some(media_id.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Contents of one frame on a 3D canvas.
pub struct Frame3D {
    pub(crate) frame_id: Option<String>,
    pub(crate) meshes: Vec<(String, Option<Mat4>)>,
    pub(crate) camera: Option<Camera>,
    pub(crate) focus_point: Option<FocusPoint>,
    pub(crate) layer_settings: Option<BTreeMap<String, LayerSettings>>,
}

impl Frame3D {
    /// Empty frame with an automatic id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit frame id.
    pub fn id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }

    /// Show a mesh or mesh update as defined.
    pub fn add_mesh(mut self, mesh_id: impl Into<String>) -> Self {
        self.meshes.push((mesh_id.into(), None));
        self
    }

    /// Show a mesh or mesh update under `transform`.
    pub fn add_mesh_with_transform(mut self, mesh_id: impl Into<String>, transform: Mat4) -> Self {
        self.meshes.push((mesh_id.into(), Some(transform)));
        self
    }

    /// Camera for this frame.
    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Focus point for this frame.
    pub fn focus_point(mut self, focus_point: FocusPoint) -> Self {
        self.focus_point = Some(focus_point);
        self
    }

    /// Layer settings for this frame.
    pub fn layer_settings(mut self, settings: BTreeMap<String, LayerSettings>) -> Self {
        self.layer_settings = Some(settings);
        self
    }

    /// Ids of the meshes placed in this frame.
    pub fn mesh_ids(&self) -> impl Iterator<Item = &str> {
        self.meshes.iter().map(|(id, _)| id.as_str())
    }

    pub(crate) fn commands(&self) -> SceneResult<Vec<Command>> {
        let mut out = Vec::with_capacity(self.meshes.len() + 3);
        if let Some(camera) = self.camera {
            out.push(camera.to_command()?);
        }
        if let Some(fp) = self.focus_point {
            out.push(fp.to_command());
        }
        if let Some(settings) = &self.layer_settings {
            out.push(layer_settings_command(settings)?);
        }
        for (mesh_id, transform) in &self.meshes {
            let transform = match transform {
                Some(t) if *t != Mat4::IDENTITY => Some(encode_matrix(&row_major(*t), 4)?),
                _ => None,
            };
            out.push(Command::AddMesh(AddMesh {
                mesh_id: mesh_id.clone(),
                transform,
            }));
        }
        Ok(out)
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Stroke and fill of a 2D shape.
pub struct ShapeStyle {
    /// Stroke color.
    pub line_color: Color,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// Fill color; unfilled when `None`.
    pub fill_color: Option<Color>,
    /// Layer tag.
    pub layer_id: Option<String>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            line_color: Color::BLACK,
            line_width: 1.0,
            fill_color: None,
            layer_id: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// How an image or video is placed on a 2D canvas.
pub enum PositionType {
    /// Scale to fit, preserving aspect.
    #[default]
    Fit,
    /// Scale to cover, preserving aspect.
    Fill,
    /// Scale to the canvas size.
    Stretch,
    /// Use the given offset and scale.
    Manual,
}

impl PositionType {
    fn as_str(self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Fill => "fill",
            Self::Stretch => "stretch",
            Self::Manual => "manual",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Placement of an image or video blit.
pub struct Placement {
    /// Placement mode.
    pub position_type: PositionType,
    /// Top-left corner for [`PositionType::Manual`].
    pub origin: Point,
    /// Scale for [`PositionType::Manual`].
    pub scale: f64,
    /// Smooth when scaling.
    pub smoothed: bool,
    /// Layer tag.
    pub layer_id: Option<String>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position_type: PositionType::Fit,
            origin: Point::ZERO,
            scale: 1.0,
            smoothed: false,
            layer_id: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Shape2D {
    Polyline {
        points: Vec<Point>,
        close_path: bool,
        style: ShapeStyle,
    },
    Rectangle(Rect, ShapeStyle),
    Circle(Circle, ShapeStyle),
    Text {
        text: String,
        baseline_left: Point,
        color: Color,
        size_in_pixels: f32,
        font_family: String,
        layer_id: Option<String>,
    },
    Image(String, Placement),
    Video(Placement),
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Contents of one frame on a 2D canvas.
pub struct Frame2D {
    pub(crate) frame_id: Option<String>,
    shapes: Vec<Shape2D>,
}

impl Frame2D {
    /// Empty frame with an automatic id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit frame id.
    pub fn id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }

    /// Open or closed polyline.
    pub fn add_line(mut self, points: Vec<Point>, close_path: bool, style: ShapeStyle) -> Self {
        self.shapes.push(Shape2D::Polyline {
            points,
            close_path,
            style,
        });
        self
    }

    /// Axis-aligned rectangle.
    pub fn add_rectangle(mut self, rect: Rect, style: ShapeStyle) -> Self {
        self.shapes.push(Shape2D::Rectangle(rect, style));
        self
    }

    /// Circle.
    pub fn add_circle(mut self, circle: Circle, style: ShapeStyle) -> Self {
        self.shapes.push(Shape2D::Circle(circle, style));
        self
    }

    /// Text with its baseline starting at `baseline_left`.
    pub fn add_text(
        mut self,
        text: impl Into<String>,
        baseline_left: Point,
        color: Color,
        size_in_pixels: f32,
    ) -> Self {
        self.shapes.push(Shape2D::Text {
            text: text.into(),
            baseline_left,
            color,
            size_in_pixels,
            font_family: "sans-serif".to_string(),
            layer_id: None,
        });
        self
    }

    /// Blit of a defined image.
    pub fn add_image(mut self, image_id: impl Into<String>, placement: Placement) -> Self {
        self.shapes.push(Shape2D::Image(image_id.into(), placement));
        self
    }

    /// Blit of the canvas media video.
    pub fn add_video(mut self, placement: Placement) -> Self {
        self.shapes.push(Shape2D::Video(placement));
        self
    }

    /// Ids of the images drawn in this frame.
    pub fn image_ids(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|s| match s {
            Shape2D::Image(id, _) => Some(id.as_str()),
            _ => None,
        })
    }

    pub(crate) fn draws_video(&self) -> bool {
        self.shapes.iter().any(|s| matches!(s, Shape2D::Video(_)))
    }

    pub(crate) fn commands(&self) -> SceneResult<Vec<Command>> {
        self.shapes.iter().map(shape_command).collect()
    }
}

fn shape_command(shape: &Shape2D) -> SceneResult<Command> {
    let fill = |c: Option<Color>| c.map(Color::to_html_hex);
    Ok(match shape {
        Shape2D::Polyline {
            points,
            close_path,
            style,
        } => {
            if points.len() < 2 {
                return Err(SceneError::validation("a polyline needs at least 2 points"));
            }
            let coords: Vec<f32> = points
                .iter()
                .flat_map(|p| [p.x as f32, p.y as f32])
                .collect();
            Command::DrawPolyline(DrawPolyline {
                coordinates: encode_matrix(&coords, 2)?,
                line_color: style.line_color.to_html_hex(),
                line_width: style.line_width,
                fill_color: fill(style.fill_color),
                close_path: *close_path,
                layer_id: style.layer_id.clone(),
            })
        }
        Shape2D::Rectangle(rect, style) => Command::DrawRectangle(DrawRectangle {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            line_color: style.line_color.to_html_hex(),
            line_width: style.line_width,
            fill_color: fill(style.fill_color),
            layer_id: style.layer_id.clone(),
        }),
        Shape2D::Circle(circle, style) => Command::DrawCircle(DrawCircle {
            x: circle.center.x,
            y: circle.center.y,
            radius: circle.radius,
            line_color: style.line_color.to_html_hex(),
            line_width: style.line_width,
            fill_color: fill(style.fill_color),
            layer_id: style.layer_id.clone(),
        }),
        Shape2D::Text {
            text,
            baseline_left,
            color,
            size_in_pixels,
            font_family,
            layer_id,
        } => Command::DrawText(DrawText {
            text: text.clone(),
            x: baseline_left.x,
            y: baseline_left.y,
            color: color.to_html_hex(),
            size_in_pixels: *size_in_pixels,
            font_family: font_family.clone(),
            layer_id: layer_id.clone(),
        }),
        Shape2D::Image(image_id, p) => Command::DrawImage(DrawImage {
            image_id: image_id.clone(),
            position_type: p.position_type.as_str().to_string(),
            x: p.origin.x,
            y: p.origin.y,
            scale: p.scale,
            smoothed: p.smoothed,
            layer_id: p.layer_id.clone(),
        }),
        Shape2D::Video(p) => Command::DrawVideo(DrawVideo {
            position_type: p.position_type.as_str().to_string(),
            x: p.origin.x,
            y: p.origin.y,
            scale: p.scale,
            smoothed: p.smoothed,
            layer_id: p.layer_id.clone(),
        }),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/canvas.rs"]
mod tests;
