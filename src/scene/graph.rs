//! Sparkline graphs: a 2D canvas that plots one value per frame for each named quantity.

use crate::foundation::color::Color;
use crate::foundation::error::{SceneError, SceneResult};
use crate::script::codec::encode_matrix;
use crate::script::command::{
    AddSparkline, Command, MarginValue, SetBackgroundStyle, SetMargin, SetMedia, SetTextStyle,
    VerticalRuleValue,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Where a sparkline's name or current value is drawn.
pub enum GraphTextAlign {
    /// Left of the line.
    #[default]
    Left,
    /// Right of the line.
    Right,
    /// Above the line.
    Top,
    /// Below the line.
    Bottom,
    /// Not drawn.
    None,
}

impl GraphTextAlign {
    /// Keyword understood by the viewer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::None => "none",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Outer margin of a graph in pixels.
pub struct Margin {
    /// Top.
    pub top: f64,
    /// Right.
    pub right: f64,
    /// Bottom.
    pub bottom: f64,
    /// Left.
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

impl Margin {
    /// Same margin on every side.
    pub fn uniform(size: f64) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }

    fn validate(&self) -> SceneResult<()> {
        for (side, v) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(SceneError::out_of_range(format!(
                    "graph {side} margin must be >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Vertical line marking one frame of a sparkline.
pub struct VerticalRule {
    /// Marked frame.
    pub frame: i64,
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub line_width: f32,
}

impl VerticalRule {
    /// Black one-pixel rule at `frame`.
    pub fn at(frame: i64) -> Self {
        Self {
            frame,
            color: Color::BLACK,
            line_width: 1.0,
        }
    }

    /// Set the line color.
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the line width.
    pub fn line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
/// One plotted quantity.
pub struct Sparkline {
    /// Name shown next to the line.
    pub name: String,
    /// One value per frame.
    pub values: Vec<f32>,
    /// Line (and label) color.
    pub color: Color,
    /// Line width in pixels.
    pub line_width: f32,
    /// Marker lines.
    pub vertical_rules: Vec<VerticalRule>,
}

fn check_line_width(what: &str, line_width: f32) -> SceneResult<()> {
    if !(line_width.is_finite() && line_width > 0.0) {
        return Err(SceneError::out_of_range(format!(
            "{what} line width must be > 0, got {line_width}"
        )));
    }
    Ok(())
}

impl Sparkline {
    /// Black one-pixel sparkline.
    pub fn new(name: impl Into<String>, values: impl Into<Vec<f32>>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
            color: Color::BLACK,
            line_width: 1.0,
            vertical_rules: Vec::new(),
        }
    }

    /// Set the line color.
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the line width.
    pub fn line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    /// Add a marker line.
    pub fn vertical_rule(mut self, rule: VerticalRule) -> Self {
        self.vertical_rules.push(rule);
        self
    }

    pub(crate) fn to_command(&self) -> SceneResult<Command> {
        check_line_width(&format!("sparkline '{}'", self.name), self.line_width)?;
        if let Some(bad) = self.values.iter().find(|v| !v.is_finite()) {
            return Err(SceneError::validation(format!(
                "sparkline '{}' has a non-finite value {bad}",
                self.name
            )));
        }
        let mut vertical_rules = Vec::with_capacity(self.vertical_rules.len());
        for rule in &self.vertical_rules {
            check_line_width("vertical rule", rule.line_width)?;
            vertical_rules.push(VerticalRuleValue {
                frame_index: rule.frame,
                stroke_style: rule.color.to_html_hex(),
                line_width: rule.line_width,
            });
        }
        Ok(Command::AddSparkline(AddSparkline {
            value_buffer: encode_matrix(&self.values, 1)?,
            name: self.name.clone(),
            stroke_style: self.color.to_html_hex(),
            line_width: self.line_width,
            vertical_rules,
        }))
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Settings and initial sparklines of a new graph canvas.
pub struct Graph {
    /// Canvas id; empty for an automatic `Canvas-<n>` id.
    pub canvas_id: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Host element id.
    pub html_id: Option<String>,
    /// Background color.
    pub background_color: Color,
    /// Outer margin.
    pub margin: Margin,
    /// CSS font family of the labels.
    pub font_family: String,
    /// Placement of sparkline names.
    pub name_align: GraphTextAlign,
    /// Placement of sparkline values.
    pub value_align: GraphTextAlign,
    /// Size of sparkline names in pixels.
    pub name_size: f32,
    /// Size of sparkline values in pixels.
    pub value_size: f32,
    /// Audio track or video driving playback.
    pub media_id: Option<String>,
    /// Sparklines logged with the graph.
    pub sparklines: Vec<Sparkline>,
}

impl Graph {
    /// Graph of the given size on a white background.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas_id: String::new(),
            width,
            height,
            html_id: None,
            background_color: Color::WHITE,
            margin: Margin::default(),
            font_family: "sans-serif".to_string(),
            name_align: GraphTextAlign::Left,
            value_align: GraphTextAlign::Right,
            name_size: 12.0,
            value_size: 12.0,
            media_id: None,
            sparklines: Vec::new(),
        }
    }

    /// Set an explicit id.
    pub fn id(mut self, canvas_id: impl Into<String>) -> Self {
        self.canvas_id = canvas_id.into();
        self
    }

    /// Set the background color.
    pub fn background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the outer margin.
    pub fn margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    /// Set the label font family.
    pub fn font_family(mut self, font_family: impl Into<String>) -> Self {
        self.font_family = font_family.into();
        self
    }

    /// Set where names and values are drawn.
    pub fn align(mut self, name_align: GraphTextAlign, value_align: GraphTextAlign) -> Self {
        self.name_align = name_align;
        self.value_align = value_align;
        self
    }

    /// Set the label sizes in pixels.
    pub fn text_sizes(mut self, name_size: f32, value_size: f32) -> Self {
        self.name_size = name_size;
        self.value_size = value_size;
        self
    }

    /// Drive playback from an audio track or video.
    pub fn media(mut self, media_id: impl Into<String>) -> Self {
        self.media_id = Some(media_id.into());
        self
    }

    /// Add a sparkline.
    pub fn sparkline(mut self, sparkline: Sparkline) -> Self {
        self.sparklines.push(sparkline);
        self
    }

    /// Settings followed by sparklines, as logged in the graph's `CanvasCommands`.
    pub(crate) fn commands(&self) -> SceneResult<Vec<Command>> {
        self.margin.validate()?;
        for (what, size) in [("name", self.name_size), ("value", self.value_size)] {
            if !(size.is_finite() && size > 0.0) {
                return Err(SceneError::out_of_range(format!(
                    "graph {what} size must be > 0, got {size}"
                )));
            }
        }

        let mut commands = vec![
            Command::SetMargin(SetMargin {
                value: MarginValue {
                    top: self.margin.top,
                    right: self.margin.right,
                    bottom: self.margin.bottom,
                    left: self.margin.left,
                },
            }),
            Command::SetBackgroundStyle(SetBackgroundStyle {
                value: self.background_color.to_html_hex(),
            }),
            Command::SetTextStyle(SetTextStyle {
                font_family: self.font_family.clone(),
                name_size_in_pixels: self.name_size,
                value_size_in_pixels: self.value_size,
                name_align: self.name_align.as_str().to_string(),
                value_align: self.value_align.as_str().to_string(),
            }),
        ];
        for sparkline in &self.sparklines {
            commands.push(sparkline.to_command()?);
        }
        if let Some(media_id) = &self.media_id {
            commands.push(Command::SetMedia(SetMedia {
                media_id: media_id.clone(),
            }));
        }
        Ok(commands)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
