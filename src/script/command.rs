//! Wire model of the scene script: a JSON array of commands discriminated by `CommandType`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::SceneResult;
use crate::scene::canvas::{LayerSettings, UiParameters};
use crate::scene::session::SceneProperties;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "CommandType")]
/// One entry of the scene script.
pub enum Command {
    /// Names the scene (session header).
    SetSceneId(SetSceneId),
    /// Global playback properties (session header).
    SetSceneProperties(SceneProperties),
    /// Full mesh definition.
    DefineMesh(DefineMesh),
    /// Full-precision or quantized mesh update.
    UpdateMesh(UpdateMesh),
    /// Encoded image payload.
    DefineImage(DefineImage),
    /// Encoded audio payload.
    DefineAudioTrack(DefineAudioTrack),
    /// Encoded video payload.
    DefineVideo(DefineVideo),
    /// Text label bound to a billboard mesh.
    DefineLabel(DefineLabel),
    /// New 3D canvas.
    #[serde(rename = "AddCanvas3D")]
    AddCanvas3D(AddCanvas),
    /// New 2D canvas.
    #[serde(rename = "AddCanvas2D")]
    AddCanvas2D(AddCanvas),
    /// Commands scoped to one canvas.
    CanvasCommands(CanvasCommands),
    /// New frame on the enclosing canvas.
    AddFrame(AddFrame),
    /// Commands scoped to one frame.
    FrameCommands(FrameCommands),
    /// Places a defined mesh (or mesh update) in a frame.
    AddMesh(AddMesh),
    /// Camera for a canvas or frame.
    SetCamera(SetCamera),
    /// Focus point for a canvas or frame.
    SetFocusPoint(SetFocusPoint),
    /// Lighting and background of a 3D canvas.
    SetShading(SetShading),
    /// Interaction tuning of a 3D canvas.
    #[serde(rename = "SetUIParameters")]
    SetUiParameters(SetUiParameters),
    /// Per-layer visibility, opacity and render order.
    SetLayerSettings(SetLayerSettings),
    /// CSS background of a 2D canvas.
    SetBackgroundStyle(SetBackgroundStyle),
    /// Media track (audio or video) driving a canvas.
    SetMedia(SetMedia),
    /// 2D polyline.
    DrawPolyline(DrawPolyline),
    /// 2D rectangle.
    DrawRectangle(DrawRectangle),
    /// 2D circle.
    DrawCircle(DrawCircle),
    /// 2D text.
    DrawText(DrawText),
    /// 2D image blit.
    DrawImage(DrawImage),
    /// 2D blit of the canvas media video.
    DrawVideo(DrawVideo),
    /// CSS grid used to lay out canvases.
    DefineGrid(DefineGrid),
    /// Position of a canvas in the grid.
    PlaceCanvasInGrid(PlaceCanvasInGrid),
    /// Canvases that share input events.
    LinkCanvasEvents(LinkCanvasEvents),
    /// Scripted key press on a canvas.
    SimulateKeyPress(SimulateKeyPress),
    /// Global viewer chrome.
    ConfigureUserInterface(ConfigureUserInterface),
    /// New sparkline graph canvas.
    AddGraph(AddCanvas),
    /// Outer margin of a graph.
    SetMargin(SetMargin),
    /// Label fonts and alignment of a graph.
    SetTextStyle(SetTextStyle),
    /// One sparkline on a graph.
    AddSparkline(AddSparkline),
    /// New text panel.
    AddTextPanel(AddTextPanel),
    /// Body text of a text panel.
    SetTextPanelValue(TextPanelText),
    /// Title of a text panel.
    SetTextPanelTitle(TextPanelText),
    /// Contents of a text panel's input box.
    SetTextPanelInputText(TextPanelText),
    /// New drop-down menu.
    AddDropDownMenu(AddDropDownMenu),
    /// Title of a drop-down menu.
    SetDropDownMenuTitle(DropDownMenuTitle),
    /// Entries of a drop-down menu.
    SetDropDownMenuItems(DropDownMenuItems),
    /// Selected entry of a drop-down menu.
    SetDropDownMenuSelection(DropDownMenuSelection),
    /// Enables or disables one entry of a drop-down menu.
    SetDropDownMenuItemDisabled(DropDownMenuItemDisabled),
}

impl Command {
    /// Discriminator as written into `CommandType`.
    pub fn command_type(&self) -> &'static str {
        match self {
            Self::SetSceneId(_) => "SetSceneId",
            Self::SetSceneProperties(_) => "SetSceneProperties",
            Self::DefineMesh(_) => "DefineMesh",
            Self::UpdateMesh(_) => "UpdateMesh",
            Self::DefineImage(_) => "DefineImage",
            Self::DefineAudioTrack(_) => "DefineAudioTrack",
            Self::DefineVideo(_) => "DefineVideo",
            Self::DefineLabel(_) => "DefineLabel",
            Self::AddCanvas3D(_) => "AddCanvas3D",
            Self::AddCanvas2D(_) => "AddCanvas2D",
            Self::CanvasCommands(_) => "CanvasCommands",
            Self::AddFrame(_) => "AddFrame",
            Self::FrameCommands(_) => "FrameCommands",
            Self::AddMesh(_) => "AddMesh",
            Self::SetCamera(_) => "SetCamera",
            Self::SetFocusPoint(_) => "SetFocusPoint",
            Self::SetShading(_) => "SetShading",
            Self::SetUiParameters(_) => "SetUIParameters",
            Self::SetLayerSettings(_) => "SetLayerSettings",
            Self::SetBackgroundStyle(_) => "SetBackgroundStyle",
            Self::SetMedia(_) => "SetMedia",
            Self::DrawPolyline(_) => "DrawPolyline",
            Self::DrawRectangle(_) => "DrawRectangle",
            Self::DrawCircle(_) => "DrawCircle",
            Self::DrawText(_) => "DrawText",
            Self::DrawImage(_) => "DrawImage",
            Self::DrawVideo(_) => "DrawVideo",
            Self::DefineGrid(_) => "DefineGrid",
            Self::PlaceCanvasInGrid(_) => "PlaceCanvasInGrid",
            Self::LinkCanvasEvents(_) => "LinkCanvasEvents",
            Self::SimulateKeyPress(_) => "SimulateKeyPress",
            Self::ConfigureUserInterface(_) => "ConfigureUserInterface",
            Self::AddGraph(_) => "AddGraph",
            Self::SetMargin(_) => "SetMargin",
            Self::SetTextStyle(_) => "SetTextStyle",
            Self::AddSparkline(_) => "AddSparkline",
            Self::AddTextPanel(_) => "AddTextPanel",
            Self::SetTextPanelValue(_) => "SetTextPanelValue",
            Self::SetTextPanelTitle(_) => "SetTextPanelTitle",
            Self::SetTextPanelInputText(_) => "SetTextPanelInputText",
            Self::AddDropDownMenu(_) => "AddDropDownMenu",
            Self::SetDropDownMenuTitle(_) => "SetDropDownMenuTitle",
            Self::SetDropDownMenuItems(_) => "SetDropDownMenuItems",
            Self::SetDropDownMenuSelection(_) => "SetDropDownMenuSelection",
            Self::SetDropDownMenuItemDisabled(_) => "SetDropDownMenuItemDisabled",
        }
    }

    /// Commands nested inside canvas or frame scopes.
    pub fn nested(&self) -> &[Command] {
        match self {
            Self::CanvasCommands(c) => &c.commands,
            Self::FrameCommands(f) => &f.commands,
            _ => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetSceneId` payload.
pub struct SetSceneId {
    /// Scene identifier.
    pub scene_id: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Width of the per-vertex index type in `TriangleBuffer`/`LineBuffer`.
pub enum IndexBufferType {
    /// 16-bit indices.
    UInt16,
    /// 32-bit indices.
    UInt32,
}

impl IndexBufferType {
    /// Narrowest index type for a mesh with `vertex_count` vertices.
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count < 0xFFFF {
            Self::UInt16
        } else {
            Self::UInt32
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Shading mode the viewer selects for a mesh.
pub enum PrimitiveType {
    /// One shared color.
    SingleColorMesh,
    /// Per-vertex colors.
    MultiColorMesh,
    /// Texture lookup through uvs.
    TexturedMesh,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Geometry section of a `DefineMesh` command.
pub struct MeshDefinition {
    /// Encoded `f32` vertex matrix.
    pub vertex_buffer: String,
    /// Index width for the triangle and line buffers.
    pub index_buffer_type: IndexBufferType,
    /// Encoded triangle index matrix (`K x 3`).
    pub triangle_buffer: String,
    /// Encoded line index matrix (`L x 2`).
    pub line_buffer: String,
    /// Shading mode.
    pub primitive_type: PrimitiveType,
    /// Shared color, `#rrggbb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Texture image id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_id: Option<String>,
    /// Nearest-neighbour texture sampling.
    #[serde(default)]
    pub nearest_neighbor_texture: bool,
    /// Use the texture alpha channel.
    #[serde(default)]
    pub use_texture_alpha: bool,
    /// Encoded per-instance matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_buffer: Option<String>,
    /// Instance rows carry a rotation quaternion.
    #[serde(default)]
    pub instance_buffer_has_rotations: bool,
    /// Instance rows carry a color.
    #[serde(default)]
    pub instance_buffer_has_colors: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DefineMesh` payload.
pub struct DefineMesh {
    /// Mesh identifier.
    pub mesh_id: String,
    /// Layer tag, `null` when unset.
    pub layer_id: Option<String>,
    /// Render back faces.
    pub double_sided: bool,
    /// Coordinates are in camera space.
    pub camera_space: bool,
    /// Always faces the camera.
    pub is_billboard: bool,
    /// Backs a text label.
    pub is_label: bool,
    /// Geometry.
    pub definition: MeshDefinition,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `UpdateMesh` payload. Exactly one of `vertex_buffer` or the quantized fields is present.
pub struct UpdateMesh {
    /// Mesh being updated.
    pub base_mesh_id: String,
    /// Identifier of this update.
    pub mesh_id: String,
    /// Position of the update in its base mesh's stream.
    pub frame_index: u32,
    /// Bit set of updated channels.
    pub update_flags: u8,
    /// Full-precision encoded buffer (keyframes and unquantized updates).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_buffer: Option<String>,
    /// Frame index of the keyframe this delta applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframe_index: Option<u32>,
    /// Dequantization offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f32>,
    /// Dequantization scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    /// Encoded `i16` delta matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantized_buffer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DefineImage` payload.
pub struct DefineImage {
    /// Image identifier.
    pub image_id: String,
    /// File extension (`png`, `jpg`, ...).
    #[serde(rename = "Type")]
    pub kind: String,
    /// Base64 file bytes.
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DefineAudioTrack` payload.
pub struct DefineAudioTrack {
    /// Track identifier.
    pub audio_id: String,
    /// File extension.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Base64 file bytes.
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DefineVideo` payload.
pub struct DefineVideo {
    /// Video identifier.
    pub video_id: String,
    /// File extension.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Base64 file bytes.
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DefineLabel` payload.
pub struct DefineLabel {
    /// Label identifier, also the texture id of its mesh.
    pub label_id: String,
    /// Textured billboard mesh carrying the label.
    pub mesh_id: String,
    /// Text.
    pub text: String,
    /// `#rrggbb` text color.
    pub fill_style: String,
    /// CSS font family.
    pub font_family: String,
    /// Font size.
    pub font_size_px: f32,
    /// `-1` left, `0` center, `+1` right.
    pub horizontal_align: i8,
    /// `-1` top, `0` middle, `+1` bottom.
    pub vertical_align: i8,
    /// Distance between anchor and text, in mesh units.
    pub offset_distance: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `AddCanvas3D`/`AddCanvas2D` payload.
pub struct AddCanvas {
    /// Canvas identifier.
    pub canvas_id: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Host element id in the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `CanvasCommands` payload.
pub struct CanvasCommands {
    /// Target canvas.
    pub canvas_id: String,
    /// Scoped commands.
    pub commands: Vec<Command>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `AddFrame` payload.
pub struct AddFrame {
    /// Frame identifier, unique within its canvas.
    pub frame_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `FrameCommands` payload.
pub struct FrameCommands {
    /// Target frame.
    pub frame_id: String,
    /// Scoped commands.
    pub commands: Vec<Command>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `AddMesh` payload.
pub struct AddMesh {
    /// Mesh or mesh update identifier.
    pub mesh_id: String,
    /// Encoded row-major 4x4 transform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Camera matrices.
pub struct CameraValue {
    /// Encoded row-major world-to-camera matrix.
    pub world_to_camera: String,
    /// Encoded row-major projection matrix.
    pub projection: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetCamera` payload.
pub struct SetCamera {
    /// Matrices.
    pub value: CameraValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Focus point position and orientation.
pub struct FocusPointValue {
    /// Point the camera orbits around.
    pub position: [f32; 3],
    /// Axis-angle orientation of the focus frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation_axis_angle: Option<[f32; 3]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetFocusPoint` payload.
pub struct SetFocusPoint {
    /// Focus point.
    pub value: FocusPointValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Lighting colors and direction.
pub struct ShadingValue {
    /// `#rrggbb` background.
    pub bg_color: String,
    /// `#rrggbb` ambient light.
    pub ambient_light_color: String,
    /// `#rrggbb` directional light.
    pub directional_light_color: String,
    /// Direction the directional light points to.
    pub directional_light_dir: [f32; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetShading` payload.
pub struct SetShading {
    /// Lighting.
    pub value: ShadingValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetUIParameters` payload.
pub struct SetUiParameters {
    /// Parameters.
    pub value: UiParameters,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetLayerSettings` payload.
pub struct SetLayerSettings {
    /// Settings per layer id.
    pub value: BTreeMap<String, LayerSettings>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetBackgroundStyle` payload.
pub struct SetBackgroundStyle {
    /// CSS background value.
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetMedia` payload.
pub struct SetMedia {
    /// Audio track or video id.
    pub media_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DrawPolyline` payload.
pub struct DrawPolyline {
    /// Encoded `N x 2` coordinates.
    pub coordinates: String,
    /// `#rrggbb` stroke.
    pub line_color: String,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// `#rrggbb` fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Connect the last point back to the first.
    pub close_path: bool,
    /// Layer tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DrawRectangle` payload.
pub struct DrawRectangle {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// `#rrggbb` stroke.
    pub line_color: String,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// `#rrggbb` fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Layer tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DrawCircle` payload.
pub struct DrawCircle {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Radius.
    pub radius: f64,
    /// `#rrggbb` stroke.
    pub line_color: String,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// `#rrggbb` fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Layer tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DrawText` payload.
pub struct DrawText {
    /// Text.
    pub text: String,
    /// Left of the baseline.
    pub x: f64,
    /// Baseline y.
    pub y: f64,
    /// `#rrggbb` fill.
    pub color: String,
    /// Font size.
    pub size_in_pixels: f32,
    /// CSS font family.
    pub font_family: String,
    /// Layer tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DrawImage` payload.
pub struct DrawImage {
    /// Image identifier.
    pub image_id: String,
    /// Placement mode (`fit`, `fill`, `stretch`, `manual`).
    pub position_type: String,
    /// Manual left edge.
    pub x: f64,
    /// Manual top edge.
    pub y: f64,
    /// Manual scale.
    pub scale: f64,
    /// Smooth when scaling.
    pub smoothed: bool,
    /// Layer tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DrawVideo` payload.
pub struct DrawVideo {
    /// Placement mode (`fit`, `fill`, `stretch`, `manual`).
    pub position_type: String,
    /// Manual left edge.
    pub x: f64,
    /// Manual top edge.
    pub y: f64,
    /// Manual scale.
    pub scale: f64,
    /// Smooth when scaling.
    pub smoothed: bool,
    /// Layer tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `DefineGrid` payload.
pub struct DefineGrid {
    /// CSS width of the grid.
    pub width: String,
    /// CSS `grid-template-rows`.
    pub grid_template_rows: String,
    /// CSS `grid-template-columns`.
    pub grid_template_columns: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `PlaceCanvasInGrid` payload.
pub struct PlaceCanvasInGrid {
    /// Canvas identifier.
    pub canvas_id: String,
    /// CSS `grid-row`.
    pub grid_row: String,
    /// CSS `grid-column`.
    pub grid_column: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `LinkCanvasEvents` payload.
pub struct LinkCanvasEvents {
    /// Canvases sharing input.
    pub canvas_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SimulateKeyPress` payload.
pub struct SimulateKeyPress {
    /// Canvas receiving the key.
    pub canvas_id: String,
    /// Key name.
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `ConfigureUserInterface` payload.
pub struct ConfigureUserInterface {
    /// CSS visibility of the layer drop-down menus.
    pub layer_dropdown_visibility: String,
    /// Show the frame-rate counter.
    pub show_frame_rate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Margin around a graph, in pixels.
pub struct MarginValue {
    /// Top margin.
    pub top: f64,
    /// Right margin.
    pub right: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetMargin` payload.
pub struct SetMargin {
    /// Margin.
    pub value: MarginValue,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetTextStyle` payload.
pub struct SetTextStyle {
    /// CSS font family of the labels.
    pub font_family: String,
    /// Size of sparkline names.
    pub name_size_in_pixels: f32,
    /// Size of sparkline values.
    pub value_size_in_pixels: f32,
    /// Placement of the name (`left`, `right`, `top`, `bottom`, `none`).
    pub name_align: String,
    /// Placement of the value.
    pub value_align: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Vertical marker line on a sparkline.
pub struct VerticalRuleValue {
    /// Frame the rule marks.
    pub frame_index: i64,
    /// Line color, `#rrggbb`.
    pub stroke_style: String,
    /// Line width in pixels.
    pub line_width: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `AddSparkline` payload.
pub struct AddSparkline {
    /// Encoded `f32` column of values, one per frame.
    pub value_buffer: String,
    /// Measured quantity.
    pub name: String,
    /// Line color, `#rrggbb`.
    pub stroke_style: String,
    /// Line width in pixels.
    pub line_width: f32,
    /// Marker lines.
    pub vertical_rules: Vec<VerticalRuleValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `AddTextPanel` payload.
pub struct AddTextPanel {
    /// Panel identifier.
    pub text_panel_id: String,
    /// Show an input box under the text.
    pub add_input_box: bool,
    /// Host element id in the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// Text sent to one part of a text panel.
pub struct TextPanelText {
    /// Panel identifier.
    pub text_panel_id: String,
    /// Text (HTML allowed in the body).
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `AddDropDownMenu` payload.
pub struct AddDropDownMenu {
    /// Menu identifier.
    pub drop_down_menu_id: String,
    /// Initial title.
    pub title: String,
    /// Host element id in the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetDropDownMenuTitle` payload.
pub struct DropDownMenuTitle {
    /// Menu identifier.
    pub drop_down_menu_id: String,
    /// Title.
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetDropDownMenuItems` payload.
pub struct DropDownMenuItems {
    /// Menu identifier.
    pub drop_down_menu_id: String,
    /// Entries in display order.
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetDropDownMenuSelection` payload.
pub struct DropDownMenuSelection {
    /// Menu identifier.
    pub drop_down_menu_id: String,
    /// Selected entry.
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
/// `SetDropDownMenuItemDisabled` payload.
pub struct DropDownMenuItemDisabled {
    /// Menu identifier.
    pub drop_down_menu_id: String,
    /// Entry index.
    pub index: u32,
    /// Whether the entry is greyed out.
    pub disable: bool,
}

/// Compact JSON bytes per `CommandType`.
///
/// Canvas and frame scopes are not counted themselves; their nested commands are.
pub fn measure_command_sizes(commands: &[Command]) -> SceneResult<BTreeMap<String, usize>> {
    fn walk(commands: &[Command], sizes: &mut BTreeMap<String, usize>) -> SceneResult<()> {
        for command in commands {
            if matches!(command, Command::CanvasCommands(_) | Command::FrameCommands(_)) {
                walk(command.nested(), sizes)?;
            } else {
                let size = serde_json::to_vec(command)?.len();
                *sizes.entry(command.command_type().to_string()).or_default() += size;
            }
        }
        Ok(())
    }

    let mut sizes = BTreeMap::new();
    walk(commands, &mut sizes)?;
    Ok(sizes)
}

#[cfg(test)]
#[path = "../../tests/unit/script/command.rs"]
mod tests;
