//! scenescript builds 3D/2D scenes and animations and serializes them as a compact command
//! script for a browser viewer.
//!
//! # Pipeline overview
//!
//! 1. **Author**: build [`Mesh`]es from primitives or raw geometry, optionally subdivided through a
//!    precomputed [`LoopSubdivisionStencil`]
//! 2. **Animate**: log per-frame [`MeshUpdate`]s and place meshes in canvas frames on a [`Scene`]
//! 3. **Quantize**: [`Scene::quantize_updates`] turns update streams into full-precision keyframes
//!    and 16-bit deltas within an error budget
//! 4. **Deliver**: write the command log as JSON, a JS loader or an HTML page
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Order-preserving log**: serialization is a projection of the command log; it computes nothing.
//! - **Chunked delivery**: [`Scene::clear_script`] truncates the log but keeps every resource id valid.
//!
//! For a walkthrough of the concepts, see [`crate::guide`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;
mod geometry;
mod scene;
mod script;

/// High-level documentation of scenescript's concepts and data flow.
pub mod guide;

pub use foundation::color::Color;
pub use foundation::error::{SceneError, SceneResult};
pub use foundation::math::{
    Mat3, Mat4, Quat, Vec3, from_row_major, normal_matrix, rotation_about_x, rotation_about_y,
    rotation_about_z, rotation_to_align_x_to_axis, row_major, scale, translate, uniform_scale,
};
pub use geometry::obj::{MeshData, load_obj, parse_obj};
pub use geometry::primitives::PrimitiveStyle;
pub use geometry::stencil::LoopSubdivisionStencil;
pub use geometry::vertex_buffer::{
    AttributeView, AttributeViewMut, VertexAttribute, VertexBuffer, VertexLayout,
};
pub use kurbo::{Circle, Point, Rect};
pub use scene::camera::{Camera, FocusPoint};
pub use scene::canvas::{
    Canvas2D, Canvas3D, Frame2D, Frame3D, LayerSettings, Placement, PositionType, ShapeStyle,
    Shading, UiParameters,
};
pub use scene::graph::{Graph, GraphTextAlign, Margin, Sparkline, VerticalRule};
pub use scene::label::{HorizontalAlign, Label, VerticalAlign};
pub use scene::media::{Image, MediaKind, MediaTrack};
pub use scene::mesh::Mesh;
pub use scene::mesh_update::{MeshUpdate, QuantizedDelta, UpdateFlags, UpdateKind};
pub use scene::panel::{DropDownMenu, TextPanel};
pub use scene::quantize::{
    Assignment, KeyframeState, QUANTIZATION_BINS, QuantizationInfo, QuantizeOpts,
};
pub use scene::session::{LabelIds, Scene, SceneProperties, Visibility};
pub use script::codec::{BufferElement, decode_bytes, decode_matrix, encode_bytes, encode_matrix};
pub use script::command::{Command, measure_command_sizes};
pub use script::html::{HtmlOpts, VIEWER_ENTRY_POINT, ViewerRuntime};

/// Payload types of every [`Command`] variant.
pub mod commands {
    pub use crate::script::command::*;
}
