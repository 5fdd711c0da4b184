//! Scene resources, mesh animation and the command log.

pub mod camera;
pub mod canvas;
pub mod graph;
pub mod label;
pub mod media;
pub mod mesh;
pub mod mesh_update;
pub mod panel;
pub mod quantize;
pub mod session;
