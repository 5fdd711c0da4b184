//! Vertex storage, subdivision stencils, primitive generators and OBJ import.

pub mod obj;
pub mod primitives;
pub mod stencil;
pub mod vertex_buffer;
