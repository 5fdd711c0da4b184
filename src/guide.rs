//! # scenescript guide (v0.1.0)
//!
//! This module is a standalone walkthrough of scenescript's data flow and public API. It is meant
//! as a shared mental model of what "a scene" is before you read individual types.
//!
//! If you are looking for copy/paste commands, start with the repository `README.md`.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Scene`](crate::Scene): a resource table plus an append-only command log
//! - [`Mesh`](crate::Mesh): named triangle/line geometry with a packed [`VertexBuffer`](crate::VertexBuffer)
//! - [`MeshUpdate`](crate::MeshUpdate): one frame of a mesh's animation (positions, normals,
//!   colors, or instance data)
//! - [`LoopSubdivisionStencil`](crate::LoopSubdivisionStencil): Loop subdivision precomputed as a
//!   sparse linear operator
//! - [`Command`](crate::Command): one entry of the serialized script
//!
//! The authoring pipeline is explicitly staged:
//!
//! 1. Define resources: [`Scene::define_mesh`](crate::Scene::define_mesh),
//!    [`Scene::define_image`](crate::Scene::define_image), [`Scene::create_label`](crate::Scene::create_label)
//! 2. Lay out canvases and frames: [`Scene::create_canvas_3d`](crate::Scene::create_canvas_3d),
//!    [`Scene::add_frame_3d`](crate::Scene::add_frame_3d)
//! 3. Animate: [`Scene::update_mesh`](crate::Scene::update_mesh) and friends
//! 4. Compress: [`Scene::quantize_updates`](crate::Scene::quantize_updates)
//! 5. Deliver: [`Scene::save_as_html`](crate::Scene::save_as_html),
//!    [`Scene::save_as_script`](crate::Scene::save_as_script), [`Scene::json`](crate::Scene::json)
//!
//! ---
//!
//! ## Vertex layouts
//!
//! Mesh vertices live in one row-major `f32` matrix whose columns are fixed by a
//! [`VertexLayout`](crate::VertexLayout):
//!
//! - `Plain`: position, normal (6 columns, shared-color meshes)
//! - `Colored`: position, normal, color (9 columns)
//! - `Textured`: position, normal, uv (8 columns)
//!
//! Columns are addressed through [`VertexAttribute`](crate::VertexAttribute) slices; asking for an
//! attribute a buffer does not carry is an [`OutOfRange`](crate::SceneError::OutOfRange) error.
//! Because the layout follows from color and texture, set those before adding geometry.
//!
//! ---
//!
//! ## Subdivision stencils
//!
//! A stencil is built once from triangle topology and then applied to any number of position sets
//! with that topology:
//!
//! ```rust,no_run
//! use scenescript::{LoopSubdivisionStencil, Vec3};
//!
//! # fn main() -> scenescript::SceneResult<()> {
//! let triangles = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
//! let stencil = LoopSubdivisionStencil::build(&triangles, 1, false)?;
//! assert_eq!(stencil.vertex_count(), 10);
//! assert_eq!(stencil.triangle_count(), 16);
//!
//! let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
//! let (subdivided, faces) = stencil.apply(&positions)?;
//! assert_eq!((subdivided.len(), faces.len()), (10, 16));
//! # Ok(())
//! # }
//! ```
//!
//! Applying a stencil is linear in the positions and bit-for-bit deterministic, which is what makes
//! per-frame subdivision of an animated mesh cheap.
//!
//! ---
//!
//! ## Animation and quantization
//!
//! Each update gets a per-base-mesh `frame_index`. [`Scene::quantize_updates`](crate::Scene::quantize_updates)
//! walks every base mesh's stream in that order:
//!
//! - the first update is a full-precision **keyframe**
//! - later updates become 16-bit **deltas** against the active keyframe while their span fits
//!   `QUANTIZATION_BINS * threshold`
//! - an update whose delta does not fit (or that exceeds the per-keyframe delta budget) becomes
//!   the next keyframe
//!
//! Deltas always reference a keyframe, never another delta, so errors do not accumulate. The
//! full-precision data is retained, so quantizing again with a different budget is allowed.
//!
//! ```rust,no_run
//! use scenescript::{Color, Mat4, Scene, Vec3};
//!
//! # fn main() -> scenescript::SceneResult<()> {
//! let mut scene = Scene::new("wave");
//! let mut tri = scene.create_mesh("tri");
//! let base = [Vec3::ZERO, Vec3::X, Vec3::Y];
//! tri.add_mesh_without_normals(&base, &[[0, 1, 2]], Some(&[Color::RED; 3]), None, Mat4::IDENTITY)?;
//! scene.define_mesh(tri)?;
//!
//! for i in 0..20 {
//!     let y = 0.05 * i as f32;
//!     scene.update_mesh_positions("tri", &[Vec3::ZERO, Vec3::X, Vec3::new(0.0, y, 0.0)], None)?;
//! }
//! let report = scene.quantize_updates(1e-5)?;
//! assert_eq!(report["tri"].keyframe_count, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ## Chunked delivery
//!
//! [`Scene::clear_script`](crate::Scene::clear_script) truncates the command log. Ids defined
//! before the clear stay valid on both sides, so a long animation can be streamed as a sequence of
//! scripts that only carry new frames. After a clear the session header is no longer emitted and
//! `save_as_html` is refused, since a page needs the whole scene.
//!
//! ---
//!
//! ## Wire format
//!
//! The script is a JSON array of objects tagged by `CommandType` with PascalCase payload fields.
//! Numeric matrices are little-endian, zlib-compressed and base64-encoded, with a five byte trailer
//! carrying the row and column counts (see [`encode_matrix`](crate::encode_matrix)).
