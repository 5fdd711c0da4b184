//! Loop subdivision as a precomputed sparse linear operator.
//!
//! A [`LoopSubdivisionStencil`] is built once from a triangle topology. Every output vertex is a
//! weighted sum of the *input* vertices, so animating a mesh with fixed topology only costs one
//! sparse matrix product per frame.

use std::collections::HashMap;
use std::f64::consts::PI;

use glam::Vec3;
use rayon::prelude::*;

use crate::foundation::error::{SceneError, SceneResult};
use crate::geometry::vertex_buffer::{VertexAttribute, VertexBuffer};

/// Compressed sparse rows of `f64` weights.
#[derive(Clone, Debug, PartialEq)]
struct SparseRows {
    offsets: Vec<usize>,
    columns: Vec<u32>,
    weights: Vec<f64>,
    cols: usize,
}

impl SparseRows {
    fn new(cols: usize) -> Self {
        Self {
            offsets: vec![0],
            columns: Vec::new(),
            weights: Vec::new(),
            cols,
        }
    }

    fn identity(n: usize) -> Self {
        let mut out = Self::new(n);
        for v in 0..n {
            out.push_row(&[(v as u32, 1.0)]);
        }
        out
    }

    fn push_row(&mut self, entries: &[(u32, f64)]) {
        for &(col, w) in entries {
            self.columns.push(col);
            self.weights.push(w);
        }
        self.offsets.push(self.columns.len());
    }

    fn rows(&self) -> usize {
        self.offsets.len() - 1
    }

    fn row(&self, r: usize) -> impl Iterator<Item = (u32, f64)> + '_ {
        let span = self.offsets[r]..self.offsets[r + 1];
        self.columns[span.clone()]
            .iter()
            .copied()
            .zip(self.weights[span].iter().copied())
    }

    /// `self · inner`: rows of `self` index rows of `inner`.
    fn compose(&self, inner: &SparseRows) -> SparseRows {
        let mut out = SparseRows::new(inner.cols);
        let mut acc = vec![0.0f64; inner.cols];
        let mut seen = vec![false; inner.cols];
        let mut touched: Vec<u32> = Vec::new();
        for r in 0..self.rows() {
            for (k, w) in self.row(r) {
                for (j, v) in inner.row(k as usize) {
                    let slot = j as usize;
                    if !seen[slot] {
                        seen[slot] = true;
                        touched.push(j);
                    }
                    acc[slot] += w * v;
                }
            }
            touched.sort_unstable();
            for &j in &touched {
                let slot = j as usize;
                out.columns.push(j);
                out.weights.push(acc[slot]);
                acc[slot] = 0.0;
                seen[slot] = false;
            }
            out.offsets.push(out.columns.len());
            touched.clear();
        }
        out
    }
}

#[derive(Clone, Copy, Debug)]
struct Edge {
    lo: u32,
    hi: u32,
    opposite: [u32; 2],
    faces: u8,
}

/// Edge and one-ring adjacency of a triangle mesh.
struct Topology {
    edges: Vec<Edge>,
    edge_index: HashMap<(u32, u32), usize>,
    neighbors: Vec<Vec<u32>>,
    boundary: Vec<Vec<u32>>,
}

impl Topology {
    fn analyze(triangles: &[[u32; 3]], vertex_count: usize) -> SceneResult<Self> {
        let mut edges: Vec<Edge> = Vec::with_capacity(triangles.len() * 3 / 2 + 1);
        let mut edge_index: HashMap<(u32, u32), usize> = HashMap::with_capacity(edges.capacity());

        for (t, tri) in triangles.iter().enumerate() {
            if let Some(&v) = tri.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(SceneError::invalid_topology(format!(
                    "triangle {t} references vertex {v} but the mesh has {vertex_count} vertices"
                )));
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
                return Err(SceneError::invalid_topology(format!(
                    "triangle {t} {tri:?} repeats a vertex"
                )));
            }
            for (a, b, c) in [
                (tri[0], tri[1], tri[2]),
                (tri[1], tri[2], tri[0]),
                (tri[2], tri[0], tri[1]),
            ] {
                let key = (a.min(b), a.max(b));
                match edge_index.get(&key) {
                    Some(&e) => {
                        let edge = &mut edges[e];
                        if edge.faces >= 2 {
                            return Err(SceneError::invalid_topology(format!(
                                "edge ({}, {}) is shared by more than two triangles (triangle {t})",
                                key.0, key.1
                            )));
                        }
                        edge.opposite[1] = c;
                        edge.faces = 2;
                    }
                    None => {
                        edge_index.insert(key, edges.len());
                        edges.push(Edge {
                            lo: key.0,
                            hi: key.1,
                            opposite: [c, c],
                            faces: 1,
                        });
                    }
                }
            }
        }

        let mut neighbors = vec![Vec::new(); vertex_count];
        let mut boundary = vec![Vec::new(); vertex_count];
        for edge in &edges {
            neighbors[edge.lo as usize].push(edge.hi);
            neighbors[edge.hi as usize].push(edge.lo);
            if edge.faces == 1 {
                boundary[edge.lo as usize].push(edge.hi);
                boundary[edge.hi as usize].push(edge.lo);
            }
        }
        if let Some(v) = neighbors.iter().position(Vec::is_empty) {
            return Err(SceneError::invalid_topology(format!(
                "vertex {v} has no incident triangles"
            )));
        }

        Ok(Self {
            edges,
            edge_index,
            neighbors,
            boundary,
        })
    }

    fn edge_of(&self, a: u32, b: u32) -> usize {
        // Every triangle edge was registered by `analyze`.
        self.edge_index
            .get(&(a.min(b), a.max(b)))
            .copied()
            .unwrap_or_default()
    }
}

/// Loop's vertex blend weight for valence `n`.
fn loop_alpha(n: usize) -> f64 {
    let c = 3.0 / 8.0 + 0.25 * (2.0 * PI / n as f64).cos();
    5.0 / 8.0 - c * c
}

/// One-step smoothing weights for an original vertex.
fn smoothing_row(v: u32, topo: &Topology) -> Vec<(u32, f64)> {
    let ring = &topo.neighbors[v as usize];
    match topo.boundary[v as usize].as_slice() {
        [] => {
            let n = ring.len();
            let alpha = loop_alpha(n);
            let mut row = Vec::with_capacity(n + 1);
            row.push((v, 1.0 - alpha));
            row.extend(ring.iter().map(|&u| (u, alpha / n as f64)));
            row
        }
        [b0, b1] => vec![(v, 0.75), (*b0, 0.125), (*b1, 0.125)],
        // Non-manifold boundary vertex: pinned.
        _ => vec![(v, 1.0)],
    }
}

/// Limit-surface weights for a vertex.
fn limit_row(v: u32, topo: &Topology) -> Vec<(u32, f64)> {
    let ring = &topo.neighbors[v as usize];
    match topo.boundary[v as usize].as_slice() {
        [] => {
            let n = ring.len() as f64;
            let val = 3.0 + 2.0 * (2.0 * PI / n).cos();
            let omega = 24.0 * n / (40.0 - val * val);
            let mut row = Vec::with_capacity(ring.len() + 1);
            row.push((v, omega / (omega + n)));
            row.extend(ring.iter().map(|&u| (u, 1.0 / (omega + n))));
            row
        }
        [b0, b1] => vec![(v, 2.0 / 3.0), (*b0, 1.0 / 6.0), (*b1, 1.0 / 6.0)],
        _ => vec![(v, 1.0)],
    }
}

/// One Loop step: weights from the current vertices and the refined triangles.
fn loop_step(
    triangles: &[[u32; 3]],
    topo: &Topology,
    vertex_count: usize,
) -> (SparseRows, Vec<[u32; 3]>) {
    let mut rows = SparseRows::new(vertex_count);
    for v in 0..vertex_count {
        rows.push_row(&smoothing_row(v as u32, topo));
    }
    for edge in &topo.edges {
        if edge.faces == 2 {
            rows.push_row(&[
                (edge.lo, 3.0 / 8.0),
                (edge.hi, 3.0 / 8.0),
                (edge.opposite[0], 1.0 / 8.0),
                (edge.opposite[1], 1.0 / 8.0),
            ]);
        } else {
            rows.push_row(&[(edge.lo, 0.5), (edge.hi, 0.5)]);
        }
    }

    let base = vertex_count as u32;
    let mut refined = Vec::with_capacity(triangles.len() * 4);
    for &[a, b, c] in triangles {
        let ab = base + topo.edge_of(a, b) as u32;
        let bc = base + topo.edge_of(b, c) as u32;
        let ca = base + topo.edge_of(c, a) as u32;
        refined.push([a, ab, ca]);
        refined.push([ab, b, bc]);
        refined.push([ca, bc, c]);
        refined.push([ab, bc, ca]);
    }
    (rows, refined)
}

/// Precomputed Loop subdivision operator for one triangle topology.
#[derive(Clone, Debug)]
pub struct LoopSubdivisionStencil {
    weights: SparseRows,
    triangles: Vec<[u32; 3]>,
    input_vertex_count: usize,
    steps: u32,
    project_to_limit: bool,
}

impl LoopSubdivisionStencil {
    /// Precompute `steps` rounds of Loop subdivision, optionally projecting every output vertex
    /// onto the limit surface.
    ///
    /// The input vertex count is `max(index) + 1`; every vertex below it must belong to a
    /// triangle.
    #[tracing::instrument(skip(triangles), fields(triangles = triangles.len()))]
    pub fn build(triangles: &[[u32; 3]], steps: u32, project_to_limit: bool) -> SceneResult<Self> {
        if steps == 0 && !project_to_limit {
            return Err(SceneError::validation(
                "subdivision needs steps >= 1 or project_to_limit",
            ));
        }
        let Some(max_index) = triangles.iter().flatten().copied().max() else {
            return Err(SceneError::invalid_topology("mesh has no triangles"));
        };
        let input_vertex_count = max_index as usize + 1;

        let mut current = triangles.to_vec();
        let mut vertex_count = input_vertex_count;
        let mut weights = SparseRows::identity(input_vertex_count);
        for step in 0..steps {
            let topo = Topology::analyze(&current, vertex_count)?;
            let (rows, refined) = loop_step(&current, &topo, vertex_count);
            weights = if step == 0 {
                rows
            } else {
                rows.compose(&weights)
            };
            vertex_count = weights.rows();
            current = refined;
        }

        if project_to_limit {
            let topo = Topology::analyze(&current, vertex_count)?;
            let mut limit = SparseRows::new(vertex_count);
            for v in 0..vertex_count {
                limit.push_row(&limit_row(v as u32, &topo));
            }
            weights = limit.compose(&weights);
        }

        tracing::debug!(
            input_vertices = input_vertex_count,
            output_vertices = weights.rows(),
            output_triangles = current.len(),
            "built loop subdivision stencil"
        );
        Ok(Self {
            weights,
            triangles: current,
            input_vertex_count,
            steps,
            project_to_limit,
        })
    }

    /// Vertex count the stencil expects in [`Self::apply`].
    pub fn input_vertex_count(&self) -> usize {
        self.input_vertex_count
    }

    /// Output vertex count.
    pub fn vertex_count(&self) -> usize {
        self.weights.rows()
    }

    /// Output triangle count.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Output topology.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Number of subdivision rounds.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Whether output vertices sit on the limit surface.
    pub fn projects_to_limit(&self) -> bool {
        self.project_to_limit
    }

    /// `(input vertex, weight)` pairs for one output vertex, ordered by input index when more
    /// than one round was composed.
    pub fn weights(&self, output_vertex: usize) -> Option<Vec<(usize, f64)>> {
        if output_vertex >= self.weights.rows() {
            return None;
        }
        Some(
            self.weights
                .row(output_vertex)
                .map(|(j, w)| (j as usize, w))
                .collect(),
        )
    }

    /// Subdivide `positions` (one per input vertex). Returns the new positions and the
    /// precomputed triangles.
    pub fn apply(&self, positions: &[Vec3]) -> SceneResult<(Vec<Vec3>, &[[u32; 3]])> {
        let flat: Vec<f32> = positions.iter().flat_map(|p| p.to_array()).collect();
        let out = self.apply_flat(&flat, 3, positions.len())?;
        let points = out
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();
        Ok((points, &self.triangles))
    }

    /// Subdivide every column of a vertex buffer. Normals are renormalized afterwards.
    pub fn apply_to_buffer(&self, buffer: &VertexBuffer) -> SceneResult<VertexBuffer> {
        let cols = buffer.cols();
        let data = self.apply_flat(buffer.as_slice(), cols, buffer.rows())?;
        let mut out = buffer.with_data(data)?;
        if out.has(VertexAttribute::Normal) {
            let mut normals = out.slice_mut(VertexAttribute::Normal)?;
            for n in normals.iter_mut() {
                let v = Vec3::new(n[0], n[1], n[2]).normalize_or_zero();
                n.copy_from_slice(&v.to_array());
            }
        }
        Ok(out)
    }

    fn apply_flat(&self, values: &[f32], cols: usize, rows: usize) -> SceneResult<Vec<f32>> {
        if rows != self.input_vertex_count {
            return Err(SceneError::shape_mismatch(
                "loop subdivision stencil",
                self.input_vertex_count,
                rows,
            ));
        }
        let mut out = vec![0.0f32; self.weights.rows() * cols];
        if cols == 0 {
            return Ok(out);
        }
        out.par_chunks_mut(cols)
            .enumerate()
            .for_each(|(row, dst)| {
                for (c, slot) in dst.iter_mut().enumerate() {
                    let sum: f64 = self
                        .weights
                        .row(row)
                        .map(|(j, w)| w * f64::from(values[j as usize * cols + c]))
                        .sum();
                    *slot = sum as f32;
                }
            });
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/stencil.rs"]
mod tests;
