use super::*;

fn tetrahedron() -> (Vec<Vec3>, Vec<[u32; 3]>) {
    (
        vec![
            Vec3::new(-0.5, -0.32476, -0.20412),
            Vec3::new(0.5, -0.32476, -0.20412),
            Vec3::new(0.0, 0.541266, -0.20412),
            Vec3::new(0.0, 0.108253, 0.612372),
        ],
        vec![[0, 1, 3], [1, 2, 3], [2, 0, 3], [0, 2, 1]],
    )
}

#[test]
fn compose_multiplies_rows() {
    let mut outer = SparseRows::new(2);
    outer.push_row(&[(0, 0.5), (1, 0.5)]);
    let mut inner = SparseRows::new(3);
    inner.push_row(&[(2, 1.0)]);
    inner.push_row(&[(0, 0.5), (2, 0.5)]);
    let c = outer.compose(&inner);
    assert_eq!(c.rows(), 1);
    assert_eq!(c.row(0).collect::<Vec<_>>(), vec![(0, 0.25), (2, 0.75)]);
}

#[test]
fn loop_alpha_matches_regular_valence() {
    assert!((loop_alpha(6) - 1.0 / 16.0 * 6.0).abs() < 1e-12);
    assert!((loop_alpha(3) - 9.0 / 16.0).abs() < 1e-12);
}

#[test]
fn every_output_row_is_an_affine_combination() {
    let (_, tris) = tetrahedron();
    for (steps, limit) in [(1, false), (2, false), (1, true), (0, true)] {
        let s = LoopSubdivisionStencil::build(&tris, steps, limit).unwrap();
        for v in 0..s.vertex_count() {
            let sum: f64 = s.weights(v).unwrap().iter().map(|(_, w)| w).sum();
            assert!((sum - 1.0).abs() < 1e-12, "row {v} sums to {sum}");
        }
        assert!(s.weights(s.vertex_count()).is_none());
    }
}

#[test]
fn boundary_edges_use_midpoints_and_crease_rule() {
    let tris = [[0u32, 1, 2]];
    let s = LoopSubdivisionStencil::build(&tris, 1, false).unwrap();
    assert_eq!(s.vertex_count(), 6);
    assert_eq!(s.triangle_count(), 4);
    let points = vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0)];
    let (out, _) = s.apply(&points).unwrap();
    // First edge vertex splits (0, 1).
    assert!(out[3].abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
    // Corner: 3/4 self + 1/8 per boundary neighbour.
    assert!(out[0].abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
}

#[test]
fn refined_triangles_reference_edge_vertices() {
    let tris = [[0u32, 1, 2]];
    let s = LoopSubdivisionStencil::build(&tris, 1, false).unwrap();
    // Edges are numbered in first-appearance order: (0,1)=3, (1,2)=4, (2,0)=5.
    assert_eq!(
        s.triangles(),
        &[[0, 3, 5], [3, 1, 4], [5, 4, 2], [3, 4, 5]]
    );
}

#[test]
fn limit_projection_of_tetrahedron_uses_valence_three_mask() {
    let (_, tris) = tetrahedron();
    let s = LoopSubdivisionStencil::build(&tris, 0, true).unwrap();
    assert_eq!(s.vertex_count(), 4);
    let row = s.weights(0).unwrap();
    assert_eq!(row.len(), 4);
    for (j, w) in row {
        let expected = if j == 0 { 0.4 } else { 0.2 };
        assert!((w - expected).abs() < 1e-12);
    }
}

#[test]
fn edge_shared_by_three_triangles_is_rejected() {
    let tris = [[0u32, 1, 2], [1, 0, 3], [0, 1, 4]];
    let err = LoopSubdivisionStencil::build(&tris, 1, false).unwrap_err();
    assert!(matches!(err, SceneError::InvalidTopology(_)));
    assert!(err.to_string().contains("(0, 1)"));
}

#[test]
fn vertex_without_faces_is_rejected() {
    let tris = [[0u32, 1, 3]];
    let err = LoopSubdivisionStencil::build(&tris, 1, false).unwrap_err();
    assert!(matches!(err, SceneError::InvalidTopology(_)));
    assert!(err.to_string().contains("vertex 2"));
}

#[test]
fn degenerate_inputs_are_rejected() {
    assert!(matches!(
        LoopSubdivisionStencil::build(&[], 1, false),
        Err(SceneError::InvalidTopology(_))
    ));
    assert!(matches!(
        LoopSubdivisionStencil::build(&[[0, 0, 1]], 1, false),
        Err(SceneError::InvalidTopology(_))
    ));
    assert!(matches!(
        LoopSubdivisionStencil::build(&[[0, 1, 2]], 0, false),
        Err(SceneError::Validation(_))
    ));
}

#[test]
fn apply_checks_row_count() {
    let (points, tris) = tetrahedron();
    let s = LoopSubdivisionStencil::build(&tris, 1, false).unwrap();
    let err = s.apply(&points[..3]).unwrap_err();
    assert!(matches!(
        err,
        SceneError::ShapeMismatch {
            expected: 4,
            actual: 3,
            ..
        }
    ));
}

#[test]
fn apply_to_buffer_interpolates_all_columns() {
    let (points, tris) = tetrahedron();
    let s = LoopSubdivisionStencil::build(&tris, 1, false).unwrap();
    let mut data = Vec::new();
    for p in &points {
        data.extend_from_slice(&p.to_array());
        data.extend_from_slice(&p.normalize().to_array());
        data.extend_from_slice(&[0.2, 0.4, 0.6]);
    }
    let vb = VertexBuffer::from_packed(data, 9).unwrap();
    let out = s.apply_to_buffer(&vb).unwrap();
    assert_eq!(out.rows(), 10);
    assert_eq!(out.cols(), 9);
    for n in out.slice(VertexAttribute::Normal).unwrap().iter() {
        let len = Vec3::new(n[0], n[1], n[2]).length();
        assert!((len - 1.0).abs() < 1e-5);
    }
    for c in out.slice(VertexAttribute::Color).unwrap().iter() {
        assert!((c[1] - 0.4).abs() < 1e-6);
    }
}
