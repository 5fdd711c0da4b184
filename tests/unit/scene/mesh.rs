use super::*;
use crate::script::codec::decode_matrix;

fn triangle_mesh() -> Mesh {
    let mut mesh = Mesh::new("tri").with_shared_color(Color::RED).unwrap();
    mesh.add_mesh_without_normals(
        &[Vec3::ZERO, Vec3::X, Vec3::Y],
        &[[0, 1, 2]],
        None,
        None,
        Mat4::IDENTITY,
    )
    .unwrap();
    mesh
}

#[test]
fn layout_follows_color_and_texture() {
    assert_eq!(Mesh::new("a").layout(), VertexLayout::Colored);
    assert_eq!(
        Mesh::new("b")
            .with_shared_color(Color::BLUE)
            .unwrap()
            .layout(),
        VertexLayout::Plain
    );
    assert_eq!(
        Mesh::new("c").with_texture("Image-0").unwrap().layout(),
        VertexLayout::Textured
    );
}

#[test]
fn color_cannot_change_after_geometry() {
    let mesh = triangle_mesh();
    let err = mesh.with_texture("Image-0").unwrap_err();
    assert!(matches!(err, SceneError::InvalidState(_)));
}

#[test]
fn computed_normals_face_the_winding_direction() {
    let mesh = triangle_mesh();
    let normals = mesh
        .vertex_buffer()
        .slice(VertexAttribute::Normal)
        .unwrap()
        .to_vec3s();
    for n in normals {
        assert!((n - Vec3::Z).length() < 1e-6);
    }
}

#[test]
fn reversing_winding_flips_computed_normals() {
    let mut mesh = triangle_mesh();
    mesh.reverse_triangle_order();
    assert_eq!(mesh.triangles(), &[[0, 2, 1]]);
    mesh.compute_normals();
    let n = mesh.vertex_buffer().slice(VertexAttribute::Normal).unwrap().to_vec3s()[0];
    assert!((n + Vec3::Z).length() < 1e-6);
}

#[test]
fn per_vertex_colors_are_required_without_shared_color() {
    let mut mesh = Mesh::new("colored");
    let err = mesh
        .add_mesh_without_normals(&[Vec3::ZERO, Vec3::X, Vec3::Y], &[[0, 1, 2]], None, None, Mat4::IDENTITY)
        .unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));

    let colors = [Color::RED, Color::GREEN, Color::BLUE];
    mesh.add_mesh_without_normals(
        &[Vec3::ZERO, Vec3::X, Vec3::Y],
        &[[0, 1, 2]],
        Some(&colors),
        None,
        Mat4::IDENTITY,
    )
    .unwrap();
    let stored = mesh.vertex_buffer().slice(VertexAttribute::Color).unwrap().to_vec3s();
    assert_eq!(stored[1], Vec3::new(0.0, 1.0, 0.0));
}

#[test]
fn mismatched_input_lengths_are_shape_errors() {
    let mut mesh = Mesh::new("m").with_shared_color(Color::WHITE).unwrap();
    let err = mesh
        .add_mesh_with_normals(
            &[Vec3::ZERO, Vec3::X, Vec3::Y],
            &[Vec3::Z],
            &[[0, 1, 2]],
            None,
            None,
            Mat4::IDENTITY,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SceneError::ShapeMismatch {
            expected: 3,
            actual: 1,
            ..
        }
    ));
    assert_eq!(mesh.vertex_count(), 0);
}

#[test]
fn out_of_bounds_triangle_indices_are_rejected() {
    let mut mesh = Mesh::new("m").with_shared_color(Color::WHITE).unwrap();
    let err = mesh
        .add_mesh_without_normals(&[Vec3::ZERO, Vec3::X], &[[0, 1, 2]], None, None, Mat4::IDENTITY)
        .unwrap_err();
    assert!(err.to_string().contains("index 2"));
}

#[test]
fn appending_offsets_indices() {
    let mut mesh = triangle_mesh();
    let other = triangle_mesh();
    mesh.append_mesh(&other).unwrap();
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.triangles(), &[[0, 1, 2], [3, 4, 5]]);
}

#[test]
fn transform_moves_positions_and_rotates_normals() {
    let mut mesh = triangle_mesh();
    mesh.apply_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)) * Mat4::from_scale(Vec3::splat(2.0)));
    assert_eq!(mesh.positions()[1], Vec3::new(2.0, 0.0, 2.0));

    mesh.apply_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
    let n = mesh.vertex_buffer().slice(VertexAttribute::Normal).unwrap().to_vec3s()[0];
    assert!((n - Vec3::X).length() < 1e-5);
}

#[test]
fn center_of_mass_is_the_vertex_mean() {
    let mesh = triangle_mesh();
    let c = mesh.center_of_mass();
    assert!((c - Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-6);
    assert_eq!(Mesh::new("empty").center_of_mass(), Vec3::ZERO);
}

#[test]
fn wireframe_adds_each_edge_once() {
    let mut mesh = Mesh::new("quad").with_shared_color(Color::WHITE).unwrap();
    mesh.add_mesh_without_normals(
        &[Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
        &[[0, 1, 2], [0, 2, 3]],
        None,
        None,
        Mat4::IDENTITY,
    )
    .unwrap();
    mesh.add_wireframe();
    assert_eq!(mesh.lines().len(), 5);
    mesh.add_wireframe();
    assert_eq!(mesh.lines().len(), 5);
}

#[test]
fn instancing_validates_lengths_and_blocks_new_geometry() {
    let mut mesh = triangle_mesh();
    let positions = [Vec3::ZERO, Vec3::X];
    let err = mesh
        .enable_instancing(&positions, Some(&[Quat::IDENTITY]), None)
        .unwrap_err();
    assert!(matches!(err, SceneError::ShapeMismatch { .. }));

    mesh.enable_instancing(&positions, None, Some(&[Color::RED, Color::BLUE]))
        .unwrap();
    assert_eq!(mesh.instance_count(), Some(2));
    let buffer = mesh.instance_buffer().unwrap();
    assert_eq!(buffer.cols(), 6);
    assert!(!buffer.has(VertexAttribute::Rotation));

    let other = triangle_mesh();
    assert!(matches!(
        mesh.append_mesh(&other),
        Err(SceneError::InvalidState(_))
    ));
}

#[test]
fn define_command_encodes_buffers() {
    let mesh = triangle_mesh().with_layer("geometry").double_sided(true);
    let Command::DefineMesh(def) = mesh.to_command().unwrap() else {
        panic!("expected DefineMesh");
    };
    assert_eq!(def.mesh_id, "tri");
    assert_eq!(def.layer_id.as_deref(), Some("geometry"));
    assert!(def.double_sided);
    assert_eq!(def.definition.primitive_type, PrimitiveType::SingleColorMesh);
    assert_eq!(def.definition.index_buffer_type, IndexBufferType::UInt16);
    assert_eq!(def.definition.color.as_deref(), Some("#ff0000"));

    let (vertices, rows, cols) = decode_matrix::<f32>(&def.definition.vertex_buffer).unwrap();
    assert_eq!((rows, cols), (3, 6));
    assert_eq!(vertices, mesh.vertex_buffer().as_slice());
    let (tris, rows, cols) = decode_matrix::<u16>(&def.definition.triangle_buffer).unwrap();
    assert_eq!((rows, cols), (1, 3));
    assert_eq!(tris, vec![0, 1, 2]);
}

#[test]
fn empty_layer_id_means_no_layer() {
    let mesh = Mesh::new("m").with_layer("");
    assert_eq!(mesh.layer_id(), None);
}
