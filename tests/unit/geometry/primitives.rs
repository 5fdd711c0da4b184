use super::*;
use crate::geometry::vertex_buffer::VertexAttribute;

fn shared(id: &str) -> Mesh {
    Mesh::new(id).with_shared_color(Color::GRAY).unwrap()
}

fn normals(mesh: &Mesh) -> Vec<Vec3> {
    mesh.vertex_buffer()
        .slice(VertexAttribute::Normal)
        .unwrap()
        .to_vec3s()
}

#[test]
fn cube_has_flat_outward_faces() {
    let mut mesh = shared("cube");
    mesh.add_cube(&PrimitiveStyle::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 24);
    assert_eq!(mesh.triangles().len(), 12);
    for (p, n) in mesh.positions().into_iter().zip(normals(&mesh)) {
        assert!(p.dot(n) > 0.0, "normal {n} points inward at {p}");
        assert!((p.abs().max_element() - 0.5).abs() < 1e-6);
    }
}

#[test]
fn wireframe_without_fill_outlines_quads() {
    let mut mesh = shared("cube");
    mesh.add_cube(&PrimitiveStyle::default().fill_triangles(false).wireframe(true))
        .unwrap();
    assert!(mesh.triangles().is_empty());
    assert_eq!(mesh.lines().len(), 24);
}

#[test]
fn disc_faces_positive_x() {
    let mut mesh = shared("disc");
    mesh.add_disc(8, &PrimitiveStyle::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 9);
    assert_eq!(mesh.triangles().len(), 8);
    let p = mesh.positions();
    for &[a, b, c] in mesh.triangles() {
        let n = (p[b as usize] - p[a as usize]).cross(p[c as usize] - p[a as usize]);
        assert!(n.x > 0.0);
    }
    assert!(mesh.add_disc(2, &PrimitiveStyle::default()).is_err());
}

#[test]
fn cylinder_has_caps_and_barrel() {
    let mut mesh = shared("cyl");
    mesh.add_cylinder(6, &PrimitiveStyle::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 2 * 7 + 2 * 6);
    assert_eq!(mesh.triangles().len(), 2 * 6 + 2 * 6);
    let p = mesh.positions();
    for &[a, b, c] in mesh.triangles() {
        let (pa, pb, pc) = (p[a as usize], p[b as usize], p[c as usize]);
        let n = (pb - pa).cross(pc - pa);
        let centroid = (pa + pb + pc) / 3.0;
        assert!(n.dot(centroid) > 0.0);
    }
}

#[test]
fn icosphere_counts_and_radius() {
    let (positions, triangles) = icosphere(0);
    assert_eq!((positions.len(), triangles.len()), (12, 20));

    let mut mesh = shared("sphere");
    mesh.add_sphere(&PrimitiveStyle::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 12 + 30 + 120);
    assert_eq!(mesh.triangles().len(), 320);
    for p in mesh.positions() {
        assert!((p.length() - 0.5).abs() < 1e-5);
    }
}

#[test]
fn textured_icosphere_duplicates_seam_vertices() {
    let mut mesh = Mesh::new("globe").with_texture("Image-0").unwrap();
    mesh.add_icosphere(1, &PrimitiveStyle::default()).unwrap();
    assert!(mesh.vertex_count() > 42);
    assert_eq!(mesh.triangles().len(), 80);
    let uvs = mesh
        .vertex_buffer()
        .slice(VertexAttribute::Uv)
        .unwrap()
        .to_flat();
    assert!(uvs.chunks_exact(2).any(|uv| uv[0] > 1.0));
}

#[test]
fn cone_with_apex() {
    let mut mesh = shared("cone");
    mesh.add_cone(1.0, 2, 4, &PrimitiveStyle::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 2 * 4 + 1);
    assert_eq!(mesh.triangles().len(), 8 + 4);
    assert_eq!(mesh.positions()[8], Vec3::new(-0.5, 0.0, 0.0));
    assert!(
        mesh.add_cone(0.0, 2, 4, &PrimitiveStyle::default())
            .is_err()
    );
}

#[test]
fn uv_sphere_skips_pole_slivers() {
    let mut mesh = shared("uv");
    mesh.add_uv_sphere(4, 6, &PrimitiveStyle::default()).unwrap();
    assert_eq!(mesh.vertex_count(), 5 * 6);
    assert_eq!(mesh.triangles().len(), 2 * 6 * 4 - 2 * 6);
}

#[test]
fn thickline_spans_its_endpoints() {
    let mut mesh = shared("beam");
    let start = Vec3::new(1.0, 1.0, 0.0);
    let end = Vec3::new(1.0, 3.0, 0.0);
    mesh.add_thickline(start, end, 0.1, 0.1, &PrimitiveStyle::default())
        .unwrap();
    let ys: Vec<f32> = mesh.positions().iter().map(|p| p.y).collect();
    let min = ys.iter().copied().fold(f32::INFINITY, f32::min);
    let max = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    assert!((min - 1.0).abs() < 1e-5 && (max - 3.0).abs() < 1e-5);
}

#[test]
fn coordinate_axes_convert_shared_color_meshes() {
    let mut mesh = shared("axes");
    mesh.add_cube(&PrimitiveStyle::default()).unwrap();
    mesh.add_coordinate_axes(1.0, 0.1, Mat4::IDENTITY).unwrap();
    assert_eq!(mesh.layout(), VertexLayout::Colored);
    assert_eq!(mesh.shared_color(), None);
    let colors = mesh
        .vertex_buffer()
        .slice(VertexAttribute::Color)
        .unwrap()
        .to_vec3s();
    assert_eq!(colors[0], Vec3::from(Color::GRAY.to_array()));
    assert!(colors.contains(&Vec3::new(1.0, 0.0, 0.0)));

    let mut textured = Mesh::new("t").with_texture("Image-0").unwrap();
    assert!(textured
        .add_coordinate_axes(1.0, 0.1, Mat4::IDENTITY)
        .is_err());
}

#[test]
fn camera_frustum_is_placed_by_camera_pose() {
    let camera = Camera::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
    let mut mesh = shared("frustum");
    mesh.add_camera_frustum(&camera, 1.0, 0.02, &PrimitiveStyle::default())
        .unwrap();
    assert_eq!(mesh.triangles().len(), 8 * 12);
    let max_z = mesh
        .positions()
        .iter()
        .map(|p| p.z)
        .fold(f32::NEG_INFINITY, f32::max);
    assert!(max_z > 4.9 && max_z < 5.1);
}

#[test]
fn lines_emit_segments_only() {
    let mut mesh = Mesh::new("lines");
    mesh.add_lines(
        &[(Vec3::ZERO, Vec3::X), (Vec3::Y, Vec3::Z)],
        &PrimitiveStyle::colored(Color::RED),
    )
    .unwrap();
    assert_eq!(mesh.lines(), &[[0, 1], [2, 3]]);
    assert!(mesh.triangles().is_empty());
}

#[test]
fn images_require_a_texture() {
    let mut plain = shared("img");
    assert!(matches!(
        plain.add_image(Vec3::ZERO, Vec3::X, Vec3::Y, true, Mat4::IDENTITY),
        Err(SceneError::InvalidState(_))
    ));
    let mut textured = Mesh::new("img").with_texture("Image-0").unwrap();
    textured
        .add_image(Vec3::new(-0.5, -0.5, 0.0), Vec3::X, Vec3::Y, true, Mat4::IDENTITY)
        .unwrap();
    assert_eq!(textured.vertex_count(), 8);
    assert_eq!(textured.triangles().len(), 4);
}

#[test]
fn primitives_are_rejected_on_instanced_meshes() {
    let mut mesh = shared("inst");
    mesh.add_cube(&PrimitiveStyle::default()).unwrap();
    mesh.enable_instancing(&[Vec3::ZERO], None, None).unwrap();
    assert!(matches!(
        mesh.add_cube(&PrimitiveStyle::default()),
        Err(SceneError::InvalidState(_))
    ));
}

#[test]
fn transforms_apply_to_new_geometry_only() {
    let mut mesh = shared("two");
    mesh.add_cube(&PrimitiveStyle::default()).unwrap();
    mesh.add_cube(&PrimitiveStyle::default().transform(Mat4::from_translation(Vec3::X * 10.0)))
        .unwrap();
    let p = mesh.positions();
    assert!(p[..24].iter().all(|p| p.x.abs() <= 0.5));
    assert!(p[24..].iter().all(|p| p.x >= 9.5));
}
