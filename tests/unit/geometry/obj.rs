use super::*;
use std::io::Cursor;

fn parse(text: &str) -> SceneResult<MeshData> {
    parse_obj(&mut Cursor::new(text.as_bytes()))
}

fn corners(data: &MeshData, t: usize) -> [Vec3; 3] {
    data.triangles[t].map(|i| data.positions[i as usize])
}

const QUAD_AND_TRIANGLE: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0.5 0.5 1
f 1 2 3 4
f 1 2 5
";

#[test]
fn quads_split_along_the_first_diagonal() {
    let data = parse(QUAD_AND_TRIANGLE).unwrap();
    assert_eq!(data.vertex_count(), 5);
    assert_eq!(data.triangles.len(), 3);
    let (v1, v2, v3, v4) = (
        Vec3::ZERO,
        Vec3::X,
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::Y,
    );
    assert_eq!(corners(&data, 0), [v1, v2, v3]);
    assert_eq!(corners(&data, 1), [v3, v4, v1]);
    assert_eq!(corners(&data, 2), [v1, v2, Vec3::new(0.5, 0.5, 1.0)]);
    assert!(data.normals.is_none());
    assert!(data.uvs.is_none());
}

#[test]
fn file_normals_and_uvs_are_kept_per_vertex() {
    let data = parse(
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n",
    )
    .unwrap();
    assert_eq!(data.vertex_count(), 3);
    let normals = data.normals.as_ref().unwrap();
    assert!(normals.iter().all(|n| *n == Vec3::Z));
    let uvs = data.uvs.as_ref().unwrap();
    let [a, b, c] = data.triangles[0];
    assert_eq!(
        [uvs[a as usize], uvs[b as usize], uvs[c as usize]],
        [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]
    );
}

#[test]
fn polygons_beyond_quads_are_rejected() {
    let err = parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 0.5 0\nf 1 2 3 4 5\n")
        .unwrap_err();
    assert!(matches!(err, SceneError::Validation(_)));
    assert!(err.to_string().contains("5-sided"));
}

#[test]
fn empty_input_is_an_error() {
    assert!(parse("# nothing here\n").is_err());
}

#[test]
fn imported_geometry_feeds_a_mesh() {
    let data = parse(QUAD_AND_TRIANGLE).unwrap();
    let mut mesh = Mesh::new("obj").with_shared_color(Color::GRAY).unwrap();
    mesh.add_mesh_data(&data, None, Mat4::from_translation(Vec3::Z))
        .unwrap();
    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.triangles(), &data.triangles[..]);
    assert!(mesh.positions().iter().all(|p| p.z >= 1.0));
}

#[test]
fn load_obj_reads_files_and_reports_missing_ones() {
    let path = std::env::temp_dir().join(format!("scenescript-obj-{}.obj", std::process::id()));
    std::fs::write(&path, QUAD_AND_TRIANGLE).unwrap();
    let data = load_obj(&path).unwrap();
    assert_eq!(data.triangles.len(), 3);
    let _ = std::fs::remove_file(&path);

    assert!(load_obj(path.with_extension("missing")).is_err());
}
