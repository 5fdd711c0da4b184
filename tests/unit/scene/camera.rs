use super::*;
use crate::script::codec::decode_matrix;

#[test]
fn default_camera_sees_origin_on_negative_z() {
    let cam = Camera::default();
    cam.validate().unwrap();
    let p = cam.world_to_camera().transform_point3(Vec3::ZERO);
    assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), 1e-5));
    let back = cam.camera_to_world().transform_point3(p);
    assert!(back.abs_diff_eq(Vec3::ZERO, 1e-5));
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(Camera::default().fov_y_degrees(0.0).validate().is_err());
    assert!(Camera::default().aspect_ratio(-1.0).validate().is_err());
    assert!(Camera::looking_at(Vec3::ONE, Vec3::ONE).validate().is_err());
    assert!(
        Camera::looking_at(Vec3::new(0.0, 4.0, 0.0), Vec3::ZERO)
            .validate()
            .is_err()
    );
}

#[test]
fn set_camera_carries_row_major_matrices() {
    let cam = Camera::looking_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
    let Command::SetCamera(cmd) = cam.to_command().unwrap() else {
        panic!("expected SetCamera");
    };
    let (values, rows, cols) = decode_matrix::<f32>(&cmd.value.world_to_camera).unwrap();
    assert_eq!((rows, cols), (4, 4));
    assert_eq!(values, row_major(cam.world_to_camera()).to_vec());
}

#[test]
fn focus_point_serializes_optional_orientation() {
    let cmd = FocusPoint::at(Vec3::X).to_command();
    let json = serde_json::to_value(&cmd).unwrap();
    assert_eq!(json["CommandType"], "SetFocusPoint");
    assert_eq!(json["Value"]["Position"], serde_json::json!([1.0, 0.0, 0.0]));
    assert!(json["Value"].get("OrientationAxisAngle").is_none());
}

#[test]
fn focus_point_orientation_is_written_as_an_array() {
    let focus = FocusPoint {
        position: Vec3::ZERO,
        orientation_axis_angle: Some(Vec3::new(0.0, 0.5, 0.0)),
    };
    let json = serde_json::to_value(focus.to_command()).unwrap();
    assert_eq!(
        json["Value"]["OrientationAxisAngle"],
        serde_json::json!([0.0, 0.5, 0.0])
    );
}
