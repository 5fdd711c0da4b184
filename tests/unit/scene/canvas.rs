use super::*;

#[test]
fn layer_settings_use_viewer_key_names() {
    let mut settings = BTreeMap::new();
    settings.insert(
        "wire".to_string(),
        LayerSettings {
            wireframe: true,
            render_order: Some(2),
            ..LayerSettings::default()
        },
    );
    let json = serde_json::to_value(layer_settings_command(&settings).unwrap()).unwrap();
    assert_eq!(json["CommandType"], "SetLayerSettings");
    let wire = &json["Value"]["wire"];
    assert_eq!(wire["filled"], true);
    assert_eq!(wire["wireframe"], true);
    assert_eq!(wire["renderOrder"], 2);
}

#[test]
fn layer_opacity_is_range_checked() {
    let mut settings = BTreeMap::new();
    settings.insert(
        "ghost".to_string(),
        LayerSettings {
            opacity: 1.5,
            ..LayerSettings::default()
        },
    );
    let err = layer_settings_command(&settings).unwrap_err();
    assert!(matches!(err, SceneError::OutOfRange(_)));
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn frame3d_skips_identity_transforms() {
    let frame = Frame3D::new()
        .add_mesh("a")
        .add_mesh_with_transform("b", Mat4::IDENTITY)
        .add_mesh_with_transform("c", Mat4::from_translation(Vec3::X));
    let cmds = frame.commands().unwrap();
    assert_eq!(cmds.len(), 3);
    let transforms: Vec<bool> = cmds
        .iter()
        .map(|c| match c {
            Command::AddMesh(m) => m.transform.is_some(),
            _ => panic!("unexpected {}", c.command_type()),
        })
        .collect();
    assert_eq!(transforms, vec![false, false, true]);
    assert_eq!(frame.mesh_ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn frame3d_orders_camera_before_meshes() {
    let frame = Frame3D::new().add_mesh("a").camera(Camera::default());
    let cmds = frame.commands().unwrap();
    assert_eq!(cmds[0].command_type(), "SetCamera");
    assert_eq!(cmds[1].command_type(), "AddMesh");
}

#[test]
fn frame2d_emits_draw_commands_in_order() {
    let style = ShapeStyle {
        fill_color: Some(Color::RED),
        ..ShapeStyle::default()
    };
    let frame = Frame2D::new()
        .add_line(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 5.0)],
            false,
            style.clone(),
        )
        .add_rectangle(Rect::new(1.0, 2.0, 4.0, 6.0), style.clone())
        .add_circle(Circle::new((5.0, 5.0), 2.0), style)
        .add_text("hi", Point::new(1.0, 9.0), Color::BLACK, 12.0)
        .add_image("Image-0", Placement::default());
    let cmds = frame.commands().unwrap();
    let kinds: Vec<&str> = cmds.iter().map(Command::command_type).collect();
    assert_eq!(
        kinds,
        vec![
            "DrawPolyline",
            "DrawRectangle",
            "DrawCircle",
            "DrawText",
            "DrawImage"
        ]
    );
    let Command::DrawRectangle(rect) = &cmds[1] else {
        panic!("expected rectangle");
    };
    assert_eq!((rect.width, rect.height), (3.0, 4.0));
    assert_eq!(rect.fill_color.as_deref(), Some("#ff0000"));
    assert_eq!(frame.image_ids().collect::<Vec<_>>(), vec!["Image-0"]);
    assert!(!frame.draws_video());
}

#[test]
fn degenerate_polyline_is_rejected() {
    let frame = Frame2D::new().add_line(vec![Point::ZERO], true, ShapeStyle::default());
    assert!(frame.commands().is_err());
}
