use super::*;
use crate::geometry::primitives::PrimitiveStyle;
use crate::scene::camera::Camera;

fn triangle(y: f32) -> Vec<Vec3> {
    vec![Vec3::ZERO, Vec3::X, Vec3::new(0.0, y, 0.0)]
}

fn scene_with_triangle() -> Scene {
    let mut scene = Scene::new("test");
    let mut mesh = scene.create_mesh("tri");
    mesh.add_mesh_without_normals(
        &triangle(1.0),
        &[[0, 1, 2]],
        Some(&[Color::RED; 3]),
        None,
        glam::Mat4::IDENTITY,
    )
    .unwrap();
    scene.define_mesh(mesh).unwrap();
    scene
}

fn command_types(scene: &Scene) -> Vec<&'static str> {
    scene
        .commands()
        .unwrap()
        .iter()
        .map(Command::command_type)
        .collect()
}

#[test]
fn header_precedes_the_log() {
    let scene = scene_with_triangle();
    assert_eq!(
        command_types(&scene),
        vec!["SetSceneId", "SetSceneProperties", "DefineMesh"]
    );
    assert_eq!(command_types(&Scene::default())[0], "SetSceneProperties");
}

#[test]
fn default_ids_count_per_resource_kind() {
    let mut scene = Scene::new("");
    let a = scene.create_mesh("");
    let b = scene.create_mesh("");
    assert_eq!((a.mesh_id(), b.mesh_id()), ("Mesh-0", "Mesh-1"));
    scene.define_mesh(a).unwrap();
    let canvas = scene.create_canvas_3d(Canvas3D::new(100, 100)).unwrap();
    assert_eq!(canvas, "Canvas-0");
}

#[test]
fn duplicate_and_unknown_ids_are_rejected() {
    let mut scene = scene_with_triangle();
    let again = Mesh::new("tri");
    assert!(matches!(scene.define_mesh(again), Err(SceneError::Validation(_))));

    let textured = Mesh::new("t").with_texture("missing").unwrap();
    let err = scene.define_mesh(textured).unwrap_err();
    assert!(err.to_string().contains("missing"));

    let err = scene
        .update_mesh("nope", &triangle(1.0), None, None, None)
        .unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[test]
fn updates_get_sequential_frame_indices() {
    let mut scene = scene_with_triangle();
    let first = scene
        .update_mesh_positions("tri", &triangle(0.5), None)
        .unwrap();
    let second = scene
        .update_mesh_positions("tri", &triangle(0.6), Some("custom"))
        .unwrap();
    assert_eq!(second, "custom");
    assert_eq!(scene.mesh_update(&first).unwrap().frame_index(), 0);
    assert_eq!(scene.mesh_update("custom").unwrap().frame_index(), 1);
    assert_eq!(scene.mesh_updates().count(), 2);
}

#[test]
fn update_row_count_must_match_base_mesh() {
    let mut scene = scene_with_triangle();
    let err = scene
        .update_mesh("tri", &[Vec3::ZERO], None, None, None)
        .unwrap_err();
    assert!(matches!(
        err,
        SceneError::ShapeMismatch {
            expected: 3,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn positions_update_on_instanced_mesh_targets_instances() {
    let mut scene = Scene::new("inst");
    let mut mesh = scene
        .create_mesh("cubes")
        .with_shared_color(Color::BLUE)
        .unwrap();
    mesh.add_cube(&PrimitiveStyle::default()).unwrap();
    mesh.enable_instancing(&[Vec3::ZERO, Vec3::X], None, None)
        .unwrap();
    scene.define_mesh(mesh).unwrap();

    let id = scene
        .update_mesh_positions("cubes", &[Vec3::Y, Vec3::Z], None)
        .unwrap();
    assert_eq!(
        scene.mesh_update(&id).unwrap().kind(),
        crate::scene::mesh_update::UpdateKind::Instances
    );
    assert!(matches!(
        scene.update_mesh("cubes", &[Vec3::ZERO; 24], None, None, None),
        Err(SceneError::InvalidState(_))
    ));
    assert!(matches!(
        scene.update_mesh_positions("cubes", &[Vec3::Y], None),
        Err(SceneError::ShapeMismatch { expected: 2, .. })
    ));
}

#[test]
fn clear_keeps_resources_and_drops_the_header() {
    let mut scene = scene_with_triangle();
    let canvas = scene.create_canvas_3d(Canvas3D::new(64, 64)).unwrap();
    scene.update_mesh_positions("tri", &triangle(0.2), None).unwrap();
    scene.clear_script();
    assert!(scene.is_script_cleared());
    assert_eq!(scene.commands().unwrap().len(), 0);

    scene
        .add_frame_3d(&canvas, Frame3D::new().add_mesh("tri"))
        .unwrap();
    assert_eq!(command_types(&scene), vec!["CanvasCommands"]);

    let next = scene.update_mesh_positions("tri", &triangle(0.3), None).unwrap();
    assert_eq!(scene.mesh_update(&next).unwrap().frame_index(), 1);
}

#[test]
fn frames_validate_canvas_kind_and_mesh_ids() {
    let mut scene = scene_with_triangle();
    let c3 = scene.create_canvas_3d(Canvas3D::new(64, 64)).unwrap();
    let c2 = scene.create_canvas_2d(Canvas2D::new(64, 64)).unwrap();

    assert!(matches!(
        scene.add_frame_3d(&c2, Frame3D::new()),
        Err(SceneError::Validation(_))
    ));
    let err = scene
        .add_frame_3d(&c3, Frame3D::new().add_mesh("ghost"))
        .unwrap_err();
    assert!(err.to_string().contains("ghost"));

    assert_eq!(scene.add_frame_3d(&c3, Frame3D::new()).unwrap(), "0");
    assert_eq!(scene.add_frame_3d(&c3, Frame3D::new().id("end")).unwrap(), "end");
    assert_eq!(scene.add_frame_3d(&c3, Frame3D::new()).unwrap(), "2");
    assert!(scene.add_frame_3d(&c3, Frame3D::new().id("end")).is_err());

    let err = scene
        .add_frame_2d(&c2, Frame2D::new().add_video(Default::default()))
        .unwrap_err();
    assert!(err.to_string().contains("video"));
}

#[test]
fn frame_commands_nest_under_the_canvas() {
    let mut scene = scene_with_triangle();
    let canvas = scene
        .create_canvas_3d(
            Canvas3D::new(64, 64).camera(Camera::looking_at(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO)),
        )
        .unwrap();
    scene
        .add_frame_3d(&canvas, Frame3D::new().add_mesh("tri"))
        .unwrap();
    let json = scene.to_json().unwrap();
    let last = json.as_array().unwrap().last().unwrap();
    assert_eq!(last["CommandType"], "CanvasCommands");
    assert_eq!(last["CanvasId"], canvas.as_str());
    assert_eq!(last["Commands"][0]["CommandType"], "AddFrame");
    assert_eq!(last["Commands"][1]["Commands"][0]["MeshId"], "tri");

    let settings = &json.as_array().unwrap()[4];
    assert_eq!(settings["Commands"][0]["CommandType"], "SetCamera");
}

#[test]
fn labels_define_a_textured_billboard() {
    let mut scene = Scene::new("labels");
    let ids = scene
        .create_label(Label::new("hello").color(Color::GREEN))
        .unwrap();
    assert_eq!(ids.label_id, "Label-0");
    let mesh = scene.get_mesh(&ids.mesh_id).unwrap();
    assert_eq!(mesh.texture_id(), Some("Label-0"));
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(
        command_types(&scene)[2..],
        ["DefineMesh", "DefineLabel"]
    );
    let json = scene.to_json().unwrap();
    assert_eq!(json[3]["FillStyle"], "#00ff00");
    assert_eq!(json[3]["HorizontalAlign"], -1);
}

#[test]
fn quantization_reports_per_base_mesh() {
    let mut scene = scene_with_triangle();
    for i in 0..5 {
        scene
            .update_mesh_positions("tri", &triangle(0.1 * i as f32), None)
            .unwrap();
    }
    let report = scene.quantize_updates(1e-5).unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report["tri"].keyframe_count, 1);

    let ids: Vec<String> = scene.mesh_updates().map(|u| u.mesh_id().to_string()).collect();
    for id in &ids[1..] {
        let original = scene.mesh_update(id).unwrap().vertex_buffer().clone();
        let err = scene.difference_range(id, &original).unwrap();
        assert!(err <= 1e-5, "update {id} error {err}");
    }

    // rerunning replaces the previous encoding
    let report = scene.quantize_updates(1e-4).unwrap();
    assert_eq!(report["tri"].keyframe_count, 1);
    let json = scene.to_json().unwrap();
    let quantized = json
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c.get("QuantizedBuffer").is_some())
        .count();
    assert_eq!(quantized, 4);
}

#[test]
fn quantization_can_target_one_mesh() {
    let mut scene = scene_with_triangle();
    scene.update_mesh_positions("tri", &triangle(0.1), None).unwrap();
    assert!(matches!(
        scene.quantize_updates_with(&QuantizeOpts::absolute(1e-5).base_mesh("other")),
        Err(SceneError::Validation(_))
    ));
    let report = scene
        .quantize_updates_with(&QuantizeOpts::absolute(1e-5).base_mesh("tri"))
        .unwrap();
    assert_eq!(report.keys().collect::<Vec<_>>(), ["tri"]);
}

#[test]
fn reconstruction_needs_the_keyframe_in_the_log() {
    let mut scene = scene_with_triangle();
    let key = scene.update_mesh_positions("tri", &triangle(0.0), None).unwrap();
    scene.update_mesh_positions("tri", &triangle(0.1), None).unwrap();
    scene.clear_script();
    assert!(matches!(
        scene.reconstruct_update(&key),
        Err(SceneError::InvalidState(_))
    ));
    assert!(matches!(
        scene.reconstruct_update("never"),
        Err(SceneError::Validation(_))
    ));
}

#[test]
fn layout_commands_check_canvas_ids() {
    let mut scene = Scene::new("layout");
    let a = scene.create_canvas_3d(Canvas3D::new(10, 10)).unwrap();
    let b = scene.create_canvas_2d(Canvas2D::new(10, 10)).unwrap();
    scene.define_grid("800px", "1fr", "1fr 1fr");
    scene.place_canvas_in_grid(&a, "1", "1").unwrap();
    scene.link_canvas_events(&[&a, &b]).unwrap();
    scene.simulate_key_press(&a, "l").unwrap();
    scene.configure_user_interface(Visibility::Hidden, true);
    assert!(scene.link_canvas_events(&[&a]).is_err());
    assert!(scene.simulate_key_press("zzz", "l").is_err());

    let sizes = scene.measure_command_size().unwrap();
    for key in [
        "DefineGrid",
        "PlaceCanvasInGrid",
        "LinkCanvasEvents",
        "SimulateKeyPress",
        "ConfigureUserInterface",
        "SetBackgroundStyle",
    ] {
        assert!(sizes.contains_key(key), "missing {key}");
    }
}

#[test]
fn frame_rate_must_be_positive() {
    let mut scene = Scene::default();
    assert!(scene.set_frame_rate(0.0).is_err());
    scene.set_frame_rate(24.0).unwrap();
    assert_eq!(scene.properties().frame_rate, 24.0);
}

#[test]
fn update_without_normals_recomputes_them_from_base_triangles() {
    use crate::geometry::vertex_buffer::VertexAttribute;
    use crate::scene::mesh_update::{UpdateFlags, UpdateKind};

    let mut scene = scene_with_triangle();
    let flat = [Vec3::ZERO, Vec3::X, Vec3::Z];
    let id = scene
        .update_mesh_without_normals("tri", &flat, None, None)
        .unwrap();
    let update = scene.mesh_update(&id).unwrap();
    assert_eq!(update.kind(), UpdateKind::Geometry);
    assert!(update.flags().contains(UpdateFlags::NORMALS));
    assert!(!update.flags().contains(UpdateFlags::COLORS));
    let normals = update
        .vertex_buffer()
        .slice(VertexAttribute::Normal)
        .unwrap()
        .to_vec3s();
    for n in normals {
        assert!(n.abs_diff_eq(Vec3::NEG_Y, 1e-6), "normal {n}");
    }

    let colored = scene
        .update_mesh_without_normals("tri", &flat, Some(&[Color::BLUE; 3]), Some("blue"))
        .unwrap();
    assert_eq!(colored, "blue");
    assert_eq!(scene.mesh_update("blue").unwrap().frame_index(), 1);

    let err = scene
        .update_mesh_without_normals("tri", &flat[..2], None, None)
        .unwrap_err();
    assert!(matches!(err, SceneError::ShapeMismatch { expected: 3, actual: 2, .. }));
}

#[test]
fn graphs_share_canvas_ids_but_take_no_frames() {
    use crate::scene::graph::{Graph, Sparkline};

    let mut scene = Scene::new("");
    let view = scene.create_canvas_3d(Canvas3D::new(64, 64)).unwrap();
    let graph = scene
        .create_graph(Graph::new(200, 100).sparkline(Sparkline::new("y", vec![1.0, 2.0])))
        .unwrap();
    assert_eq!((view.as_str(), graph.as_str()), ("Canvas-0", "Canvas-1"));
    assert_eq!(
        command_types(&scene)[1..],
        ["AddCanvas3D", "AddGraph", "CanvasCommands"]
    );

    scene
        .add_sparkline(&graph, &Sparkline::new("z", vec![0.0, 1.0]))
        .unwrap();
    assert!(scene.add_sparkline(&view, &Sparkline::new("z", vec![0.0])).is_err());
    assert!(scene.add_frame_3d(&graph, Frame3D::new()).is_err());
    scene.link_canvas_events(&[&view, &graph]).unwrap();
    assert!(
        scene
            .create_graph(Graph::new(10, 10).media("missing"))
            .is_err()
    );
}

#[test]
fn text_panels_and_menus_get_default_ids_and_validate_updates() {
    use crate::scene::panel::{DropDownMenu, TextPanel};

    let mut scene = Scene::new("");
    let panel = scene
        .create_text_panel(TextPanel::new().title("Info").input_box(true))
        .unwrap();
    assert_eq!(panel, "TextPanel-0");
    scene.set_text_panel_text(&panel, "<b>ready</b>").unwrap();
    assert!(scene.set_text_panel_title("nope", "x").is_err());
    assert!(
        scene
            .create_text_panel(TextPanel::new().id(&panel))
            .is_err()
    );

    let menu = scene
        .create_drop_down_menu(DropDownMenu::new().items(["a", "b"]))
        .unwrap();
    assert_eq!(menu, "DropDownMenu-0");
    scene.set_drop_down_menu_selection(&menu, 1).unwrap();
    assert!(scene.set_drop_down_menu_selection(&menu, 2).is_err());
    scene.set_drop_down_menu_items(&menu, ["a", "b", "c"]).unwrap();
    scene.set_drop_down_menu_item_disabled(&menu, 2, true).unwrap();
    scene.set_drop_down_menu_title(&menu, "Pick").unwrap();

    let json = scene.to_json().unwrap();
    let commands = json.as_array().unwrap();
    assert_eq!(commands[1]["CommandType"], "AddTextPanel");
    assert_eq!(commands[1]["AddInputBox"], true);
    assert_eq!(commands[2]["CommandType"], "SetTextPanelTitle");
    assert_eq!(commands[3]["Value"], "<b>ready</b>");
    let last = commands.last().unwrap();
    assert_eq!(last["CommandType"], "SetDropDownMenuTitle");
    assert_eq!(last["Value"], "Pick");
}

#[test]
fn widgets_stay_addressable_after_clear() {
    use crate::scene::graph::{Graph, Sparkline};
    use crate::scene::panel::{DropDownMenu, TextPanel};

    let mut scene = Scene::new("widgets");
    let graph = scene.create_graph(Graph::new(100, 50)).unwrap();
    let panel = scene.create_text_panel(TextPanel::new()).unwrap();
    let menu = scene
        .create_drop_down_menu(DropDownMenu::new().items(["x", "y"]))
        .unwrap();

    scene.clear_script();
    scene
        .add_sparkline(&graph, &Sparkline::new("late", vec![1.0]))
        .unwrap();
    scene.set_text_panel_text(&panel, "frame 2").unwrap();
    scene.set_drop_down_menu_selection(&menu, 1).unwrap();
    assert_eq!(
        command_types(&scene),
        vec![
            "CanvasCommands",
            "SetTextPanelValue",
            "SetDropDownMenuSelection"
        ]
    );

    assert!(scene.create_graph(Graph::new(1, 1).id(&graph)).is_err());
    assert!(
        scene
            .create_drop_down_menu(DropDownMenu::new().id(&menu))
            .is_err()
    );
}
