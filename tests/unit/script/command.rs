use super::*;

fn add_mesh(id: &str) -> Command {
    Command::AddMesh(AddMesh {
        mesh_id: id.to_string(),
        transform: None,
    })
}

#[test]
fn command_type_is_the_serde_tag() {
    let commands = vec![
        Command::SetSceneProperties(SceneProperties::default()),
        Command::AddCanvas3D(AddCanvas {
            canvas_id: "c".into(),
            width: 10,
            height: 20,
            html_id: None,
        }),
        Command::SetUiParameters(SetUiParameters {
            value: UiParameters::default(),
        }),
        add_mesh("m"),
    ];
    for command in &commands {
        let json = serde_json::to_value(command).unwrap();
        assert_eq!(json["CommandType"], command.command_type());
    }
}

#[test]
fn payload_fields_are_pascal_case() {
    let json = serde_json::to_value(Command::AddCanvas2D(AddCanvas {
        canvas_id: "c".into(),
        width: 10,
        height: 20,
        html_id: Some("host".into()),
    }))
    .unwrap();
    assert_eq!(json["CanvasId"], "c");
    assert_eq!(json["HtmlId"], "host");

    let props = serde_json::to_value(Command::SetSceneProperties(SceneProperties::default()))
        .unwrap();
    assert_eq!(props["FrameRate"], 30.0);
    assert_eq!(props["StatusBarVisibility"], "visible");
}

#[test]
fn absent_update_fields_are_omitted() {
    let json = serde_json::to_value(Command::UpdateMesh(UpdateMesh {
        base_mesh_id: "base".into(),
        mesh_id: "u".into(),
        frame_index: 4,
        update_flags: 1,
        vertex_buffer: Some("AA==".into()),
        keyframe_index: None,
        offset: None,
        scale: None,
        quantized_buffer: None,
    }))
    .unwrap();
    let object = json.as_object().unwrap();
    assert!(object.contains_key("VertexBuffer"));
    assert!(!object.contains_key("KeyframeIndex"));
    assert!(!object.contains_key("QuantizedBuffer"));
    assert_eq!(json["UpdateFlags"], 1);
}

#[test]
fn scripts_parse_back_into_commands() {
    let text = r#"[
        {"CommandType": "SetSceneId", "SceneId": "s"},
        {"CommandType": "CanvasCommands", "CanvasId": "c", "Commands": [
            {"CommandType": "AddFrame", "FrameId": "0"},
            {"CommandType": "FrameCommands", "FrameId": "0", "Commands": [
                {"CommandType": "AddMesh", "MeshId": "cube"}
            ]}
        ]}
    ]"#;
    let commands: Vec<Command> = serde_json::from_str(text).unwrap();
    assert_eq!(commands.len(), 2);
    let frame = &commands[1].nested()[1];
    assert_eq!(frame.command_type(), "FrameCommands");
    assert_eq!(frame.nested(), &[add_mesh("cube")]);
}

#[test]
fn index_type_narrows_below_u16_max() {
    assert_eq!(IndexBufferType::for_vertex_count(0xFFFE), IndexBufferType::UInt16);
    assert_eq!(IndexBufferType::for_vertex_count(0xFFFF), IndexBufferType::UInt32);
}

#[test]
fn sizes_are_counted_for_nested_commands_only() {
    let frame = Command::FrameCommands(FrameCommands {
        frame_id: "0".into(),
        commands: vec![add_mesh("a"), add_mesh("b")],
    });
    let commands = vec![
        Command::CanvasCommands(CanvasCommands {
            canvas_id: "c".into(),
            commands: vec![
                Command::AddFrame(AddFrame {
                    frame_id: "0".into(),
                }),
                frame,
            ],
        }),
        add_mesh("c"),
    ];
    let sizes = measure_command_sizes(&commands).unwrap();
    assert!(!sizes.contains_key("CanvasCommands"));
    assert!(!sizes.contains_key("FrameCommands"));
    let one = serde_json::to_vec(&add_mesh("a")).unwrap().len();
    assert_eq!(sizes["AddMesh"], 3 * one);
    assert!(sizes["AddFrame"] > 0);
}
