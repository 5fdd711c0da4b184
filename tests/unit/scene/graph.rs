use super::*;
use crate::script::codec::decode_matrix;

#[test]
fn settings_precede_sparklines_and_media() {
    let graph = Graph::new(400, 200)
        .margin(Margin::uniform(4.0))
        .align(GraphTextAlign::Top, GraphTextAlign::None)
        .sparkline(Sparkline::new("loss", vec![3.0, 2.0, 1.5]))
        .media("AudioTrack-0");
    let types: Vec<_> = graph
        .commands()
        .unwrap()
        .iter()
        .map(Command::command_type)
        .collect();
    assert_eq!(
        types,
        vec![
            "SetMargin",
            "SetBackgroundStyle",
            "SetTextStyle",
            "AddSparkline",
            "SetMedia"
        ]
    );

    let json = serde_json::to_value(graph.commands().unwrap()).unwrap();
    assert_eq!(json[0]["Value"]["Left"], 4.0);
    assert_eq!(json[1]["Value"], "#ffffff");
    assert_eq!(json[2]["NameAlign"], "top");
    assert_eq!(json[2]["ValueAlign"], "none");
    assert_eq!(json[2]["FontFamily"], "sans-serif");
}

#[test]
fn sparkline_values_are_a_single_column() {
    let line = Sparkline::new("speed", vec![0.5, 1.0, 0.25, 2.0])
        .color(Color::RED)
        .line_width(2.0)
        .vertical_rule(VerticalRule::at(2).color(Color::BLUE));
    let Command::AddSparkline(cmd) = line.to_command().unwrap() else {
        panic!("expected AddSparkline");
    };
    let (values, rows, cols) = decode_matrix::<f32>(&cmd.value_buffer).unwrap();
    assert_eq!((rows, cols), (4, 1));
    assert_eq!(values, vec![0.5, 1.0, 0.25, 2.0]);
    assert_eq!(cmd.stroke_style, "#ff0000");
    assert_eq!(cmd.vertical_rules.len(), 1);
    assert_eq!(cmd.vertical_rules[0].frame_index, 2);
    assert_eq!(cmd.vertical_rules[0].stroke_style, "#0000ff");
}

#[test]
fn rules_serialize_as_an_array_even_when_empty() {
    let json = serde_json::to_value(Sparkline::new("x", vec![1.0]).to_command().unwrap()).unwrap();
    assert_eq!(json["VerticalRules"], serde_json::json!([]));
}

#[test]
fn invalid_graph_settings_are_rejected() {
    assert!(Graph::new(10, 10).text_sizes(0.0, 12.0).commands().is_err());
    assert!(Graph::new(10, 10).margin(Margin::uniform(-1.0)).commands().is_err());
    assert!(Sparkline::new("x", vec![f32::NAN]).to_command().is_err());
    assert!(Sparkline::new("x", vec![1.0]).line_width(0.0).to_command().is_err());
}
