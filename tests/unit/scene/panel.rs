use super::*;

#[test]
fn text_panel_emits_only_non_empty_parts() {
    let panel = TextPanel::new().title("Notes").input_text("type here");
    let types: Vec<_> = panel
        .commands("TextPanel-0")
        .iter()
        .map(Command::command_type)
        .collect();
    assert_eq!(types, vec!["SetTextPanelTitle", "SetTextPanelInputText"]);
    assert!(TextPanel::new().commands("p").is_empty());
}

#[test]
fn drop_down_menu_always_sends_its_selection() {
    let menu = DropDownMenu::new()
        .title("Mesh")
        .items(["coarse", "fine", "finest"])
        .selection(1)
        .disable(2);
    let json = serde_json::to_value(menu.commands("DropDownMenu-0").unwrap()).unwrap();
    let commands = json.as_array().unwrap();
    assert_eq!(commands.len(), 4);
    assert_eq!(commands[0]["CommandType"], "SetDropDownMenuTitle");
    assert_eq!(commands[1]["Items"], serde_json::json!(["coarse", "fine", "finest"]));
    assert_eq!(commands[2]["Index"], 1);
    assert_eq!(commands[3]["CommandType"], "SetDropDownMenuItemDisabled");
    assert_eq!(commands[3]["Disable"], true);

    let bare = DropDownMenu::new().commands("m").unwrap();
    assert_eq!(bare.len(), 1);
    assert_eq!(bare[0].command_type(), "SetDropDownMenuSelection");
}

#[test]
fn out_of_range_indices_are_rejected() {
    assert!(DropDownMenu::new().items(["a"]).selection(1).commands("m").is_err());
    assert!(DropDownMenu::new().items(["a", "b"]).disable(5).commands("m").is_err());
    assert!(check_item_index("m", 0, 0).is_ok());
    assert!(check_item_index("m", 0, 1).is_err());
}
