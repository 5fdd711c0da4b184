//! Page widgets outside the canvases: text panels and drop-down menus.

use std::collections::BTreeSet;

use crate::foundation::error::{SceneError, SceneResult};
use crate::script::command::{
    Command, DropDownMenuItemDisabled, DropDownMenuItems, DropDownMenuSelection,
    DropDownMenuTitle, TextPanelText,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Settings and initial text of a new text panel.
pub struct TextPanel {
    /// Panel id; empty for an automatic `TextPanel-<n>` id.
    pub text_panel_id: String,
    /// Host element id.
    pub html_id: Option<String>,
    /// Show an input box under the text.
    pub add_input_box: bool,
    /// Title; empty leaves the viewer default.
    pub title: String,
    /// Body text (HTML allowed).
    pub text: String,
    /// Initial contents of the input box.
    pub input_text: String,
}

impl TextPanel {
    /// Empty panel without an input box.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit id.
    pub fn id(mut self, text_panel_id: impl Into<String>) -> Self {
        self.text_panel_id = text_panel_id.into();
        self
    }

    /// Place the panel inside an existing page element.
    pub fn html_id(mut self, html_id: impl Into<String>) -> Self {
        self.html_id = Some(html_id.into());
        self
    }

    /// Show an input box.
    pub fn input_box(mut self, value: bool) -> Self {
        self.add_input_box = value;
        self
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the body text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the input box contents.
    pub fn input_text(mut self, text: impl Into<String>) -> Self {
        self.input_text = text.into();
        self
    }

    /// Body, title and input text commands for the non-empty parts.
    pub(crate) fn commands(&self, text_panel_id: &str) -> Vec<Command> {
        let text = |value: &str| TextPanelText {
            text_panel_id: text_panel_id.to_string(),
            value: value.to_string(),
        };
        let mut commands = Vec::new();
        if !self.text.is_empty() {
            commands.push(Command::SetTextPanelValue(text(&self.text)));
        }
        if !self.title.is_empty() {
            commands.push(Command::SetTextPanelTitle(text(&self.title)));
        }
        if !self.input_text.is_empty() {
            commands.push(Command::SetTextPanelInputText(text(&self.input_text)));
        }
        commands
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Settings and initial entries of a new drop-down menu.
pub struct DropDownMenu {
    /// Menu id; empty for an automatic `DropDownMenu-<n>` id.
    pub drop_down_menu_id: String,
    /// Host element id.
    pub html_id: Option<String>,
    /// Title.
    pub title: String,
    /// Entries in display order.
    pub items: Vec<String>,
    /// Selected entry.
    pub selection: u32,
    /// Greyed-out entries.
    pub disabled: BTreeSet<u32>,
}

impl DropDownMenu {
    /// Empty, untitled menu.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit id.
    pub fn id(mut self, drop_down_menu_id: impl Into<String>) -> Self {
        self.drop_down_menu_id = drop_down_menu_id.into();
        self
    }

    /// Place the menu inside an existing page element.
    pub fn html_id(mut self, html_id: impl Into<String>) -> Self {
        self.html_id = Some(html_id.into());
        self
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the entries.
    pub fn items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// Select an entry.
    pub fn selection(mut self, index: u32) -> Self {
        self.selection = index;
        self
    }

    /// Grey out an entry.
    pub fn disable(mut self, index: u32) -> Self {
        self.disabled.insert(index);
        self
    }

    /// Title, items, selection and disabled entries.
    pub(crate) fn commands(&self, drop_down_menu_id: &str) -> SceneResult<Vec<Command>> {
        let item_count = self.items.len();
        check_item_index(drop_down_menu_id, item_count, self.selection)?;
        for &index in &self.disabled {
            check_item_index(drop_down_menu_id, item_count, index)?;
        }

        let id = || drop_down_menu_id.to_string();
        let mut commands = Vec::new();
        if !self.title.is_empty() {
            commands.push(Command::SetDropDownMenuTitle(DropDownMenuTitle {
                drop_down_menu_id: id(),
                value: self.title.clone(),
            }));
        }
        if !self.items.is_empty() {
            commands.push(Command::SetDropDownMenuItems(DropDownMenuItems {
                drop_down_menu_id: id(),
                items: self.items.clone(),
            }));
        }
        commands.push(Command::SetDropDownMenuSelection(DropDownMenuSelection {
            drop_down_menu_id: id(),
            index: self.selection,
        }));
        for &index in &self.disabled {
            commands.push(Command::SetDropDownMenuItemDisabled(
                DropDownMenuItemDisabled {
                    drop_down_menu_id: id(),
                    index,
                    disable: true,
                },
            ));
        }
        Ok(commands)
    }
}

/// An index must address an entry once the menu has entries; an empty menu accepts only 0.
pub(crate) fn check_item_index(
    drop_down_menu_id: &str,
    item_count: usize,
    index: u32,
) -> SceneResult<()> {
    let limit = item_count.max(1);
    if index as usize >= limit {
        return Err(SceneError::out_of_range(format!(
            "drop-down menu '{drop_down_menu_id}' has {item_count} items, index {index} is out of range"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/panel.rs"]
mod tests;
