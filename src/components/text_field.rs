//! TextField: single-line text input bound to the model.

use serde_json::Value;

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::event::{Event, KeyBinding};
use crate::geometry::Behavior;
use crate::store::StorePath;
use crate::widget::WidgetKind;

use super::display_text;

/// Printable keys append to the string at `path`; `backspace` removes the
/// last character. Every edit emits [`Event::TextChanged`].
#[derive(Debug, Clone)]
pub struct TextField {
    path: StorePath,
    placeholder: String,
}

impl TextField {
    pub fn new(path: impl Into<StorePath>) -> Self {
        Self { path: path.into(), placeholder: String::new() }
    }

    /// Shown while the value is empty (builder).
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

fn current(ui: &Ui, id: ControllerId, path: &StorePath) -> Result<String> {
    Ok(ui.model_get(id, path)?.map(|v| display_text(&v)).unwrap_or_default())
}

fn edit(ui: &mut Ui, id: ControllerId, path: &StorePath, f: impl FnOnce(&mut String)) -> Result<()> {
    let mut text = current(ui, id, path)?;
    f(&mut text);
    ui.model_set(id, path, Value::String(text.clone()))?;
    ui.emit(id, &Event::TextChanged { id, text });
    Ok(())
}

impl Component for TextField {
    fn name(&self) -> &str {
        "textfield"
    }

    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::TextField
    }

    fn behavior(&self) -> Behavior {
        Behavior::focusable()
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        let show = {
            let placeholder = self.placeholder.clone();
            move |ui: &mut Ui, id: ControllerId, text: &str| {
                ui.set_content(id, if text.is_empty() { placeholder.as_str() } else { text })
            }
        };
        let initial = current(ui, id, &self.path)?;
        show(ui, id, &initial)?;
        ui.watch(id, &self.path, move |ui, id, _, value| {
            show(ui, id, &display_text(value))?;
            ui.emit(id, &Event::Dirty);
            Ok(())
        })?;

        let path = self.path.clone();
        ui.bind_key(
            id,
            "/[[:print:]]/",
            KeyBinding::new(move |ui, id, key| match key.ch {
                Some(ch) => edit(ui, id, &path, |text| text.push(ch)),
                None => Ok(()),
            }),
        )?;
        let path = self.path.clone();
        ui.bind_key(
            id,
            "backspace",
            KeyBinding::new(move |ui, id, _| {
                edit(ui, id, &path, |text| {
                    text.pop();
                })
            })
            .with_legend("Delete")
            .with_priority(2),
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, KeyPress};
    use crate::widget::HeadlessBackend;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Form;

    impl Component for Form {
        fn name(&self) -> &str {
            "container"
        }
    }

    fn press(ui: &mut Ui, id: ControllerId, key: KeyPress) {
        let binding = ui.resolve_key(id, &key).unwrap();
        (binding.handler)(ui, id, &key).unwrap();
    }

    #[test]
    fn typing_edits_model_and_emits() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 2)));
        let form = ui.create_root(Form, None).unwrap();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        ui.on(form, EventKind::TextChanged, move |_, _, event| {
            if let Event::TextChanged { text, .. } = event {
                sink.borrow_mut().push(text.clone());
            }
            Ok(())
        })
        .unwrap();
        let field = ui.add_child(form, TextField::new("name"), None).unwrap();

        for ch in "ab c".chars() {
            press(&mut ui, field, KeyPress::char(ch));
        }
        press(&mut ui, field, KeyPress::parse("backspace"));

        assert_eq!(ui.default_store().get("name"), Some(json!("ab ")));
        assert_eq!(*changes.borrow(), vec!["a", "ab", "ab ", "ab c", "ab "]);
    }

    #[test]
    fn placeholder_until_typed() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 2)));
        let field = ui.create_root(TextField::new("q").with_placeholder("search"), None).unwrap();
        ui.render().unwrap();
        assert_eq!(ui.backend_as::<HeadlessBackend>().unwrap().screen_text(), "search");
        press(&mut ui, field, KeyPress::char('x'));
        ui.render().unwrap();
        assert_eq!(ui.backend_as::<HeadlessBackend>().unwrap().screen_text(), "x");
    }

    #[test]
    fn control_keys_do_not_type() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 2)));
        let field = ui.create_root(TextField::new("q"), None).unwrap();
        assert!(ui.resolve_key(field, &KeyPress::parse("C-c")).is_none());
    }
}
