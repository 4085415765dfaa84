//! Button: a focusable label that dispatches an action.

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::event::{Action, KeyBinding};
use crate::geometry::Behavior;
use crate::widget::WidgetKind;

/// Dispatches its action on `enter` or `space`.
#[derive(Debug, Clone)]
pub struct Button {
    label: String,
    action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self { label: label.into(), action }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Component for Button {
    fn name(&self) -> &str {
        "button"
    }

    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Button
    }

    fn behavior(&self) -> Behavior {
        Behavior::focusable()
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        ui.set_content(id, &format!("[ {} ]", self.label))?;
        for key in ["enter", "space"] {
            let action = self.action.clone();
            ui.bind_key(
                id,
                key,
                KeyBinding::new(move |ui, id, _| {
                    if !ui.controller(id).is_some_and(|c| c.is_enabled()) {
                        return Ok(());
                    }
                    ui.dispatch(id, action.clone())
                })
                .with_legend("Press")
                .with_group("Press")
                .with_priority(5),
            )?;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, KeyPress};
    use crate::widget::HeadlessBackend;

    fn press(ui: &mut Ui, id: ControllerId, key: &str) {
        let binding = ui.resolve_key(id, &KeyPress::parse(key)).unwrap();
        (binding.handler)(ui, id, &KeyPress::parse(key)).unwrap();
    }

    #[test]
    fn enter_and_space_dispatch() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 2)));
        let button = ui.create_root(Button::new("Save", Action::named("save")), None).unwrap();
        while ui.next_outbox_event().is_some() {}

        press(&mut ui, button, "enter");
        press(&mut ui, button, "space");
        let names: Vec<String> = std::iter::from_fn(|| ui.next_outbox_event())
            .filter_map(|e| match e {
                Event::Action(a) => Some(a.name().to_owned()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["save", "save"]);
    }

    #[test]
    fn disabled_button_does_nothing() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 2)));
        let button = ui.create_root(Button::new("Save", Action::named("save")), None).unwrap();
        ui.disable(button).unwrap();
        while ui.next_outbox_event().is_some() {}
        press(&mut ui, button, "enter");
        assert_eq!(ui.outbox_len(), 0);
    }

    #[test]
    fn renders_bracketed_label() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 2)));
        ui.create_root(Button::new("Go", Action::named("go")), None).unwrap();
        ui.render().unwrap();
        assert_eq!(ui.backend_as::<HeadlessBackend>().unwrap().screen_text(), "[ Go ]");
    }
}
