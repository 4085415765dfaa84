//! Modal: a centered dialog opened through the `"open-modal"` action.

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::event::{Action, Event, EventKind, KeyBinding};
use crate::geometry::{Behavior, PropValue, StyleOptions};
use crate::widget::LayoutProp;

use super::{Button, Label};

/// Title, message and a row of buttons. `escape` closes it; pressing a button
/// closes it and then lets the button's action bubble on.
#[derive(Debug, Clone)]
pub struct Modal {
    title: String,
    message: String,
    buttons: Vec<(String, Action)>,
}

impl Modal {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), buttons: Vec::new() }
    }

    pub fn with_button(mut self, label: impl Into<String>, action: Action) -> Self {
        self.buttons.push((label.into(), action));
        self
    }

    fn height(&self) -> i32 {
        let message_rows = self.message.lines().count().max(1) as i32;
        // border row, title, blank, message, blank, buttons, border row
        message_rows + if self.buttons.is_empty() { 4 } else { 6 }
    }
}

/// Ask the parent (or the application, for a top-level modal) to destroy `id`.
fn close(ui: &mut Ui, id: ControllerId) {
    ui.emit(id, &Event::Destroy { target: id });
}

impl Component for Modal {
    fn name(&self) -> &str {
        "modal"
    }

    fn behavior(&self) -> Behavior {
        Behavior::focusable()
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        // Placement from the caller's style wins.
        let defaults = [
            (LayoutProp::Top, PropValue::Center),
            (LayoutProp::Left, PropValue::Center),
            (LayoutProp::Width, PropValue::percent(60)),
            (LayoutProp::Height, PropValue::Cells(self.height())),
        ];
        for (prop, value) in defaults {
            if !ui.prop(id, prop)?.is_set() {
                ui.set_prop(id, prop, value)?;
            }
        }

        ui.bind_key(
            id,
            "escape",
            KeyBinding::new(|ui, id, _| {
                close(ui, id);
                Ok(())
            })
            .with_legend("Close")
            .with_propagate(true)
            .with_priority(10),
        )?;
        ui.bind_key(
            id,
            "tab",
            KeyBinding::new(|ui, id, _| ui.next_child(id, 1).map(|_| ()))
                .with_propagate(true)
                .with_legend("Next")
                .with_priority(1),
        )?;

        ui.add_child(id, Label::new(&self.title), Some(StyleOptions::new().top(1).left(2)))?;
        let message_rows = self.message.lines().count().max(1) as i32;
        ui.add_child(id, Label::new(&self.message), Some(StyleOptions::new().top(3).left(2)))?;

        let mut left = 2;
        let mut first_button = None;
        for (label, action) in &self.buttons {
            let button = Button::new(label, action.clone());
            let child = ui.add_child(id, button, Some(StyleOptions::new().top(4 + message_rows).left(left)))?;
            if first_button.is_none() {
                first_button = Some(child);
            }
            left += label.chars().count() as i32 + 6;
        }
        if let Some(button) = first_button {
            ui.set_focused_child(id, button)?;
        }

        ui.on(id, EventKind::Action, |ui, id, _| {
            close(ui, id);
            Ok(())
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyPress;
    use crate::geometry::Region;
    use crate::widget::HeadlessBackend;
    use pretty_assertions::assert_eq;

    fn ui() -> Ui {
        Ui::new(Box::new(HeadlessBackend::new(40, 12)))
    }

    fn drain(ui: &mut Ui) -> Vec<Event> {
        std::iter::from_fn(|| ui.next_outbox_event()).collect()
    }

    #[test]
    fn centered_by_default() {
        let mut ui = ui();
        let modal = ui.create_root(Modal::new("Quit?", "Unsaved changes."), None).unwrap();
        assert_eq!(ui.region(modal).unwrap(), Region::new(8, 3, 24, 5));
    }

    #[test]
    fn caller_style_wins() {
        let mut ui = ui();
        let modal = ui
            .create_root(Modal::new("t", "m"), Some(StyleOptions::new().top(0).left(0).width(10)))
            .unwrap();
        assert_eq!(ui.region(modal).unwrap().x, 0);
        assert_eq!(ui.region(modal).unwrap().width, 10);
    }

    #[test]
    fn escape_requests_destroy_of_itself() {
        let mut ui = ui();
        let modal = ui.create_root(Modal::new("t", "m"), None).unwrap();
        drain(&mut ui);
        let key = KeyPress::parse("escape");
        let binding = ui.resolve_key(modal, &key).unwrap();
        (binding.handler)(&mut ui, modal, &key).unwrap();
        assert!(matches!(drain(&mut ui).as_slice(), [Event::Destroy { target }] if *target == modal));
    }

    #[test]
    fn button_closes_then_bubbles_action() {
        let mut ui = ui();
        let modal = ui
            .create_root(Modal::new("Quit?", "Sure?").with_button("Yes", Action::named("quit")), None)
            .unwrap();
        let button = *ui.children(modal).last().unwrap();
        drain(&mut ui);

        // Propagated escape reaches the button, owned by the modal.
        let escape = ui.resolve_key(button, &KeyPress::parse("escape")).unwrap();
        assert_eq!(escape.owner, Some(modal));

        let key = KeyPress::parse("enter");
        let binding = ui.resolve_key(button, &key).unwrap();
        (binding.handler)(&mut ui, button, &key).unwrap();
        let kinds: Vec<EventKind> = drain(&mut ui).iter().map(Event::kind).collect();
        assert_eq!(kinds, vec![EventKind::Destroy, EventKind::Action]);
    }

    #[test]
    fn focus_lands_on_first_button() {
        let mut ui = ui();
        let modal = ui
            .create_root(
                Modal::new("Save?", "Unsaved changes.")
                    .with_button("Yes", Action::named("save"))
                    .with_button("No", Action::named("discard")),
                None,
            )
            .unwrap();
        let yes = ui.children(modal)[2];
        ui.focus(modal).unwrap();
        assert_eq!(ui.focused_controller(), Some(yes));
    }

    #[test]
    fn without_buttons_focus_stays_on_modal() {
        let mut ui = ui();
        let modal = ui.create_root(Modal::new("Help", "escape closes"), None).unwrap();
        ui.focus(modal).unwrap();
        assert_eq!(ui.focused_controller(), Some(modal));
    }
}
