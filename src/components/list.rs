//! ListView: a selectable list backed by a model array.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::Value;

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::event::{Event, KeyBinding};
use crate::geometry::Behavior;
use crate::store::StorePath;
use crate::widget::WidgetKind;

use super::display_text;

/// Where the rows come from.
#[derive(Debug, Clone)]
enum Source {
    Model(StorePath),
    Fixed(Vec<Value>),
}

/// `up`/`down` move the selection; `enter` emits [`Event::Selected`], or
/// [`Event::Launch`] when built with [`ListView::launching`].
#[derive(Debug, Clone)]
pub struct ListView {
    source: Source,
    launch: bool,
}

impl ListView {
    /// Rows from the array at `path` in the controller's model; the list
    /// refreshes when it is written.
    pub fn new(path: impl Into<StorePath>) -> Self {
        Self { source: Source::Model(path.into()), launch: false }
    }

    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = items.into_iter().map(|s| Value::String(s.into())).collect();
        Self { source: Source::Fixed(rows), launch: false }
    }

    /// Emit `Launch` with the selected row instead of `Selected`.
    pub fn launching(mut self) -> Self {
        self.launch = true;
        self
    }
}

fn rows(ui: &Ui, id: ControllerId, source: &Source) -> Result<Vec<Value>> {
    match source {
        Source::Fixed(rows) => Ok(rows.clone()),
        Source::Model(path) => Ok(match ui.model_get(id, path)? {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        }),
    }
}

/// Push rows and selection to the widget, clamping the selection.
fn refresh(ui: &mut Ui, id: ControllerId, source: &Source, selection: &Cell<usize>) -> Result<()> {
    let rows = rows(ui, id, source)?;
    let index = selection.get().min(rows.len().saturating_sub(1));
    selection.set(index);
    ui.set_items(id, rows.iter().map(display_text).collect())?;
    ui.select_item(id, (!rows.is_empty()).then_some(index))
}

impl Component for ListView {
    fn name(&self) -> &str {
        "list"
    }

    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::List
    }

    fn behavior(&self) -> Behavior {
        Behavior { focusable: true, scrollable: true }
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        let selection = Rc::new(Cell::new(0usize));
        let source = Rc::new(self.source.clone());
        refresh(ui, id, &source, &selection)?;

        if let Source::Model(path) = source.as_ref() {
            let (source, selection) = (Rc::clone(&source), Rc::clone(&selection));
            ui.watch(id, path, move |ui, id, _, _| {
                refresh(ui, id, &source, &selection)?;
                ui.emit(id, &Event::Dirty);
                Ok(())
            })?;
        }

        for (key, step, label) in [("up", -1isize, "Up"), ("down", 1, "Down")] {
            let (source, selection) = (Rc::clone(&source), Rc::clone(&selection));
            ui.bind_key(
                id,
                key,
                KeyBinding::new(move |ui, id, _| {
                    let len = rows(ui, id, &source)?.len();
                    if len == 0 {
                        return Ok(());
                    }
                    let next = (selection.get() as isize + step).clamp(0, len as isize - 1) as usize;
                    if next != selection.get() {
                        selection.set(next);
                        ui.select_item(id, Some(next))?;
                        ui.emit(id, &Event::Dirty);
                    }
                    Ok(())
                })
                .with_legend(label)
                .with_group("Navigate")
                .with_priority(8),
            )?;
        }

        let launch = self.launch;
        ui.bind_key(
            id,
            "enter",
            KeyBinding::new(move |ui, id, _| {
                let index = selection.get();
                let Some(value) = rows(ui, id, &source)?.into_iter().nth(index) else {
                    return Ok(());
                };
                let event = if launch {
                    Event::Launch { target: value }
                } else {
                    Event::Selected { id, index, value: Some(value) }
                };
                ui.emit(id, &event);
                Ok(())
            })
            .with_legend(if launch { "Launch" } else { "Select" })
            .with_priority(9),
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
    use crate::store::Store;
    use crate::widget::HeadlessBackend;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;

    struct Panel;

    impl Component for Panel {
        fn name(&self) -> &str {
            "container"
        }
    }

    fn press(ui: &mut Ui, id: ControllerId, key: &str) {
        let key = KeyPress::parse(key);
        let binding = ui.resolve_key(id, &key).unwrap();
        (binding.handler)(ui, id, &key).unwrap();
    }

    fn selected(ui: &Ui, id: ControllerId) -> Option<usize> {
        let widget = ui.widget(id).unwrap();
        ui.backend_as::<HeadlessBackend>().unwrap().surface().record(widget).unwrap().selected
    }

    #[test]
    fn arrows_move_and_clamp() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 5)));
        let list = ui.create_root(ListView::from_items(["web", "api", "worker"]), None).unwrap();
        assert_eq!(selected(&ui, list), Some(0));
        press(&mut ui, list, "up");
        assert_eq!(selected(&ui, list), Some(0));
        press(&mut ui, list, "down");
        press(&mut ui, list, "down");
        press(&mut ui, list, "down");
        assert_eq!(selected(&ui, list), Some(2));
    }

    #[test]
    fn enter_emits_selected_with_value() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 5)));
        let panel = ui.create_root(Panel, None).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        ui.on(panel, EventKind::Selected, move |_, _, event| {
            if let Event::Selected { index, value, .. } = event {
                *sink.borrow_mut() = Some((*index, value.clone()));
            }
            Ok(())
        })
        .unwrap();
        let list = ui.add_child(panel, ListView::from_items(["web", "api"]), None).unwrap();
        press(&mut ui, list, "down");
        press(&mut ui, list, "enter");
        assert_eq!(*seen.borrow(), Some((1, Some(json!("api")))));
    }

    #[test]
    fn launching_list_bubbles_launch() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 5)));
        let list = ui.create_root(ListView::from_items(["web"]).launching(), None).unwrap();
        while ui.next_outbox_event().is_some() {}
        press(&mut ui, list, "enter");
        assert!(matches!(ui.next_outbox_event(), Some(Event::Launch { target }) if target == json!("web")));
    }

    #[test]
    fn model_rows_refresh_on_write() {
        let store = Store::new(json!({"apps": [{"name": "web"}, {"name": "api"}]}));
        let mut ui = Ui::with_store(Box::new(HeadlessBackend::new(20, 5)), store);
        let list = ui.create_root(ListView::new("apps"), None).unwrap();
        press(&mut ui, list, "down");
        ui.set("apps", json!([{"name": "docs"}]));
        assert_eq!(selected(&ui, list), Some(0));
        ui.render().unwrap();
        assert_eq!(ui.backend_as::<HeadlessBackend>().unwrap().screen_text(), "docs");
    }
}
