//! Checkbox: a boolean in the model, toggled with `space`.

use serde_json::Value;

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::event::{Event, KeyBinding};
use crate::geometry::Behavior;
use crate::store::StorePath;
use crate::widget::WidgetKind;

/// Mirrors the boolean at `path` (relative to the controller's model).
/// Toggling writes the store and emits [`Event::Checkbox`].
#[derive(Debug, Clone)]
pub struct Checkbox {
    label: String,
    path: StorePath,
}

impl Checkbox {
    pub fn new(label: impl Into<String>, path: impl Into<StorePath>) -> Self {
        Self { label: label.into(), path: path.into() }
    }
}

fn checked_at(ui: &Ui, id: ControllerId, path: &StorePath) -> Result<bool> {
    Ok(ui.model_get(id, path)?.and_then(|v| v.as_bool()).unwrap_or(false))
}

impl Component for Checkbox {
    fn name(&self) -> &str {
        "checkbox"
    }

    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Checkbox
    }

    fn behavior(&self) -> Behavior {
        Behavior::focusable()
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        ui.set_content(id, &self.label)?;
        let checked = checked_at(ui, id, &self.path)?;
        ui.set_checked(id, checked)?;

        ui.watch(id, &self.path, |ui, id, _, value| {
            ui.set_checked(id, value.as_bool().unwrap_or(false))?;
            ui.emit(id, &Event::Dirty);
            Ok(())
        })?;

        let path = self.path.clone();
        ui.bind_key(
            id,
            "space",
            KeyBinding::new(move |ui, id, _| {
                let checked = !checked_at(ui, id, &path)?;
                ui.model_set(id, &path, Value::Bool(checked))?;
                ui.emit(id, &Event::Checkbox { id, checked });
                Ok(())
            })
            .with_legend("Toggle")
            .with_priority(4),
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================
