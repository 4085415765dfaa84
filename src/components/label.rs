//! Label: static or model-bound text.

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::store::StorePath;
use crate::widget::WidgetKind;

use super::display_text;

/// Text that is either fixed or follows a path in the controller's model.
#[derive(Debug, Clone)]
pub struct Label {
    text: String,
    bound: Option<StorePath>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), bound: None }
    }

    /// A label showing the model value at `path` (relative to the
    /// controller's model) and updating when it is written.
    pub fn bound(path: impl Into<StorePath>) -> Self {
        Self { text: String::new(), bound: Some(path.into()) }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Component for Label {
    fn name(&self) -> &str {
        "label"
    }

    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Label
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        let Some(path) = &self.bound else {
            return ui.set_content(id, &self.text);
        };
        let initial = ui.model_get(id, path)?.map(|v| display_text(&v)).unwrap_or_default();
        ui.set_content(id, &initial)?;
        ui.watch(id, path, |ui, id, _, value| {
            ui.set_content(id, &display_text(value))?;
            ui.emit(id, &crate::event::Event::Dirty);
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
    use crate::controller::ChildDescriptor;
    use crate::store::Store;
    use crate::widget::HeadlessBackend;
    use serde_json::json;

    fn screen(ui: &mut Ui) -> String {
        ui.render().unwrap();
        ui.backend_as::<HeadlessBackend>().unwrap().screen_text()
    }

    #[test]
    fn static_text() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 2)));
        ui.create_root(Label::new("hello"), None).unwrap();
        assert_eq!(screen(&mut ui), "hello");
    }

    #[test]
    fn bound_text_follows_the_store() {
        let store = Store::new(json!({"status": {"web": "stopped"}}));
        let mut ui = Ui::with_store(Box::new(HeadlessBackend::new(20, 2)), store);
        ui.create_root(ChildDescriptor::new(Label::bound("web")).with_model("status"), None)
            .unwrap();
        assert_eq!(screen(&mut ui), "stopped");
        ui.set("status.web", json!("running"));
        assert_eq!(screen(&mut ui), "running");
    }
}
