//! KeyLegendBar: a one-line key legend for whatever controller is active.

use tracing::trace;

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::geometry::PropValue;
use crate::legend::{generate_keystroke_legend, render_legend_categories, LegendOptions, RenderOptions};
use crate::widget::{LayoutProp, WidgetKind};

/// Regenerated before every frame from the active controller's effective key
/// map, culled to fit the bar's width.
#[derive(Debug, Clone, Default)]
pub struct KeyLegendBar {
    legend: LegendOptions,
    render: RenderOptions,
}

impl KeyLegendBar {
    pub fn new(legend: LegendOptions, render: RenderOptions) -> Self {
        Self { legend, render }
    }

    /// Controller whose keys are shown: the active one, else the focused
    /// one, else the bar itself.
    fn target(ui: &Ui, id: ControllerId) -> ControllerId {
        ui.active_controller().or_else(|| ui.focused_controller()).unwrap_or(id)
    }
}

impl Component for KeyLegendBar {
    fn name(&self) -> &str {
        "legend"
    }

    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Label
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        if !ui.prop(id, LayoutProp::Width)?.is_set() {
            ui.set_prop(id, LayoutProp::Width, PropValue::percent(100))?;
        }
        let top = ui.prop(id, LayoutProp::Top)?;
        let bottom = ui.prop(id, LayoutProp::Bottom)?;
        if !top.is_set() && !bottom.is_set() {
            ui.set_prop(id, LayoutProp::Bottom, 0)?;
        }
        Ok(())
    }

    fn before_render(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        let target = Self::target(ui, id);
        let legend = generate_keystroke_legend(ui, target, &self.legend)?;

        let available = ui.region(id)?.width.max(0) as usize;
        let max_width = self.render.max_width.map_or(available, |w| w.min(available));
        let options = RenderOptions { max_width: Some(max_width), ..self.render.clone() };

        let rendered = render_legend_categories(&legend, &options);
        if !rendered.removed.is_empty() {
            trace!(?target, culled = rendered.removed.len(), "legend culled to fit");
        }
        ui.set_content(id, &rendered.text)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyBinding;
    use crate::widget::HeadlessBackend;
    use pretty_assertions::assert_eq;

    struct Panel;

    impl Component for Panel {
        fn name(&self) -> &str {
            "container"
        }

        fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
            ui.bind_key(id, "q", KeyBinding::new(|_, _, _| Ok(())).with_legend("Quit").with_priority(5))?;
            ui.bind_key(id, "?", KeyBinding::new(|_, _, _| Ok(())).with_legend("Help").with_priority(1))
        }
    }

    fn screen(ui: &mut Ui) -> String {
        ui.render().unwrap();
        ui.backend_as::<HeadlessBackend>().unwrap().screen_text()
    }

    #[test]
    fn docks_to_bottom_and_shows_active_keys() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(30, 3)));
        let root = ui.create_root(Panel, None).unwrap();
        ui.add_child(root, KeyLegendBar::default(), None).unwrap();
        ui.set_active_controller(root);
        assert_eq!(screen(&mut ui), "\n\nq = Quit  ? = Help");
    }

    #[test]
    fn culls_to_bar_width() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(10, 1)));
        let root = ui.create_root(Panel, None).unwrap();
        ui.add_child(root, KeyLegendBar::default(), None).unwrap();
        ui.set_active_controller(root);
        assert_eq!(screen(&mut ui), "q = Quit");
    }

    #[test]
    fn configured_max_width_can_be_narrower() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(30, 1)));
        let root = ui.create_root(Panel, None).unwrap();
        let bar = KeyLegendBar::new(LegendOptions::new(), RenderOptions::new().with_max_width(8));
        ui.add_child(root, bar, None).unwrap();
        ui.set_active_controller(root);
        assert_eq!(screen(&mut ui), "q = Quit");
    }
}
