//! Container: a layout box holding other components.

use std::rc::Rc;

use crate::controller::{Component, ControllerId, Ui};
use crate::error::Result;
use crate::event::{ComponentFactory, KeyBinding};
use crate::geometry::StyleOptions;
use crate::layout::below;
use crate::widget::LayoutProp;

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// A non-focusable box. Children are built at mount, in order.
///
/// # Examples
///
/// ```ignore
/// let form = Container::new()
///     .stacked(1)
///     .with_navigation()
///     .with_child(|| Box::new(Label::new("Name")), None)
///     .with_child(|| Box::new(TextField::new("name")), None);
/// ```
#[derive(Clone, Default)]
pub struct Container {
    children: Vec<(ComponentFactory, Option<StyleOptions>)>,
    navigation: bool,
    stack_gap: Option<i32>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child built by `factory` (builder).
    pub fn with_child(
        mut self,
        factory: impl Fn() -> Box<dyn Component> + 'static,
        style: Option<StyleOptions>,
    ) -> Self {
        self.children.push((Rc::new(factory), style));
        self
    }

    /// Bind `tab` / `S-tab` to cycle focus among the children. The bindings
    /// propagate to children added at mount.
    pub fn with_navigation(mut self) -> Self {
        self.navigation = true;
        self
    }

    /// Lay children out top to bottom, `gap` rows apart, recomputed every
    /// frame.
    pub fn stacked(mut self, gap: i32) -> Self {
        self.stack_gap = Some(gap);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Component for Container {
    fn name(&self) -> &str {
        "container"
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        if self.navigation {
            ui.bind_key(
                id,
                "tab",
                KeyBinding::new(|ui, id, _| ui.next_child(id, 1).map(|_| ()))
                    .with_propagate(true)
                    .with_legend("Next")
                    .with_group("Focus")
                    .with_priority(1),
            )?;
            ui.bind_key(
                id,
                "S-tab",
                KeyBinding::new(|ui, id, _| ui.next_child(id, -1).map(|_| ()))
                    .with_propagate(true)
                    .with_legend("Previous")
                    .with_group("Focus")
                    .with_priority(1),
            )?;
        }

        let mut previous: Option<ControllerId> = None;
        for (factory, style) in &self.children {
            let child = ui.add_child(id, factory(), style.clone())?;
            if let (Some(gap), Some(prev)) = (self.stack_gap, previous) {
                ui.bind_layout(child, LayoutProp::Top, below(prev, gap))?;
            }
            previous = Some(child);
        }

        // Focus enters at the first child that can take it.
        let first = ui.children(id).iter().copied().find(|child| ui.is_focusable(*child));
        if let Some(child) = first {
            ui.set_focused_child(id, child)?;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
