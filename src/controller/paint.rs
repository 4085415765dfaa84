//! Frame preparation: theme cascade, layout application and backend render.

use super::{ControllerId, Ui};
use crate::error::Result;
use crate::geometry::Appearance;
use crate::theme::{layer, paint_appearance, resolve_component_style, StateFlags};

impl Ui {
    /// Theme base for the component plus the style-declared appearance.
    fn declared_appearance(&self, id: ControllerId) -> Result<Appearance> {
        let c = self.get(id)?;
        let base = resolve_component_style(&self.theme, c.name(), self.color_mode)
            .map(|style| style.base)
            .unwrap_or_default();
        Ok(base.overlay(&c.appearance))
    }

    /// What `id` passes down to its children: its ancestors' resting
    /// appearance with its own declared appearance on top. State overrides
    /// are not inherited.
    fn resting_appearance(&self, id: ControllerId) -> Result<Appearance> {
        let inherited = match self.parent(id) {
            Some(parent) => self.resting_appearance(parent)?,
            None => Appearance::default(),
        };
        Ok(layer(&inherited, [&self.declared_appearance(id)?]))
    }

    /// The appearance `id`'s widget is painted with this frame.
    pub fn painted_appearance(&self, id: ControllerId) -> Result<Appearance> {
        let c = self.get(id)?;
        let inherited = match c.parent {
            Some(parent) => self.resting_appearance(parent)?,
            None => Appearance::default(),
        };
        let style = resolve_component_style(&self.theme, c.name(), self.color_mode);
        let flags = StateFlags {
            focused: self.focused == Some(id),
            selected: c.selected,
            disabled: !c.enabled,
        };
        Ok(paint_appearance(&inherited, &self.declared_appearance(id)?, style.as_ref(), flags))
    }

    /// Controllers in paint order: each root, then its subtree depth-first.
    pub fn paint_order(&self) -> Vec<ControllerId> {
        let mut order = Vec::with_capacity(self.controllers.len());
        let mut stack: Vec<ControllerId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Run every controller's pre-paint hook, write appearances and layout
    /// results to the widgets, then draw.
    pub fn render(&mut self) -> Result<()> {
        for id in self.paint_order() {
            let Some(component) = self.controllers.get(id).map(|c| std::rc::Rc::clone(&c.component)) else {
                continue;
            };
            component.before_render(self, id)?;
            if !self.contains(id) {
                continue;
            }
            let appearance = self.painted_appearance(id)?;
            let widget = self.widget(id)?;
            self.backend.set_appearance(widget, appearance);
            self.apply_layout(id)?;
        }
        self.backend.render()?;
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
