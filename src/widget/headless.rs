//! A backend that draws into memory and records every call.

use std::any::Any;
use std::io;

use super::backend::{Backend, LayoutProp, WidgetId, WidgetKind};
use super::surface::Surface;
use crate::geometry::{Appearance, PropValue, Region, Size};
use crate::render::Canvas;

/// One recorded backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Create(WidgetId, WidgetKind),
    Attach(WidgetId, Option<WidgetId>),
    Detach(WidgetId),
    Destroy(WidgetId),
    Focus(WidgetId),
    Set(WidgetId, LayoutProp, PropValue),
    SetAppearance(WidgetId),
    SetContent(WidgetId, String),
    SetItems(WidgetId, usize),
    SelectItem(WidgetId, Option<usize>),
    SetChecked(WidgetId, bool),
    Resize(Size),
    Render,
}

/// Headless backend for tests: paints into a [`Canvas`] on `render()`.
#[derive(Debug)]
pub struct HeadlessBackend {
    surface: Surface,
    calls: Vec<BackendCall>,
    frame: Canvas,
    renders: usize,
}

impl HeadlessBackend {
    /// A headless screen of `width` x `height` cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            surface: Surface::new(Size::new(i32::from(width), i32::from(height))),
            calls: Vec::new(),
            frame: Canvas::new(width, height),
            renders: 0,
        }
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &Canvas {
        &self.frame
    }

    /// The most recently rendered frame as text.
    pub fn screen_text(&self) -> String {
        self.frame.to_text()
    }

    /// How many times `render()` ran.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl Backend for HeadlessBackend {
    fn create(&mut self, kind: WidgetKind) -> WidgetId {
        let id = self.surface.create(kind);
        self.calls.push(BackendCall::Create(id, kind));
        id
    }

    fn attach(&mut self, widget: WidgetId, parent: Option<WidgetId>) {
        self.calls.push(BackendCall::Attach(widget, parent));
        self.surface.attach(widget, parent);
    }

    fn detach(&mut self, widget: WidgetId) {
        self.calls.push(BackendCall::Detach(widget));
        self.surface.detach(widget);
    }

    fn destroy(&mut self, widget: WidgetId) {
        self.calls.push(BackendCall::Destroy(widget));
        self.surface.destroy(widget);
    }

    fn focus(&mut self, widget: WidgetId) {
        self.calls.push(BackendCall::Focus(widget));
        self.surface.focus(widget);
    }

    fn focused(&self) -> Option<WidgetId> {
        self.surface.focused()
    }

    fn get(&self, widget: WidgetId, prop: LayoutProp) -> PropValue {
        self.surface.get(widget, prop)
    }

    fn set(&mut self, widget: WidgetId, prop: LayoutProp, value: PropValue) {
        self.calls.push(BackendCall::Set(widget, prop, value.clone()));
        self.surface.set(widget, prop, value);
    }

    fn set_appearance(&mut self, widget: WidgetId, appearance: Appearance) {
        self.calls.push(BackendCall::SetAppearance(widget));
        if let Some(record) = self.surface.record_mut(widget) {
            record.appearance = appearance;
        }
    }

    fn set_content(&mut self, widget: WidgetId, content: &str) {
        self.calls.push(BackendCall::SetContent(widget, content.to_owned()));
        if let Some(record) = self.surface.record_mut(widget) {
            record.content = content.to_owned();
        }
    }

    fn set_items(&mut self, widget: WidgetId, items: Vec<String>) {
        self.calls.push(BackendCall::SetItems(widget, items.len()));
        if let Some(record) = self.surface.record_mut(widget) {
            record.items = items;
        }
    }

    fn select_item(&mut self, widget: WidgetId, index: Option<usize>) {
        self.calls.push(BackendCall::SelectItem(widget, index));
        if let Some(record) = self.surface.record_mut(widget) {
            record.selected = index;
        }
    }

    fn set_checked(&mut self, widget: WidgetId, checked: bool) {
        self.calls.push(BackendCall::SetChecked(widget, checked));
        if let Some(record) = self.surface.record_mut(widget) {
            record.checked = checked;
        }
    }

    fn region(&self, widget: WidgetId) -> Region {
        self.surface.region(widget)
    }

    fn screen_size(&self) -> Size {
        self.surface.size()
    }

    fn resize(&mut self, size: Size) {
        self.calls.push(BackendCall::Resize(size));
        self.surface.set_size(size);
    }

    fn render(&mut self) -> io::Result<()> {
        self.calls.push(BackendCall::Render);
        self.frame = self.surface.paint();
        self.renders += 1;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut b = HeadlessBackend::new(10, 2);
        let w = b.create(WidgetKind::Label);
        b.attach(w, None);
        b.set_content(w, "hi");
        b.render().unwrap();
        assert_eq!(
            b.calls(),
            &[
                BackendCall::Create(w, WidgetKind::Label),
                BackendCall::Attach(w, None),
                BackendCall::SetContent(w, "hi".into()),
                BackendCall::Render,
            ]
        );
        assert_eq!(b.screen_text(), "hi");
        assert_eq!(b.render_count(), 1);
    }

    #[test]
    fn resize_changes_next_frame() {
        let mut b = HeadlessBackend::new(10, 2);
        b.resize(Size::new(4, 1));
        b.render().unwrap();
        assert_eq!(b.frame().width(), 4);
        assert_eq!(b.screen_size(), Size::new(4, 1));
    }

    #[test]
    fn downcasts_through_any() {
        let b: Box<dyn Backend> = Box::new(HeadlessBackend::default());
        assert!(b.as_any().downcast_ref::<HeadlessBackend>().is_some());
    }
}
