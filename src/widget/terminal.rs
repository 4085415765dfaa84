//! A crossterm backend with differential redraw.

use std::any::Any;
use std::io;

use super::backend::{Backend, LayoutProp, WidgetId, WidgetKind};
use super::surface::Surface;
use crate::geometry::{Appearance, PropValue, Region, Size};
use crate::render::{Canvas, Driver};

/// Draws to the real terminal. Only cells that changed since the previous
/// frame are written.
pub struct TerminalBackend {
    surface: Surface,
    driver: Driver,
    previous: Option<Canvas>,
}

impl TerminalBackend {
    /// Enter the alternate screen sized to the current terminal.
    pub fn new() -> io::Result<Self> {
        let (width, height) = Driver::terminal_size()?;
        let mut driver = Driver::new();
        driver.enter()?;
        Ok(Self {
            surface: Surface::new(Size::new(i32::from(width), i32::from(height))),
            driver,
            previous: None,
        })
    }

    /// Restore the terminal. Also runs on drop.
    pub fn shutdown(&mut self) -> io::Result<()> {
        self.driver.leave()
    }
}

impl Backend for TerminalBackend {
    fn create(&mut self, kind: WidgetKind) -> WidgetId {
        self.surface.create(kind)
    }

    fn attach(&mut self, widget: WidgetId, parent: Option<WidgetId>) {
        self.surface.attach(widget, parent);
    }

    fn detach(&mut self, widget: WidgetId) {
        self.surface.detach(widget);
    }

    fn destroy(&mut self, widget: WidgetId) {
        self.surface.destroy(widget);
    }

    fn focus(&mut self, widget: WidgetId) {
        self.surface.focus(widget);
    }

    fn focused(&self) -> Option<WidgetId> {
        self.surface.focused()
    }

    fn get(&self, widget: WidgetId, prop: LayoutProp) -> PropValue {
        self.surface.get(widget, prop)
    }

    fn set(&mut self, widget: WidgetId, prop: LayoutProp, value: PropValue) {
        self.surface.set(widget, prop, value);
    }

    fn set_appearance(&mut self, widget: WidgetId, appearance: Appearance) {
        if let Some(record) = self.surface.record_mut(widget) {
            record.appearance = appearance;
        }
    }

    fn set_content(&mut self, widget: WidgetId, content: &str) {
        if let Some(record) = self.surface.record_mut(widget) {
            record.content = content.to_owned();
        }
    }

    fn set_items(&mut self, widget: WidgetId, items: Vec<String>) {
        if let Some(record) = self.surface.record_mut(widget) {
            record.items = items;
        }
    }

    fn select_item(&mut self, widget: WidgetId, index: Option<usize>) {
        if let Some(record) = self.surface.record_mut(widget) {
            record.selected = index;
        }
    }

    fn set_checked(&mut self, widget: WidgetId, checked: bool) {
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
        self.surface.set_size(size);
        self.previous = None;
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.surface.paint();
        let updates = match &self.previous {
            Some(previous) if previous.width() == frame.width() && previous.height() == frame.height() => {
                frame.diff(previous)
            }
            _ => frame.full_update(),
        };
        self.driver.apply(&updates)?;
        self.driver.flush()?;
        self.previous = Some(frame);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
