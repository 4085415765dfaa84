//! Widget records, geometry resolution and painting shared by both backends.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use super::backend::{LayoutProp, WidgetId, WidgetKind};
use crate::geometry::{Appearance, PropValue, Region, Size};
use crate::render::{Canvas, CellStyle};

// ---------------------------------------------------------------------------
// WidgetRecord
// ---------------------------------------------------------------------------

/// Backend-side state of one widget.
#[derive(Debug, Clone, Default)]
pub struct WidgetRecord {
    pub kind: WidgetKind,
    pub parent: Option<WidgetId>,
    pub children: Vec<WidgetId>,
    /// Whether the widget is on screen (attached to a parent or the top level).
    pub attached: bool,
    pub props: BTreeMap<LayoutProp, PropValue>,
    pub appearance: Appearance,
    pub content: String,
    pub items: Vec<String>,
    pub selected: Option<usize>,
    pub checked: bool,
}

impl WidgetRecord {
    fn new(kind: WidgetKind) -> Self {
        Self { kind, ..Self::default() }
    }

    fn prop(&self, prop: LayoutProp) -> &PropValue {
        static UNSET: PropValue = PropValue::Unset;
        self.props.get(&prop).unwrap_or(&UNSET)
    }

    /// Size the widget takes when width/height are not constrained.
    fn natural_size(&self, available: Size) -> Size {
        let text_width = |s: &str| s.lines().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
        match self.kind {
            WidgetKind::Box => available,
            WidgetKind::List => Size::new(
                available.width,
                (self.items.len() as i32).min(available.height.max(0)),
            ),
            WidgetKind::Checkbox => Size::new(text_width(&self.content) + 4, 1),
            WidgetKind::Label | WidgetKind::Button | WidgetKind::TextField => {
                Size::new(text_width(&self.content), self.content.lines().count().max(1) as i32)
            }
        }
    }
}

/// Resolve one axis: returns (offset, length) within `extent`.
fn resolve_axis(start: &PropValue, end: &PropValue, len: &PropValue, extent: i32, natural: i32) -> (i32, i32) {
    let start_px = start.resolve(extent);
    let end_px = end.resolve(extent);
    let length = match (len.resolve(extent), start_px, end_px) {
        (Some(n), _, _) => n,
        (None, Some(s), Some(e)) => extent - s - e,
        (None, _, _) if natural >= extent => extent - start_px.unwrap_or(0) - end_px.unwrap_or(0),
        _ => natural,
    }
    .max(0);
    let offset = match (start, start_px, end_px) {
        (PropValue::Center, _, _) => (extent - length) / 2,
        (_, Some(s), _) => s,
        (_, None, Some(e)) => extent - e - length,
        _ => 0,
    };
    (offset, length)
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// Widget arena plus the screen it paints onto.
#[derive(Debug)]
pub struct Surface {
    widgets: SlotMap<WidgetId, WidgetRecord>,
    roots: Vec<WidgetId>,
    focused: Option<WidgetId>,
    size: Size,
}

impl Surface {
    pub fn new(size: Size) -> Self {
        Self { widgets: SlotMap::with_key(), roots: Vec::new(), focused: None, size }
    }

    pub fn record(&self, widget: WidgetId) -> Option<&WidgetRecord> {
        self.widgets.get(widget)
    }

    pub fn record_mut(&mut self, widget: WidgetId) -> Option<&mut WidgetRecord> {
        self.widgets.get_mut(widget)
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.focused
    }

    pub fn create(&mut self, kind: WidgetKind) -> WidgetId {
        self.widgets.insert(WidgetRecord::new(kind))
    }

    pub fn attach(&mut self, widget: WidgetId, parent: Option<WidgetId>) {
        if !self.widgets.contains_key(widget) || parent.is_some_and(|p| !self.widgets.contains_key(p)) {
            return;
        }
        self.detach(widget);
        match parent {
            Some(p) => {
                if let Some(record) = self.widgets.get_mut(p) {
                    record.children.push(widget);
                }
            }
            None => self.roots.push(widget),
        }
        if let Some(record) = self.widgets.get_mut(widget) {
            record.parent = parent;
            record.attached = true;
        }
    }

    pub fn detach(&mut self, widget: WidgetId) {
        let Some(record) = self.widgets.get_mut(widget) else { return };
        let parent = record.parent.take();
        record.attached = false;
        match parent {
            Some(p) => {
                if let Some(parent) = self.widgets.get_mut(p) {
                    parent.children.retain(|c| *c != widget);
                }
            }
            None => self.roots.retain(|r| *r != widget),
        }
    }

    pub fn destroy(&mut self, widget: WidgetId) {
        self.detach(widget);
        let mut stack = vec![widget];
        while let Some(id) = stack.pop() {
            if let Some(record) = self.widgets.remove(id) {
                stack.extend(record.children);
            }
            if self.focused == Some(id) {
                self.focused = None;
            }
        }
    }

    pub fn focus(&mut self, widget: WidgetId) {
        if self.widgets.contains_key(widget) {
            self.focused = Some(widget);
        }
    }

    pub fn get(&self, widget: WidgetId, prop: LayoutProp) -> PropValue {
        self.widgets.get(widget).map(|r| r.prop(prop).clone()).unwrap_or_default()
    }

    pub fn set(&mut self, widget: WidgetId, prop: LayoutProp, value: PropValue) {
        if let Some(record) = self.widgets.get_mut(widget) {
            if value.is_set() {
                record.props.insert(prop, value);
            } else {
                record.props.remove(&prop);
            }
        }
    }

    /// Absolute screen region of `widget`, ignoring clipping.
    pub fn region(&self, widget: WidgetId) -> Region {
        let Some(record) = self.widgets.get(widget) else {
            return Region::EMPTY;
        };
        let parent = match record.parent {
            Some(p) => self.region(p),
            None => self.size.to_region(),
        };
        let natural = record.natural_size(parent.size());
        let (x, width) = resolve_axis(
            record.prop(LayoutProp::Left),
            record.prop(LayoutProp::Right),
            record.prop(LayoutProp::Width),
            parent.width,
            natural.width,
        );
        let (y, height) = resolve_axis(
            record.prop(LayoutProp::Top),
            record.prop(LayoutProp::Bottom),
            record.prop(LayoutProp::Height),
            parent.height,
            natural.height,
        );
        Region::new(parent.x + x, parent.y + y, width, height)
    }

    // -- Painting -----------------------------------------------------------

    /// Paint every attached widget, top-level widgets in attach order, each
    /// subtree depth-first so later siblings draw over earlier ones.
    pub fn paint(&self) -> Canvas {
        let mut canvas = Canvas::with_size(self.size);
        let screen = canvas.bounds();
        for root in &self.roots {
            self.paint_widget(&mut canvas, *root, screen);
        }
        canvas
    }

    fn paint_widget(&self, canvas: &mut Canvas, widget: WidgetId, clip: Region) {
        let Some(record) = self.widgets.get(widget) else { return };
        let region = self.region(widget);
        let clip = region.intersection(clip);
        if clip.is_empty() {
            return;
        }

        let focused = self.focused == Some(widget);
        let style = self.widget_style(record, focused);
        canvas.fill(region, clip, &style);

        match record.kind {
            WidgetKind::List => self.paint_list(canvas, record, region, clip, &style),
            WidgetKind::Checkbox => {
                let mark = if record.checked { "[x] " } else { "[ ] " };
                let used = canvas.put_str(region.x, region.y, mark, &style, clip);
                canvas.put_str(region.x + used, region.y, &record.content, &style, clip);
            }
            _ => {
                for (row, line) in record.content.lines().enumerate() {
                    canvas.put_str(region.x, region.y + row as i32, line, &style, clip);
                }
            }
        }

        for child in &record.children {
            self.paint_widget(canvas, *child, clip);
        }
    }

    fn paint_list(&self, canvas: &mut Canvas, record: &WidgetRecord, region: Region, clip: Region, style: &CellStyle) {
        let selected_style = {
            let fg = record.prop(LayoutProp::SelectedForeground).as_color();
            let bg = record.prop(LayoutProp::SelectedBackground).as_color();
            if fg.is_none() && bg.is_none() {
                style.inverted()
            } else {
                CellStyle {
                    fg: fg.map(str::to_owned).or_else(|| style.fg.clone()),
                    bg: bg.map(str::to_owned).or_else(|| style.bg.clone()),
                    ..style.clone()
                }
            }
        };
        // Keep the selected row visible.
        let visible = region.height.max(1) as usize;
        let first = record.selected.map_or(0, |s| (s + 1).saturating_sub(visible));
        for (row, (index, item)) in record.items.iter().enumerate().skip(first).take(visible).enumerate() {
            let row_style = if record.selected == Some(index) { &selected_style } else { style };
            let y = region.y + row as i32;
            canvas.fill(Region::new(region.x, y, region.width, 1), clip, row_style);
            canvas.put_str(region.x, y, item, row_style, clip);
        }
    }

    /// Appearance plus color properties, with focused colors when focused.
    fn widget_style(&self, record: &WidgetRecord, focused: bool) -> CellStyle {
        let mut style = CellStyle::from_appearance(&record.appearance);
        let pick = |prop: LayoutProp| record.prop(prop).as_color().map(str::to_owned);
        if let Some(fg) = pick(LayoutProp::Foreground) {
            style.fg = Some(fg);
        }
        if let Some(bg) = pick(LayoutProp::Background) {
            style.bg = Some(bg);
        }
        if focused {
            if let Some(fg) = pick(LayoutProp::FocusedForeground) {
                style.fg = Some(fg);
            }
            if let Some(bg) = pick(LayoutProp::FocusedBackground) {
                style.bg = Some(bg);
            }
        }
        style
    }
}

// ===========================================================================
// Tests
// ===========================================================================
