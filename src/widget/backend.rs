//! The drawable-element contract controllers depend on.
//!
//! A [`Backend`] owns primitive widgets (boxes, labels, buttons, lists, text
//! fields, checkboxes) addressed by [`WidgetId`]. Controllers never draw;
//! they create widgets, attach them into a tree, and set layout properties,
//! content and appearance. The backend decides how that becomes pixels.

use std::any::Any;
use std::fmt;
use std::io;
use std::str::FromStr;

use slotmap::new_key_type;

use crate::error::UiError;
use crate::geometry::{Appearance, PropValue, Region, Size};

new_key_type! {
    /// Handle to a backend widget.
    pub struct WidgetId;
}

// ---------------------------------------------------------------------------
// WidgetKind
// ---------------------------------------------------------------------------

/// The primitive element types a backend can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidgetKind {
    #[default]
    Box,
    Label,
    Button,
    List,
    TextField,
    Checkbox,
}

// ---------------------------------------------------------------------------
// LayoutProp
// ---------------------------------------------------------------------------

/// The fixed set of properties a layout provider may drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayoutProp {
    Top,
    Bottom,
    Left,
    Right,
    Width,
    Height,
    Foreground,
    Background,
    FocusedForeground,
    FocusedBackground,
    SelectedForeground,
    SelectedBackground,
}

impl LayoutProp {
    /// Every property, in declaration order.
    pub const ALL: [LayoutProp; 12] = [
        LayoutProp::Top,
        LayoutProp::Bottom,
        LayoutProp::Left,
        LayoutProp::Right,
        LayoutProp::Width,
        LayoutProp::Height,
        LayoutProp::Foreground,
        LayoutProp::Background,
        LayoutProp::FocusedForeground,
        LayoutProp::FocusedBackground,
        LayoutProp::SelectedForeground,
        LayoutProp::SelectedBackground,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutProp::Top => "top",
            LayoutProp::Bottom => "bottom",
            LayoutProp::Left => "left",
            LayoutProp::Right => "right",
            LayoutProp::Width => "width",
            LayoutProp::Height => "height",
            LayoutProp::Foreground => "fg",
            LayoutProp::Background => "bg",
            LayoutProp::FocusedForeground => "focused-fg",
            LayoutProp::FocusedBackground => "focused-bg",
            LayoutProp::SelectedForeground => "selected-fg",
            LayoutProp::SelectedBackground => "selected-bg",
        }
    }

    /// Whether the property positions or sizes the widget.
    pub fn is_geometry(self) -> bool {
        matches!(
            self,
            LayoutProp::Top
                | LayoutProp::Bottom
                | LayoutProp::Left
                | LayoutProp::Right
                | LayoutProp::Width
                | LayoutProp::Height
        )
    }
}

impl fmt::Display for LayoutProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutProp {
    type Err = UiError;

    /// Accepts the short names (`"fg"`, `"focused-bg"`) and the long forms
    /// `"foreground"` / `"background"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prop = match s {
            "foreground" => LayoutProp::Foreground,
            "background" => LayoutProp::Background,
            other => LayoutProp::ALL
                .into_iter()
                .find(|p| p.name() == other)
                .ok_or_else(|| UiError::UnknownProperty(s.to_owned()))?,
        };
        Ok(prop)
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// A terminal-rendering backend.
///
/// Operations on a widget id the backend no longer knows are ignored;
/// controllers guard against missing widgets themselves.
pub trait Backend {
    /// Create a detached widget.
    fn create(&mut self, kind: WidgetKind) -> WidgetId;

    /// Attach `widget` under `parent`, or at the screen's top level for
    /// `None`. A widget already attached elsewhere is moved.
    fn attach(&mut self, widget: WidgetId, parent: Option<WidgetId>);

    /// Detach `widget` from its parent; it stops painting.
    fn detach(&mut self, widget: WidgetId);

    /// Destroy `widget` and every widget attached beneath it.
    fn destroy(&mut self, widget: WidgetId);

    /// Give `widget` the screen's input focus.
    fn focus(&mut self, widget: WidgetId);

    /// The widget holding input focus.
    fn focused(&self) -> Option<WidgetId>;

    /// Read a layout property. Unset properties read as [`PropValue::Unset`].
    fn get(&self, widget: WidgetId, prop: LayoutProp) -> PropValue;

    /// Write a layout property.
    fn set(&mut self, widget: WidgetId, prop: LayoutProp, value: PropValue);

    /// Replace the widget's painted appearance.
    fn set_appearance(&mut self, widget: WidgetId, appearance: Appearance);

    /// Replace the widget's text content.
    fn set_content(&mut self, widget: WidgetId, content: &str);

    /// Replace a list widget's rows.
    fn set_items(&mut self, widget: WidgetId, items: Vec<String>);

    /// Highlight a list row.
    fn select_item(&mut self, widget: WidgetId, index: Option<usize>);

    /// Set a checkbox's state.
    fn set_checked(&mut self, widget: WidgetId, checked: bool);

    /// The widget's resolved screen region.
    fn region(&self, widget: WidgetId) -> Region;

    /// Screen dimensions.
    fn screen_size(&self) -> Size;

    /// Notify the backend that the screen changed size.
    fn resize(&mut self, size: Size);

    /// Paint the current widget tree.
    fn render(&mut self) -> io::Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ===========================================================================
// Tests
// ===========================================================================
