//! Plain value descriptors: Size, Region, PropValue, Appearance, Behavior.
//!
//! These are the foundational value types shared by controllers, layout
//! bindings, the theme cascade and the widget backends. None of them carry
//! behavior beyond small pure helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in terminal cells (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Convert to a [`Region`] positioned at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region { x: 0, y: 0, width: self.width, height: self.height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A rectangular region in terminal cells defined by position and size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether the region has no area.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the point (x, y) lies inside this region.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute the intersection of two regions.
    ///
    /// Returns [`Region::EMPTY`] if the regions do not overlap.
    #[inline]
    pub const fn intersection(self, other: Region) -> Region {
        let x1 = if self.x > other.x { self.x } else { other.x };
        let y1 = if self.y > other.y { self.y } else { other.y };

        let sr = self.right();
        let or = other.right();
        let x2 = if sr < or { sr } else { or };

        let sb = self.bottom();
        let ob = other.bottom();
        let y2 = if sb < ob { sb } else { ob };

        let w = x2 - x1;
        let h = y2 - y1;

        if w <= 0 || h <= 0 {
            Region::EMPTY
        } else {
            Region { x: x1, y: y1, width: w, height: h }
        }
    }
}

// ---------------------------------------------------------------------------
// PropValue
// ---------------------------------------------------------------------------

/// The value of one layout property on a widget.
///
/// Positional values are resolved against the parent's extent at paint time,
/// so `Percent` and `Center` track the parent as it resizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PropValue {
    /// Not set; the backend falls back to the widget's natural placement.
    #[default]
    Unset,
    /// An absolute number of cells.
    Cells(i32),
    /// A percentage of the parent's extent plus a signed cell offset
    /// (`"50%-2"` is `Percent { percent: 50, offset: -2 }`).
    Percent { percent: u16, offset: i32 },
    /// Centered within the parent (only meaningful for `top`/`left`).
    Center,
    /// A color name or `#rrggbb` value.
    Color(String),
}

impl PropValue {
    /// Whether a value is present.
    pub fn is_set(&self) -> bool {
        !matches!(self, PropValue::Unset)
    }

    /// Resolve a length against the available extent.
    ///
    /// `Center`, `Color` and `Unset` do not resolve to a length.
    pub fn resolve(&self, available: i32) -> Option<i32> {
        match self {
            PropValue::Cells(n) => Some(*n),
            PropValue::Percent { percent, offset } => {
                Some(available * i32::from(*percent) / 100 + offset)
            }
            PropValue::Unset | PropValue::Center | PropValue::Color(_) => None,
        }
    }

    /// The color string, if this is a color value.
    pub fn as_color(&self) -> Option<&str> {
        match self {
            PropValue::Color(c) => Some(c),
            _ => None,
        }
    }

    /// Construct a color value.
    pub fn color(name: impl Into<String>) -> Self {
        PropValue::Color(name.into())
    }

    /// Construct a percentage value with no offset.
    pub fn percent(percent: u16) -> Self {
        PropValue::Percent { percent, offset: 0 }
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Cells(n)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Unset => Ok(()),
            PropValue::Cells(n) => write!(f, "{n}"),
            PropValue::Percent { percent, offset: 0 } => write!(f, "{percent}%"),
            PropValue::Percent { percent, offset } if *offset > 0 => {
                write!(f, "{percent}%+{offset}")
            }
            PropValue::Percent { percent, offset } => write!(f, "{percent}%{offset}"),
            PropValue::Center => write!(f, "center"),
            PropValue::Color(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for PropValue {
    type Err = std::convert::Infallible;

    /// Parse `"12"`, `"50%"`, `"50%-2"`, `"center"`; anything else is a color.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(PropValue::Unset);
        }
        if s.eq_ignore_ascii_case("center") {
            return Ok(PropValue::Center);
        }
        if let Ok(n) = s.parse::<i32>() {
            return Ok(PropValue::Cells(n));
        }
        if let Some((pct, rest)) = s.split_once('%') {
            if let Ok(percent) = pct.trim().parse::<u16>() {
                let rest = rest.trim();
                let offset = if rest.is_empty() {
                    Some(0)
                } else {
                    rest.strip_prefix('+').unwrap_or(rest).trim().parse::<i32>().ok()
                };
                if let Some(offset) = offset {
                    return Ok(PropValue::Percent { percent, offset });
                }
            }
        }
        Ok(PropValue::Color(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Appearance
// ---------------------------------------------------------------------------

/// Visual attributes of a widget. `None` means "not set here".
///
/// Appearances cascade: a later layer's set fields replace an earlier
/// layer's, unset fields fall through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse: Option<bool>,
}

impl Appearance {
    /// An appearance with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the foreground color (builder).
    pub fn with_fg(mut self, fg: impl Into<String>) -> Self {
        self.fg = Some(fg.into());
        self
    }

    /// Set the background color (builder).
    pub fn with_bg(mut self, bg: impl Into<String>) -> Self {
        self.bg = Some(bg.into());
        self
    }

    /// Set bold (builder).
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    /// Set underline (builder).
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = Some(underline);
        self
    }

    /// Set inverse video (builder).
    pub fn with_inverse(mut self, inverse: bool) -> Self {
        self.inverse = Some(inverse);
        self
    }

    /// Lay `other` on top of `self`: each field set in `other` wins.
    pub fn overlay(&self, other: &Appearance) -> Appearance {
        fn pick<T: Clone>(base: &Option<T>, top: &Option<T>) -> Option<T> {
            if top.is_some() {
                top.clone()
            } else {
                base.clone()
            }
        }

        Appearance {
            fg: pick(&self.fg, &other.fg),
            bg: pick(&self.bg, &other.bg),
            bold: pick(&self.bold, &other.bold),
            underline: pick(&self.underline, &other.underline),
            inverse: pick(&self.inverse, &other.inverse),
        }
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.fg.is_none()
            && self.bg.is_none()
            && self.bold.is_none()
            && self.underline.is_none()
            && self.inverse.is_none()
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// Interaction traits a component declares for its controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Behavior {
    /// Whether the controller itself can take focus.
    pub focusable: bool,
    /// Whether the widget scrolls its content.
    pub scrollable: bool,
}

impl Behavior {
    /// A focusable, non-scrolling behavior.
    pub const fn focusable() -> Self {
        Self { focusable: true, scrollable: false }
    }
}

// ---------------------------------------------------------------------------
// StyleOptions
// ---------------------------------------------------------------------------

/// Geometry and appearance applied to a controller when it is added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOptions {
    pub top: Option<PropValue>,
    pub bottom: Option<PropValue>,
    pub left: Option<PropValue>,
    pub right: Option<PropValue>,
    pub width: Option<PropValue>,
    pub height: Option<PropValue>,
    pub appearance: Appearance,
}

impl StyleOptions {
    /// Empty style options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `top` (builder).
    pub fn top(mut self, value: impl Into<PropValue>) -> Self {
        self.top = Some(value.into());
        self
    }

    /// Set `bottom` (builder).
    pub fn bottom(mut self, value: impl Into<PropValue>) -> Self {
        self.bottom = Some(value.into());
        self
    }

    /// Set `left` (builder).
    pub fn left(mut self, value: impl Into<PropValue>) -> Self {
        self.left = Some(value.into());
        self
    }

    /// Set `right` (builder).
    pub fn right(mut self, value: impl Into<PropValue>) -> Self {
        self.right = Some(value.into());
        self
    }

    /// Set `width` (builder).
    pub fn width(mut self, value: impl Into<PropValue>) -> Self {
        self.width = Some(value.into());
        self
    }

    /// Set `height` (builder).
    pub fn height(mut self, value: impl Into<PropValue>) -> Self {
        self.height = Some(value.into());
        self
    }

    /// Set the declared appearance (builder).
    pub fn appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    /// Lay `other` over `self`: geometry set in `other` wins, appearances overlay.
    pub fn overlay(&self, other: &StyleOptions) -> StyleOptions {
        StyleOptions {
            top: other.top.clone().or_else(|| self.top.clone()),
            bottom: other.bottom.clone().or_else(|| self.bottom.clone()),
            left: other.left.clone().or_else(|| self.left.clone()),
            right: other.right.clone().or_else(|| self.right.clone()),
            width: other.width.clone().or_else(|| self.width.clone()),
            height: other.height.clone().or_else(|| self.height.clone()),
            appearance: self.appearance.overlay(&other.appearance),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ── Region ───────────────────────────────────────────────────────

    #[test]
    fn region_edges() {
        let r = Region::new(2, 3, 10, 4);
        assert_eq!(r.right(), 12);
        assert_eq!(r.bottom(), 7);
        assert!(r.contains(2, 3));
        assert!(!r.contains(12, 3));
    }

    #[test]
    fn region_intersection_disjoint_is_empty() {
        let a = Region::new(0, 0, 5, 5);
        let b = Region::new(10, 10, 5, 5);
        assert_eq!(a.intersection(b), Region::EMPTY);
        assert!(a.intersection(b).is_empty());
    }

    #[test]
    fn region_intersection_overlap() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(5, 5, 10, 10);
        assert_eq!(a.intersection(b), Region::new(5, 5, 5, 5));
    }

    // ── PropValue ────────────────────────────────────────────────────

    #[test]
    fn prop_value_parse_forms() {
        assert_eq!("12".parse::<PropValue>().unwrap(), PropValue::Cells(12));
        assert_eq!("center".parse::<PropValue>().unwrap(), PropValue::Center);
        assert_eq!(
            "50%".parse::<PropValue>().unwrap(),
            PropValue::Percent { percent: 50, offset: 0 }
        );
        assert_eq!(
            "50%-2".parse::<PropValue>().unwrap(),
            PropValue::Percent { percent: 50, offset: -2 }
        );
        assert_eq!(
            "100%+1".parse::<PropValue>().unwrap(),
            PropValue::Percent { percent: 100, offset: 1 }
        );
        assert_eq!("red".parse::<PropValue>().unwrap(), PropValue::color("red"));
        assert_eq!("".parse::<PropValue>().unwrap(), PropValue::Unset);
    }

    #[test]
    fn prop_value_display_roundtrips_percent_offsets() {
        assert_eq!(PropValue::Percent { percent: 50, offset: -2 }.to_string(), "50%-2");
        assert_eq!(PropValue::Percent { percent: 50, offset: 3 }.to_string(), "50%+3");
        assert_eq!(PropValue::percent(25).to_string(), "25%");
    }

    #[test]
    fn prop_value_resolve() {
        assert_eq!(PropValue::Cells(4).resolve(80), Some(4));
        assert_eq!(PropValue::Percent { percent: 50, offset: -2 }.resolve(80), Some(38));
        assert_eq!(PropValue::Center.resolve(80), None);
        assert_eq!(PropValue::Unset.resolve(80), None);
    }

    // ── Appearance ───────────────────────────────────────────────────

    #[test]
    fn appearance_overlay_prefers_top() {
        let base = Appearance::new().with_fg("white").with_bg("black");
        let top = Appearance::new().with_bg("blue").with_bold(true);
        let merged = base.overlay(&top);
        assert_eq!(merged.fg.as_deref(), Some("white"));
        assert_eq!(merged.bg.as_deref(), Some("blue"));
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.underline, None);
    }

    #[test]
    fn appearance_overlay_empty_is_identity() {
        let base = Appearance::new().with_fg("green").with_inverse(true);
        assert_eq!(base.overlay(&Appearance::new()), base);
        assert!(Appearance::new().is_empty());
    }

    // ── StyleOptions ─────────────────────────────────────────────────

    #[test]
    fn style_options_overlay() {
        let call_site = StyleOptions::new().top(1).left(2).appearance(Appearance::new().with_fg("red"));
        let declared = StyleOptions::new().left(5).width(PropValue::percent(50));
        let merged = call_site.overlay(&declared);
        assert_eq!(merged.top, Some(PropValue::Cells(1)));
        assert_eq!(merged.left, Some(PropValue::Cells(5)));
        assert_eq!(merged.width, Some(PropValue::percent(50)));
        assert_eq!(merged.appearance.fg.as_deref(), Some("red"));
    }
}
