//! Theme data and the appearance cascade.
//!
//! A [`Theme`] maps component names to a base [`Appearance`], optional
//! focused/selected/disabled state overrides, and per-[`ColorMode`]
//! overrides of each. Themes are plain data, deserialized from TOML or JSON:
//!
//! ```toml
//! [button]
//! fg = "white"
//! bg = "blue"
//!
//! [button.modes.light]
//! fg = "black"
//!
//! [button.focused]
//! bg = "cyan"
//! ```
//!
//! Resolution never mutates the theme; it produces a [`ComponentStyle`] per
//! component and color mode, and [`paint_appearance`] layers it at paint time.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Appearance;

// ---------------------------------------------------------------------------
// ColorMode
// ---------------------------------------------------------------------------

/// The terminal palette the theme is resolved for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Dark,
    Light,
    Mono,
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMode::Dark => "dark",
            ColorMode::Light => "light",
            ColorMode::Mono => "mono",
        })
    }
}

impl FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(ColorMode::Dark),
            "light" => Ok(ColorMode::Light),
            "mono" => Ok(ColorMode::Mono),
            other => Err(format!("unknown color mode: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Theme data
// ---------------------------------------------------------------------------

/// A state override: its own appearance plus per-mode overrides of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateTheme {
    #[serde(flatten)]
    pub base: Appearance,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<ColorMode, Appearance>,
}

impl StateTheme {
    pub fn new(base: Appearance) -> Self {
        Self { base, modes: BTreeMap::new() }
    }

    /// Add a color-mode override (builder).
    pub fn with_mode(mut self, mode: ColorMode, appearance: Appearance) -> Self {
        self.modes.insert(mode, appearance);
        self
    }

    fn resolve(&self, mode: ColorMode) -> Appearance {
        layer(&self.base, self.modes.get(&mode))
    }
}

/// Theme block for one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentTheme {
    #[serde(flatten)]
    pub base: Appearance,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modes: BTreeMap<ColorMode, Appearance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<StateTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<StateTheme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<StateTheme>,
}

impl ComponentTheme {
    pub fn new(base: Appearance) -> Self {
        Self { base, ..Self::default() }
    }

    pub fn with_mode(mut self, mode: ColorMode, appearance: Appearance) -> Self {
        self.modes.insert(mode, appearance);
        self
    }

    pub fn with_focused(mut self, state: StateTheme) -> Self {
        self.focused = Some(state);
        self
    }

    pub fn with_selected(mut self, state: StateTheme) -> Self {
        self.selected = Some(state);
        self
    }

    pub fn with_disabled(mut self, state: StateTheme) -> Self {
        self.disabled = Some(state);
        self
    }
}

/// Process-wide theme, keyed by component name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme {
    components: BTreeMap<String, ComponentTheme>,
}

impl Theme {
    /// An empty theme.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a component block (builder).
    pub fn with_component(mut self, name: impl Into<String>, theme: ComponentTheme) -> Self {
        self.components.insert(name.into(), theme);
        self
    }

    pub fn component(&self, name: &str) -> Option<&ComponentTheme> {
        self.components.get(name)
    }

    /// Component names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// The theme the built-in components are styled with.
    pub fn builtin() -> Self {
        let focus = StateTheme::new(Appearance::new().with_fg("black").with_bg("cyan"))
            .with_mode(ColorMode::Mono, Appearance::new().with_inverse(true));
        let disabled = StateTheme::new(Appearance::new().with_fg("darkgrey"));

        Theme::new()
            .with_component("container", ComponentTheme::default())
            .with_component("label", ComponentTheme::default())
            .with_component(
                "button",
                ComponentTheme::new(Appearance::new().with_bold(true))
                    .with_focused(focus.clone())
                    .with_disabled(disabled.clone()),
            )
            .with_component(
                "checkbox",
                ComponentTheme::default().with_focused(focus.clone()).with_disabled(disabled.clone()),
            )
            .with_component(
                "list",
                ComponentTheme::default()
                    .with_focused(StateTheme::new(Appearance::new().with_fg("cyan")))
                    .with_disabled(disabled.clone()),
            )
            .with_component(
                "textfield",
                ComponentTheme::new(Appearance::new().with_underline(true))
                    .with_focused(focus)
                    .with_disabled(disabled),
            )
            .with_component(
                "modal",
                ComponentTheme::new(Appearance::new().with_fg("white").with_bg("blue"))
                    .with_mode(ColorMode::Light, Appearance::new().with_fg("black").with_bg("white"))
                    .with_mode(ColorMode::Mono, Appearance::new().with_inverse(true)),
            )
            .with_component(
                "legend",
                ComponentTheme::new(Appearance::new().with_fg("darkgrey"))
                    .with_mode(ColorMode::Light, Appearance::new().with_fg("grey")),
            )
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Lay `overrides` over `base` in order; later layers win per field.
pub fn layer<'a>(base: &Appearance, overrides: impl IntoIterator<Item = &'a Appearance>) -> Appearance {
    overrides.into_iter().fold(base.clone(), |acc, top| acc.overlay(top))
}

/// A component's theme resolved for one color mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentStyle {
    pub base: Appearance,
    pub focused: Option<Appearance>,
    pub selected: Option<Appearance>,
    pub disabled: Option<Appearance>,
}

/// Resolve `name` for `mode`: the mode override over the base, and each
/// present state the same way. Unknown components resolve to `None`.
pub fn resolve_component_style(theme: &Theme, name: &str, mode: ColorMode) -> Option<ComponentStyle> {
    let block = theme.component(name)?;
    Some(ComponentStyle {
        base: layer(&block.base, block.modes.get(&mode)),
        focused: block.focused.as_ref().map(|s| s.resolve(mode)),
        selected: block.selected.as_ref().map(|s| s.resolve(mode)),
        disabled: block.disabled.as_ref().map(|s| s.resolve(mode)),
    })
}

/// Interaction state of a controller at paint time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateFlags {
    pub focused: bool,
    pub selected: bool,
    pub disabled: bool,
}

/// Final appearance for a widget: inherited, then declared, then either the
/// disabled override or selected followed by focused.
pub fn paint_appearance(
    inherited: &Appearance,
    declared: &Appearance,
    style: Option<&ComponentStyle>,
    flags: StateFlags,
) -> Appearance {
    let mut layers = vec![declared];
    if let Some(style) = style {
        if flags.disabled {
            layers.extend(style.disabled.as_ref());
        } else {
            if flags.selected {
                layers.extend(style.selected.as_ref());
            }
            if flags.focused {
                layers.extend(style.focused.as_ref());
            }
        }
    }
    layer(inherited, layers)
}

// ===========================================================================
// Tests
// ===========================================================================
