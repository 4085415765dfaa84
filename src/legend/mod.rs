//! Keystroke legends.
//!
//! A [`Legend`] is derived on demand from a controller's effective key map
//! ([`generate_keystroke_legend`]) and then fitted into a width budget by
//! [`render_legend_categories`], which drops entries one at a time until the
//! global and per-category limits hold.

mod cull;
mod generate;

use std::collections::BTreeMap;

pub use cull::{render_legend_categories, CullStrategy, RenderOptions, RenderState, RenderedCategory, RenderedLegend, WidthLimit};
pub use generate::{generate_keystroke_legend, legend_from_keymap};

/// Category used for entries without one, or outside the allow-list.
pub const DEFAULT_CATEGORY: &str = "default";

/// Inputs to legend generation.
#[derive(Debug, Clone, Default)]
pub struct LegendOptions {
    /// Allowed category names. Entries in any other category are filed under
    /// [`DEFAULT_CATEGORY`]. `None` allows every category.
    pub categories: Option<Vec<String>>,
    /// Key identifier to display symbol, e.g. `"up"` to `"↑"`.
    pub symbols: BTreeMap<String, String>,
}

impl LegendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_symbol(mut self, key: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.symbols.insert(key.into(), symbol.into());
        self
    }

    /// Arrow and control keys as glyphs.
    pub fn with_default_symbols(self) -> Self {
        [
            ("up", "↑"),
            ("down", "↓"),
            ("left", "←"),
            ("right", "→"),
            ("enter", "⏎"),
            ("escape", "esc"),
            ("space", "␣"),
            ("tab", "⇥"),
            ("S-tab", "⇤"),
        ]
        .into_iter()
        .fold(self, |opts, (key, symbol)| opts.with_symbol(key, symbol))
    }

    pub(crate) fn symbol_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.symbols.get(key).map_or(key, String::as_str)
    }

    pub(crate) fn category_for<'a>(&self, requested: Option<&'a str>) -> &'a str {
        match (requested, &self.categories) {
            (None, _) => DEFAULT_CATEGORY,
            (Some(name), None) => name,
            (Some(name), Some(allowed)) if allowed.iter().any(|a| a == name) => name,
            (Some(_), Some(_)) => DEFAULT_CATEGORY,
        }
    }
}

/// One displayed binding, or a merged group of bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub symbol: String,
    pub description: String,
    /// Higher is more important; `None` is least important.
    pub priority: Option<i32>,
    /// Insertion order across the whole legend.
    pub order: usize,
}

impl LegendEntry {
    /// `"symbol = description"`.
    pub fn text(&self) -> String {
        format!("{} = {}", self.symbol, self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendCategory {
    pub name: String,
    pub entries: Vec<LegendEntry>,
}

impl LegendCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Categories in first-encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Legend {
    pub categories: Vec<LegendCategory>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, name: &str) -> Option<&LegendCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// The category named `name`, appended if new.
    pub fn category_mut(&mut self, name: &str) -> &mut LegendCategory {
        let index = match self.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.categories.push(LegendCategory::new(name));
                self.categories.len() - 1
            }
        };
        &mut self.categories[index]
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
