//! Rendering legends into a width budget.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::{Legend, LegendEntry};

/// Maximum width for one category.
#[derive(Clone)]
pub enum WidthLimit {
    Fixed(usize),
    /// Re-evaluated after every removal.
    Dynamic(Rc<dyn Fn(&RenderState) -> usize>),
}

impl WidthLimit {
    pub fn dynamic(f: impl Fn(&RenderState) -> usize + 'static) -> Self {
        WidthLimit::Dynamic(Rc::new(f))
    }

    fn evaluate(&self, state: &RenderState) -> usize {
        match self {
            WidthLimit::Fixed(n) => *n,
            WidthLimit::Dynamic(f) => f(state),
        }
    }
}

impl fmt::Debug for WidthLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidthLimit::Fixed(n) => f.debug_tuple("Fixed").field(n).finish(),
            WidthLimit::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

impl From<usize> for WidthLimit {
    fn from(n: usize) -> Self {
        WidthLimit::Fixed(n)
    }
}

/// Which entry goes first when a legend doesn't fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullStrategy {
    /// Lowest priority first; unset priority is lowest, ties go to the
    /// earliest inserted entry.
    #[default]
    Priority,
    /// Last entry of the rightmost non-empty category.
    RightToLeft,
}

/// Width constraints and separators.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub max_width: Option<usize>,
    pub category_limits: BTreeMap<String, WidthLimit>,
    pub strategy: CullStrategy,
    pub entry_separator: String,
    pub category_separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_width: None,
            category_limits: BTreeMap::new(),
            strategy: CullStrategy::default(),
            entry_separator: "  ".to_owned(),
            category_separator: " | ".to_owned(),
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_category_limit(mut self, category: impl Into<String>, limit: impl Into<WidthLimit>) -> Self {
        self.category_limits.insert(category.into(), limit.into());
        self
    }

    pub fn with_strategy(mut self, strategy: CullStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_separators(mut self, entry: impl Into<String>, category: impl Into<String>) -> Self {
        self.entry_separator = entry.into();
        self.category_separator = category.into();
        self
    }
}

/// One category rendered to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCategory {
    pub name: String,
    pub text: String,
    /// Display width of `text` in cells.
    pub width: usize,
    pub entries: usize,
}

/// The rendering as it stands between removals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub categories: Vec<RenderedCategory>,
    /// Width of the non-empty categories joined by the category separator.
    pub total_width: usize,
    /// Entries removed so far.
    pub removed: usize,
}

impl RenderState {
    pub fn category(&self, name: &str) -> Option<&RenderedCategory> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// Result of [`render_legend_categories`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLegend {
    pub categories: Vec<RenderedCategory>,
    /// The full line: non-empty categories joined by the category separator.
    pub text: String,
    /// Entries culled, in removal order.
    pub removed: Vec<LegendEntry>,
}

impl RenderedLegend {
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

fn render_state(legend: &Legend, options: &RenderOptions, removed: usize) -> RenderState {
    let categories: Vec<RenderedCategory> = legend
        .categories
        .iter()
        .map(|category| {
            let text = category
                .entries
                .iter()
                .map(LegendEntry::text)
                .collect::<Vec<_>>()
                .join(&options.entry_separator);
            RenderedCategory {
                name: category.name.clone(),
                width: text.chars().count(),
                text,
                entries: category.entries.len(),
            }
        })
        .collect();
    let shown: Vec<usize> = categories.iter().filter(|c| c.entries > 0).map(|c| c.width).collect();
    let separators = shown.len().saturating_sub(1) * options.category_separator.chars().count();
    RenderState {
        total_width: shown.iter().sum::<usize>() + separators,
        categories,
        removed,
    }
}

/// Pick the entry to drop among `candidates` (category indices).
fn pick_victim(legend: &Legend, candidates: &[usize], strategy: CullStrategy) -> Option<(usize, usize)> {
    match strategy {
        CullStrategy::Priority => candidates
            .iter()
            .flat_map(|&ci| {
                legend.categories[ci]
                    .entries
                    .iter()
                    .enumerate()
                    .map(move |(ei, entry)| (ci, ei, entry))
            })
            .min_by_key(|(_, _, entry)| (entry.priority, entry.order))
            .map(|(ci, ei, _)| (ci, ei)),
        CullStrategy::RightToLeft => candidates
            .iter()
            .rev()
            .find(|&&ci| !legend.categories[ci].is_empty())
            .map(|&ci| (ci, legend.categories[ci].entries.len() - 1)),
    }
}

/// Render every category and cull entries until the limits hold.
///
/// While the total width exceeds `max_width`, any non-empty category may
/// lose an entry. When only per-category limits are exceeded, only the
/// offending categories may. Culling stops once nothing removable is left.
pub fn render_legend_categories(legend: &Legend, options: &RenderOptions) -> RenderedLegend {
    let mut working = legend.clone();
    let mut removed = Vec::new();

    let state = loop {
        let state = render_state(&working, options, removed.len());
        let global = options.max_width.is_some_and(|max| state.total_width > max);
        let candidates: Vec<usize> = state
            .categories
            .iter()
            .enumerate()
            .filter(|(_, category)| category.entries > 0)
            .filter(|(_, category)| {
                global
                    || options
                        .category_limits
                        .get(&category.name)
                        .is_some_and(|limit| category.width > limit.evaluate(&state))
            })
            .map(|(index, _)| index)
            .collect();

        let Some((ci, ei)) = pick_victim(&working, &candidates, options.strategy) else {
            break state;
        };
        let entry = working.categories[ci].entries.remove(ei);
        trace!(category = %working.categories[ci].name, symbol = %entry.symbol, "legend entry culled");
        removed.push(entry);
    };

    let text = state
        .categories
        .iter()
        .filter(|c| c.entries > 0)
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(&options.category_separator);

    RenderedLegend { categories: state.categories, text, removed }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legend::LegendCategory;
    use pretty_assertions::assert_eq;

    fn entry(symbol: &str, description: &str, priority: Option<i32>, order: usize) -> LegendEntry {
        LegendEntry { symbol: symbol.into(), description: description.into(), priority, order }
    }

    fn sample() -> Legend {
        Legend {
            categories: vec![
                LegendCategory {
                    name: "nav".into(),
                    entries: vec![entry("↑↓", "Move", Some(10), 0), entry("⏎", "Open", Some(5), 1)],
                },
                LegendCategory {
                    name: "app".into(),
                    entries: vec![entry("q", "Quit", None, 2), entry("?", "Help", Some(1), 3)],
                },
            ],
        }
    }

    #[test]
    fn renders_everything_when_unconstrained() {
        let rendered = render_legend_categories(&sample(), &RenderOptions::new());
        insta::assert_snapshot!(rendered.text, @"↑↓ = Move  ⏎ = Open | q = Quit  ? = Help");
        assert!(rendered.removed.is_empty());
    }

    #[test]
    fn priority_culls_unset_first_then_lowest() {
        let options = RenderOptions::new().with_max_width(25);
        let rendered = render_legend_categories(&sample(), &options);
        let removed: Vec<_> = rendered.removed.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(removed, vec!["Quit", "Help"]);
        assert_eq!(rendered.text, "↑↓ = Move  ⏎ = Open");
        assert!(rendered.width() <= 25);
    }

    #[test]
    fn priority_ties_go_to_earliest_entry() {
        let legend = Legend {
            categories: vec![LegendCategory {
                name: "x".into(),
                entries: vec![entry("a", "A", None, 0), entry("b", "B", None, 1)],
            }],
        };
        let rendered = render_legend_categories(&legend, &RenderOptions::new().with_max_width(5));
        assert_eq!(rendered.removed[0].symbol, "a");
        assert_eq!(rendered.text, "b = B");
    }

    #[test]
    fn right_to_left_empties_rightmost_first() {
        let options = RenderOptions::new().with_max_width(12).with_strategy(CullStrategy::RightToLeft);
        let rendered = render_legend_categories(&sample(), &options);
        let removed: Vec<_> = rendered.removed.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(removed, vec!["?", "q", "⏎"]);
        assert_eq!(rendered.text, "↑↓ = Move");
    }

    #[test]
    fn category_limit_only_touches_offender() {
        let options = RenderOptions::new().with_category_limit("app", 8);
        let rendered = render_legend_categories(&sample(), &options);
        assert_eq!(rendered.removed.len(), 1);
        assert_eq!(rendered.removed[0].symbol, "q");
        let app = rendered.categories.iter().find(|c| c.name == "app").unwrap();
        assert_eq!(app.text, "? = Help");
        assert_eq!(rendered.categories[0].entries, 2);
    }

    #[test]
    fn dynamic_limit_reevaluated_after_each_removal() {
        // "nav" may use whatever "app" leaves of a 30-cell line.
        let limit = WidthLimit::dynamic(|state: &RenderState| {
            30usize.saturating_sub(state.category("app").map_or(0, |c| c.width))
        });
        let options = RenderOptions::new().with_category_limit("nav", limit);
        let rendered = render_legend_categories(&sample(), &options);
        // app is 18 wide, leaving 12 for nav: "↑↓ = Move" (9) fits after one cull.
        assert_eq!(rendered.removed.len(), 1);
        assert_eq!(rendered.removed[0].description, "Open");
    }

    #[test]
    fn unsatisfiable_limits_stop_when_empty() {
        let options = RenderOptions::new().with_max_width(1);
        let rendered = render_legend_categories(&sample(), &options);
        assert_eq!(rendered.removed.len(), 4);
        assert_eq!(rendered.text, "");
        assert!(rendered.categories.iter().all(|c| c.entries == 0));
    }

    #[test]
    fn culling_result_fits_for_every_budget() {
        let full = render_legend_categories(&sample(), &RenderOptions::new()).width();
        for strategy in [CullStrategy::Priority, CullStrategy::RightToLeft] {
            for max in 0..=full {
                let options = RenderOptions::new().with_max_width(max).with_strategy(strategy);
                let rendered = render_legend_categories(&sample(), &options);
                assert!(rendered.width() <= max, "{strategy:?} at {max}: {}", rendered.text);
            }
        }
    }
}
