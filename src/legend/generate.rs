//! Legend derivation from key maps.

use std::collections::HashMap;

use super::{Legend, LegendEntry, LegendOptions};
use crate::controller::{ControllerId, Ui};
use crate::error::Result;
use crate::event::KeyMap;

/// Build the legend for `id`'s effective key map: own bindings first, then
/// inherited bindings the controller doesn't override.
pub fn generate_keystroke_legend(ui: &Ui, id: ControllerId, options: &LegendOptions) -> Result<Legend> {
    Ok(legend_from_keymap(&ui.effective_keymap(id)?, options))
}

/// Build a legend from `keymap`.
///
/// Bindings without a legend label are skipped. Bindings sharing a group
/// within a category collapse into one entry labelled with the group name;
/// its symbol concatenates the members' symbols and its priority is the
/// highest member priority.
pub fn legend_from_keymap(keymap: &KeyMap, options: &LegendOptions) -> Legend {
    let mut legend = Legend::new();
    // (category, group) -> index into that category's entries
    let mut groups: HashMap<(String, String), usize> = HashMap::new();
    let mut order = 0;

    for (key, binding) in keymap.entries() {
        let Some(label) = binding.legend.as_deref().filter(|l| !l.is_empty()) else {
            continue;
        };
        let category_name = options.category_for(binding.category.as_deref());
        let symbol = options.symbol_for(&key).to_owned();
        let category = legend.category_mut(category_name);

        if let Some(group) = binding.group.as_deref() {
            let slot = (category_name.to_owned(), group.to_owned());
            if let Some(&index) = groups.get(&slot) {
                let entry = &mut category.entries[index];
                entry.symbol.push_str(&symbol);
                entry.priority = entry.priority.max(binding.priority);
                continue;
            }
            groups.insert(slot, category.entries.len());
            category.entries.push(LegendEntry {
                symbol,
                description: group.to_owned(),
                priority: binding.priority,
                order,
            });
        } else {
            category.entries.push(LegendEntry {
                symbol,
                description: label.to_owned(),
                priority: binding.priority,
                order,
            });
        }
        order += 1;
    }
    legend
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Component;
    use crate::event::KeyBinding;
    use crate::legend::DEFAULT_CATEGORY;
    use crate::widget::HeadlessBackend;
    use pretty_assertions::assert_eq;

    fn labelled(label: &str) -> KeyBinding {
        KeyBinding::new(|_, _, _| Ok(())).with_legend(label)
    }

    #[test]
    fn grouped_arrows_merge_with_symbols() {
        let mut keys = KeyMap::new();
        keys.bind("up", labelled("Up").with_group("Navigate")).unwrap();
        keys.bind("down", labelled("Down").with_group("Navigate")).unwrap();
        let options = LegendOptions::new().with_symbol("up", "↑").with_symbol("down", "↓");

        let legend = legend_from_keymap(&keys, &options);
        let category = legend.category(DEFAULT_CATEGORY).unwrap();
        assert_eq!(category.entries.len(), 1);
        assert_eq!(category.entries[0].symbol, "↑↓");
        assert_eq!(category.entries[0].description, "Navigate");
    }

    #[test]
    fn unlabelled_bindings_are_skipped() {
        let mut keys = KeyMap::new();
        keys.bind("x", KeyBinding::new(|_, _, _| Ok(()))).unwrap();
        keys.bind("y", labelled("")).unwrap();
        assert!(legend_from_keymap(&keys, &LegendOptions::new()).is_empty());
    }

    #[test]
    fn categories_follow_allow_list() {
        let mut keys = KeyMap::new();
        keys.bind("q", labelled("Quit").with_category("app")).unwrap();
        keys.bind("d", labelled("Delete").with_category("edit")).unwrap();
        keys.bind("h", labelled("Help")).unwrap();

        let open = legend_from_keymap(&keys, &LegendOptions::new());
        let names: Vec<_> = open.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["app", "edit", "default"]);

        let restricted = legend_from_keymap(&keys, &LegendOptions::new().with_categories(["app"]));
        let names: Vec<_> = restricted.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["app", "default"]);
        assert_eq!(restricted.category("default").unwrap().entries.len(), 2);
    }

    #[test]
    fn group_priority_is_highest_member() {
        let mut keys = KeyMap::new();
        keys.bind("j", labelled("Down").with_group("Move")).unwrap();
        keys.bind("k", labelled("Up").with_group("Move").with_priority(5)).unwrap();
        keys.bind("g", labelled("Top").with_group("Move").with_priority(2)).unwrap();
        let legend = legend_from_keymap(&keys, &LegendOptions::new());
        let entry = &legend.categories[0].entries[0];
        assert_eq!(entry.symbol, "jkg");
        assert_eq!(entry.priority, Some(5));
    }

    #[test]
    fn same_group_in_different_categories_stays_separate() {
        let mut keys = KeyMap::new();
        keys.bind("a", labelled("A").with_group("Pick").with_category("left")).unwrap();
        keys.bind("b", labelled("B").with_group("Pick").with_category("right")).unwrap();
        let legend = legend_from_keymap(&keys, &LegendOptions::new());
        assert_eq!(legend.len(), 2);
    }

    #[test]
    fn regex_bindings_show_their_pattern() {
        let mut keys = KeyMap::new();
        keys.bind("/[0-9]/", labelled("Jump")).unwrap();
        let legend = legend_from_keymap(&keys, &LegendOptions::new());
        assert_eq!(legend.categories[0].entries[0].text(), "/[0-9]/ = Jump");
    }

    struct Node;

    impl Component for Node {
        fn name(&self) -> &str {
            "node"
        }
    }

    #[test]
    fn own_bindings_override_inherited() {
        let mut ui = Ui::new(Box::new(HeadlessBackend::new(20, 5)));
        let root = ui.create_root(Node, None).unwrap();
        ui.bind_key(root, "q", labelled("Quit").with_propagate(true)).unwrap();
        ui.bind_key(root, "escape", labelled("Back").with_propagate(true)).unwrap();
        let child = ui.add_child(root, Node, None).unwrap();
        ui.bind_key(child, "escape", labelled("Close")).unwrap();

        let legend = generate_keystroke_legend(&ui, child, &LegendOptions::new()).unwrap();
        let texts: Vec<_> = legend.categories[0].entries.iter().map(|e| e.text()).collect();
        assert_eq!(texts, vec!["escape = Close", "q = Quit"]);
    }
}
