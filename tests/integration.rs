//! Integration tests for trellis-tui.
//!
//! These tests exercise the public API from outside the crate: the
//! controller tree, the store, key maps, legends and the application root
//! driven through the headless pilot.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use trellis_tui::app::{ActionHandler, AppConfig, Application, Deferred};
use trellis_tui::components::{Checkbox, Container, Label, ListView, Modal, TextField};
use trellis_tui::controller::{Component, ControllerId, Ui};
use trellis_tui::error::Result;
use trellis_tui::event::{Action, Event, EventKind, KeyBinding, KeyMap, KeyPress, ModalRequest};
use trellis_tui::geometry::{Appearance, Behavior, StyleOptions};
use trellis_tui::legend::{
    legend_from_keymap, render_legend_categories, CullStrategy, Legend, LegendEntry, LegendOptions, RenderOptions,
};
use trellis_tui::store::{Store, StorePath};
use trellis_tui::testing::Pilot;
use trellis_tui::theme::{resolve_component_style, ColorMode, ComponentTheme, Theme};
use trellis_tui::widget::HeadlessBackend;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Node {
    focusable: bool,
}

impl Component for Node {
    fn name(&self) -> &str {
        "node"
    }

    fn behavior(&self) -> Behavior {
        Behavior { focusable: self.focusable, scrollable: false }
    }
}

fn focusable() -> Node {
    Node { focusable: true }
}

fn plain() -> Node {
    Node { focusable: false }
}

fn ui() -> Ui {
    Ui::new(Box::new(HeadlessBackend::new(40, 10)))
}

fn noop() -> KeyBinding {
    KeyBinding::new(|_, _, _| Ok(()))
}

/// A form whose `?` key opens a help modal on behalf of the focused field.
struct Shell;

impl Component for Shell {
    fn name(&self) -> &str {
        "container"
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        ui.bind_key(
            id,
            "tab",
            KeyBinding::new(|ui, id, _| ui.next_child(id, 1).map(|_| ())).with_propagate(true),
        )?;
        ui.bind_key(
            id,
            "?",
            KeyBinding::new(|ui, id, _| {
                let mut request = ModalRequest::new(|| Box::new(Modal::new("Help", "escape closes")));
                if let Some(requester) = ui.focused_controller() {
                    request = request.with_requester(requester);
                }
                ui.dispatch(id, Action::OpenModal(request))
            })
            .with_propagate(true)
            .with_legend("Help"),
        )?;
        ui.add_child(id, TextField::new("name"), None)?;
        ui.add_child(id, Checkbox::new("Admin", "admin"), Some(StyleOptions::new().top(1)))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn shifted_key_never_falls_back_to_plain_binding() {
    let mut map = KeyMap::new();
    map.bind("up", noop().with_legend("f1")).unwrap();
    map.bind("S-up", noop().with_legend("f2")).unwrap();
    let key = KeyPress { ch: None, full: "S-up".into() };
    assert_eq!(map.resolve(&key).and_then(|b| b.legend.as_deref()), Some("f2"));
}

#[test]
fn next_child_skips_unfocusable_and_wraps() {
    let mut ui = ui();
    let root = ui.create_root(plain(), None).unwrap();
    let b = ui.add_child(root, focusable(), None).unwrap();
    let _c = ui.add_child(root, plain(), None).unwrap();
    let d = ui.add_child(root, focusable(), None).unwrap();
    assert_eq!(ui.next_child(root, 1).unwrap(), Some(d));
    assert_eq!(ui.next_child(root, 1).unwrap(), Some(b));
}

#[test]
fn prefix_subscriber_sees_nested_write() {
    let store = Store::new(json!({"a": {"b": 1}}));
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);
    store.subscribe("a", move |path, value| sink.borrow_mut().push((path.to_string(), value.clone())));
    store.set("a.b", json!(2));
    assert_eq!(*calls.borrow(), vec![("a.b".to_owned(), json!(2))]);
    assert_eq!(store.get("a.b"), Some(json!(2)));
}

#[test]
fn grouped_bindings_share_one_legend_entry() {
    let mut map = KeyMap::new();
    map.bind("up", noop().with_legend("Up").with_group("Navigate")).unwrap();
    map.bind("down", noop().with_legend("Down").with_group("Navigate")).unwrap();
    let options = LegendOptions::new().with_symbol("up", "↑").with_symbol("down", "↓");
    let legend = legend_from_keymap(&map, &options);
    let entries = &legend.category("default").unwrap().entries;
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].symbol.as_str(), entries[0].description.as_str()), ("↑↓", "Navigate"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn subscribers_fire_only_for_prefixes() {
    let paths = ["", "a", "a.b", "a.b.c", "ab", "x", "a.c"];
    let writes = ["a.b", "a.b.c", "x.y", "a"];
    for written in writes {
        let store = Store::new(json!({}));
        let hits: Vec<Rc<Cell<u32>>> = paths
            .iter()
            .map(|p| {
                let hits = Rc::new(Cell::new(0));
                let c = Rc::clone(&hits);
                store.subscribe(*p, move |_, _| c.set(c.get() + 1));
                hits
            })
            .collect();
        store.set(written, json!(true));
        for (path, count) in paths.iter().zip(&hits) {
            let expected = u32::from(StorePath::parse(path).is_prefix_of(&StorePath::parse(written)));
            assert_eq!(count.get(), expected, "subscribed {path:?}, wrote {written:?}");
        }
    }
}

#[test]
fn next_child_cycles_back_after_n_steps() {
    let mut ui = ui();
    let root = ui.create_root(plain(), None).unwrap();
    let mut focusables = Vec::new();
    for i in 0..6 {
        if i % 3 == 1 {
            ui.add_child(root, plain(), None).unwrap();
        } else {
            focusables.push(ui.add_child(root, focusable(), None).unwrap());
        }
    }
    for direction in [1, -1] {
        let start = ui.next_child(root, direction).unwrap().unwrap();
        let mut seen = vec![start];
        for _ in 0..focusables.len() {
            seen.push(ui.next_child(root, direction).unwrap().unwrap());
        }
        assert_eq!(seen.first(), seen.last());
        assert!(seen.iter().all(|id| focusables.contains(id)));
    }
}

#[test]
fn next_child_without_focusable_children_is_a_no_op() {
    let mut ui = ui();
    let root = ui.create_root(plain(), None).unwrap();
    ui.add_child(root, plain(), None).unwrap();
    ui.add_child(root, plain(), None).unwrap();
    assert_eq!(ui.next_child(root, 1).unwrap(), None);
    assert_eq!(ui.controller(root).unwrap().focused_index(), 0);
}

#[test]
fn enable_and_disable_only_dirty_on_transition() {
    let mut ui = ui();
    let root = ui.create_root(focusable(), None).unwrap();
    while ui.next_outbox_event().is_some() {}

    assert!(!ui.enable(root).unwrap());
    assert_eq!(ui.outbox_len(), 0);
    assert!(ui.disable(root).unwrap());
    assert!(!ui.disable(root).unwrap());
    assert!(matches!(ui.next_outbox_event(), Some(Event::Dirty)));
    assert_eq!(ui.outbox_len(), 0);
}

#[test]
fn plain_theme_resolves_to_base_without_mutation() {
    let base = Appearance::new().with_fg("white").with_bold(true);
    let theme = Theme::new().with_component("label", ComponentTheme::new(base.clone()));
    let before = theme.clone();
    let style = resolve_component_style(&theme, "label", ColorMode::Dark).unwrap();
    assert_eq!(style.base, base);
    assert!(style.focused.is_none() && style.selected.is_none() && style.disabled.is_none());
    assert_eq!(theme, before);
}

#[test]
fn culled_legend_fits_and_skips_empty_categories() {
    let mut legend = Legend::new();
    for (i, (category, symbol, description)) in [
        ("nav", "↑↓", "Move"),
        ("nav", "⏎", "Open"),
        ("app", "q", "Quit"),
        ("app", "?", "Help"),
        ("app", "r", "Reload"),
    ]
    .into_iter()
    .enumerate()
    {
        legend.category_mut(category).entries.push(LegendEntry {
            symbol: symbol.into(),
            description: description.into(),
            priority: Some(i as i32 % 3),
            order: i,
        });
    }
    let full = render_legend_categories(&legend, &RenderOptions::new()).width();
    for strategy in [CullStrategy::Priority, CullStrategy::RightToLeft] {
        for max in 0..=full {
            let options = RenderOptions::new().with_max_width(max).with_strategy(strategy);
            let rendered = render_legend_categories(&legend, &options);
            assert!(rendered.width() <= max, "{strategy:?} at {max}: {:?}", rendered.text);
            let removed = rendered.removed.len();
            let remaining: usize = rendered.categories.iter().map(|c| c.entries).sum();
            assert_eq!(removed + remaining, 5);
        }
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

#[test]
fn reparented_child_takes_new_parents_keys() {
    let mut ui = ui();
    let first = ui.create_root(plain(), None).unwrap();
    let second = ui.create_root(plain(), None).unwrap();
    ui.bind_key(first, "x", noop().with_propagate(true)).unwrap();
    ui.bind_key(second, "y", noop().with_propagate(true)).unwrap();

    let child = ui.add_child(first, focusable(), None).unwrap();
    assert!(ui.resolve_key(child, &KeyPress::parse("x")).is_some());

    ui.add_child(second, child, None).unwrap();
    assert_eq!(ui.parent(child), Some(second));
    assert!(ui.children(first).is_empty());
    assert!(ui.resolve_key(child, &KeyPress::parse("x")).is_none());
    assert_eq!(ui.resolve_key(child, &KeyPress::parse("y")).unwrap().owner, Some(second));
}

#[test]
fn destroying_a_subtree_notifies_only_the_parent() {
    let mut ui = ui();
    let root = ui.create_root(plain(), None).unwrap();
    let mid = ui.add_child(root, plain(), None).unwrap();
    let leaf = ui.add_child(mid, focusable(), None).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ui.on(root, EventKind::Destroyed, move |_, _, event| {
        if let Event::Destroyed { id } = event {
            sink.borrow_mut().push(*id);
        }
        Ok(())
    })
    .unwrap();

    ui.destroy(mid).unwrap();
    assert!(!ui.contains(mid) && !ui.contains(leaf));
    assert!(ui.children(root).is_empty());
    assert_eq!(*seen.borrow(), vec![mid]);
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

#[test]
fn modal_returns_focus_to_requester() {
    let mut pilot = Pilot::headless(40, 10, Shell, json!({"name": "", "admin": false})).unwrap();
    let root = pilot.app().root();
    let checkbox = pilot.app().ui().children(root)[1];

    pilot.press("tab").unwrap();
    assert_eq!(pilot.active(), checkbox);

    pilot.press("?").unwrap();
    let modal = pilot.active();
    assert_ne!(modal, checkbox);
    assert_eq!(pilot.app().ui().roots().len(), 2);
    assert!(pilot.screen().contains("escape closes"));
    assert_eq!(pilot.legend_text().unwrap(), "esc = Close  ⇥ = Next");

    pilot.press("escape").unwrap();
    assert!(!pilot.app().ui().contains(modal));
    assert_eq!(pilot.active(), checkbox);
    assert!(!pilot.screen().contains("escape closes"));

    pilot.press("space").unwrap();
    assert_eq!(pilot.store().get("admin"), Some(json!(true)));
}

#[test]
fn deferred_writes_apply_in_arrival_order() {
    let launch: ActionHandler = Rc::new(|app: &mut Application, action: &Action| -> Result<()> {
        let name = action.payload().and_then(Value::as_str).unwrap_or("?").to_owned();
        let tx = app.deferred_sender();
        tokio_test::block_on(async move {
            for status in ["queued", "starting", "running"] {
                let _ = tx.send(Deferred::set("status", json!(format!("{name}: {status}"))));
            }
        });
        Ok(())
    });
    let root = Container::new()
        .stacked(0)
        .with_child(|| Box::new(ListView::from_items(["web", "api"]).launching()), None)
        .with_child(|| Box::new(Label::bound("status")), None);
    let app = Application::with_actions(
        Box::new(HeadlessBackend::new(30, 4)),
        root,
        json!({"status": "idle"}),
        AppConfig::new(),
        [("launch".to_owned(), launch)],
    )
    .unwrap();
    let mut pilot = Pilot::new(app).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    pilot.store().subscribe("status", move |_, value| sink.borrow_mut().push(value.clone()));

    pilot.press_all(&["down", "enter"]).unwrap();
    assert_eq!(pilot.line(2), "idle");
    assert_eq!(pilot.pump().unwrap(), 3);

    assert_eq!(*seen.borrow(), vec![json!("api: queued"), json!("api: starting"), json!("api: running")]);
    assert_eq!(pilot.store().get("status"), Some(json!("api: running")));
    assert_eq!(pilot.line(2), "api: running");
}

#[test]
fn quit_action_stops_the_application() {
    struct Quitter;

    impl Component for Quitter {
        fn name(&self) -> &str {
            "container"
        }

        fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
            ui.bind_key(
                id,
                "q",
                KeyBinding::new(|ui, id, _| ui.dispatch(id, Action::named("quit"))).with_legend("Quit"),
            )
        }
    }

    let mut pilot = Pilot::headless(20, 2, Quitter, json!({})).unwrap();
    pilot.press("x").unwrap();
    assert!(pilot.is_running());
    pilot.press("q").unwrap();
    assert!(!pilot.is_running());
}

#[test]
fn text_field_edits_reach_the_store() {
    let mut pilot = Pilot::headless(20, 2, TextField::new("query"), json!({"query": "ab"})).unwrap();
    pilot.type_text("c d").unwrap();
    pilot.press("backspace").unwrap();
    assert_eq!(pilot.store().get("query"), Some(json!("abc ")));
    assert_eq!(pilot.screen(), "abc");
}
