//! Key maps: literal and pattern key dispatch with add-time propagation.
//!
//! A [`KeyMap`] keeps two explicit tables: an insertion-ordered map of
//! literal key identifiers, and an ordered list of `/regex/` patterns matched
//! against the character a key produced. Resolution tries every literal
//! first, then the patterns in declaration order.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use super::input::KeyPress;
use crate::controller::{ControllerId, Ui};
use crate::error::{Result, UiError};

/// Handler invoked when a binding matches. Receives the binding's owning
/// controller, so a propagated handler still runs against its owner.
pub type KeyHandler = Rc<dyn Fn(&mut Ui, ControllerId, &KeyPress) -> Result<()>>;

// ---------------------------------------------------------------------------
// KeyBinding
// ---------------------------------------------------------------------------

/// A handler plus the metadata the legend and propagation need.
#[derive(Clone)]
pub struct KeyBinding {
    pub handler: KeyHandler,
    /// Copied into children added after this binding exists.
    pub propagate: bool,
    /// Legend text. Bindings without one are omitted from legends.
    pub legend: Option<String>,
    /// Legend group label; members of a group share one legend entry.
    pub group: Option<String>,
    pub category: Option<String>,
    pub priority: Option<i32>,
    /// Controller the binding was registered on.
    pub owner: Option<ControllerId>,
}

impl KeyBinding {
    /// A binding for `handler` with no metadata.
    pub fn new(handler: impl Fn(&mut Ui, ControllerId, &KeyPress) -> Result<()> + 'static) -> Self {
        Self::from_handler(Rc::new(handler))
    }

    /// A binding for an existing shared handler.
    pub fn from_handler(handler: KeyHandler) -> Self {
        Self {
            handler,
            propagate: false,
            legend: None,
            group: None,
            category: None,
            priority: None,
            owner: None,
        }
    }

    /// Mark the binding as propagating to children (builder).
    pub fn with_propagate(mut self, propagate: bool) -> Self {
        self.propagate = propagate;
        self
    }

    /// Set the legend text (builder).
    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = Some(legend.into());
        self
    }

    /// Set the legend group (builder).
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the legend category (builder).
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the legend priority; higher is more important (builder).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Whether the binding should appear in a legend.
    pub fn has_legend(&self) -> bool {
        self.legend.as_deref().is_some_and(|l| !l.is_empty())
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("handler", &"<fn>")
            .field("propagate", &self.propagate)
            .field("legend", &self.legend)
            .field("group", &self.group)
            .field("category", &self.category)
            .field("priority", &self.priority)
            .field("owner", &self.owner)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// KeyPattern
// ---------------------------------------------------------------------------

/// A parsed key identifier.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// Matches `KeyPress::full` exactly.
    Literal(String),
    /// Written `/re/`; matches `KeyPress::ch`.
    Regex(Regex),
}

impl KeyPattern {
    /// Parse `"S-up"` as a literal and `"/[0-9]/"` as a pattern.
    pub fn parse(key: &str) -> Result<Self> {
        match key.strip_prefix('/').and_then(|k| k.strip_suffix('/')) {
            Some(source) if key.len() >= 2 => Regex::new(source)
                .map(KeyPattern::Regex)
                .map_err(|source| UiError::InvalidKeyPattern { pattern: key.to_owned(), source }),
            _ => Ok(KeyPattern::Literal(key.to_owned())),
        }
    }

    /// The identifier this pattern was written as.
    pub fn id(&self) -> String {
        match self {
            KeyPattern::Literal(key) => key.clone(),
            KeyPattern::Regex(re) => format!("/{}/", re.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyMap
// ---------------------------------------------------------------------------

/// Literal and pattern bindings for one controller.
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    literals: Vec<(String, KeyBinding)>,
    index: HashMap<String, usize>,
    patterns: Vec<(Regex, KeyBinding)>,
}

impl KeyMap {
    /// An empty key map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` (literal or `/regex/`). Rebinding keeps the original
    /// position.
    pub fn bind(&mut self, key: &str, binding: KeyBinding) -> Result<()> {
        match KeyPattern::parse(key)? {
            KeyPattern::Literal(key) => self.bind_literal(key, binding),
            KeyPattern::Regex(re) => self.bind_pattern(re, binding),
        }
        Ok(())
    }

    /// Bind an exact key identifier.
    pub fn bind_literal(&mut self, key: impl Into<String>, binding: KeyBinding) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => self.literals[i].1 = binding,
            None => {
                self.index.insert(key.clone(), self.literals.len());
                self.literals.push((key, binding));
            }
        }
    }

    /// Bind a character pattern.
    pub fn bind_pattern(&mut self, re: Regex, binding: KeyBinding) {
        match self.patterns.iter_mut().find(|(existing, _)| existing.as_str() == re.as_str()) {
            Some(slot) => slot.1 = binding,
            None => self.patterns.push((re, binding)),
        }
    }

    /// Remove the binding for `key`, returning it.
    pub fn unbind(&mut self, key: &str) -> Option<KeyBinding> {
        match KeyPattern::parse(key).ok()? {
            KeyPattern::Literal(key) => {
                let i = self.index.remove(&key)?;
                let (_, binding) = self.literals.remove(i);
                for slot in self.index.values_mut() {
                    if *slot > i {
                        *slot -= 1;
                    }
                }
                Some(binding)
            }
            KeyPattern::Regex(re) => {
                let i = self.patterns.iter().position(|(p, _)| p.as_str() == re.as_str())?;
                Some(self.patterns.remove(i).1)
            }
        }
    }

    /// The binding stored under identifier `key`, without resolution.
    pub fn get(&self, key: &str) -> Option<&KeyBinding> {
        if let Some(&i) = self.index.get(key) {
            return Some(&self.literals[i].1);
        }
        let source = key.strip_prefix('/')?.strip_suffix('/')?;
        self.patterns.iter().find(|(re, _)| re.as_str() == source).map(|(_, b)| b)
    }

    /// Whether identifier `key` is bound.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Resolve a key press: literals first, then patterns against `ch`.
    pub fn resolve(&self, key: &KeyPress) -> Option<&KeyBinding> {
        resolve_in(&[self], key)
    }

    /// All entries as `(identifier, binding)`: literals in insertion order,
    /// then patterns in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (String, &KeyBinding)> + '_ {
        self.literals
            .iter()
            .map(|(k, b)| (k.clone(), b))
            .chain(self.patterns.iter().map(|(re, b)| (format!("/{}/", re.as_str()), b)))
    }

    /// Entries flagged to propagate.
    pub fn propagated(&self) -> KeyMap {
        let mut out = KeyMap::new();
        for (key, binding) in &self.literals {
            if binding.propagate {
                out.bind_literal(key.clone(), binding.clone());
            }
        }
        for (re, binding) in &self.patterns {
            if binding.propagate {
                out.bind_pattern(re.clone(), binding.clone());
            }
        }
        out
    }

    /// Copy in every entry of `other` whose identifier is not bound here.
    pub fn merge_missing(&mut self, other: &KeyMap) {
        for (key, binding) in &other.literals {
            if !self.index.contains_key(key) {
                self.bind_literal(key.clone(), binding.clone());
            }
        }
        for (re, binding) in &other.patterns {
            if !self.patterns.iter().any(|(p, _)| p.as_str() == re.as_str()) {
                self.patterns.push((re.clone(), binding.clone()));
            }
        }
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.literals.clear();
        self.index.clear();
        self.patterns.clear();
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.literals.len() + self.patterns.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve `key` across stacked maps (most specific first).
///
/// Every layer's literals are tried before any layer's patterns, so an
/// inherited literal beats an own pattern.
pub fn resolve_in<'a>(layers: &[&'a KeyMap], key: &KeyPress) -> Option<&'a KeyBinding> {
    for map in layers {
        if let Some(&i) = map.index.get(&key.full) {
            return Some(&map.literals[i].1);
        }
    }
    let ch = key.ch?;
    let mut buf = [0u8; 4];
    let text: &str = ch.encode_utf8(&mut buf);
    layers
        .iter()
        .flat_map(|map| map.patterns.iter())
        .find(|(re, _)| re.is_match(text))
        .map(|(_, b)| b)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(label: &str) -> KeyBinding {
        KeyBinding::new(|_, _, _| Ok(())).with_legend(label)
    }

    fn legend_of(b: Option<&KeyBinding>) -> Option<&str> {
        b.and_then(|b| b.legend.as_deref())
    }

    // ── Patterns ─────────────────────────────────────────────────────

    #[test]
    fn pattern_parse() {
        assert!(matches!(KeyPattern::parse("up").unwrap(), KeyPattern::Literal(k) if k == "up"));
        assert!(matches!(KeyPattern::parse("/[0-9]/").unwrap(), KeyPattern::Regex(_)));
        assert!(matches!(KeyPattern::parse("/").unwrap(), KeyPattern::Literal(_)));
        assert_eq!(KeyPattern::parse("/./").unwrap().id(), "/./");
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = KeyPattern::parse("/[/").unwrap_err();
        assert!(matches!(err, UiError::InvalidKeyPattern { .. }));
    }

    // ── Resolution ───────────────────────────────────────────────────

    #[test]
    fn shifted_literal_never_resolves_to_plain() {
        let mut map = KeyMap::new();
        map.bind("up", labeled("f1")).unwrap();
        map.bind("S-up", labeled("f2")).unwrap();

        let key = KeyPress { ch: None, full: "S-up".into() };
        assert_eq!(legend_of(map.resolve(&key)), Some("f2"));
        assert_eq!(legend_of(map.resolve(&KeyPress::parse("up"))), Some("f1"));
    }

    #[test]
    fn literal_beats_pattern() {
        let mut map = KeyMap::new();
        map.bind("/./", labeled("any")).unwrap();
        map.bind("q", labeled("quit")).unwrap();
        assert_eq!(legend_of(map.resolve(&KeyPress::char('q'))), Some("quit"));
        assert_eq!(legend_of(map.resolve(&KeyPress::char('z'))), Some("any"));
    }

    #[test]
    fn patterns_tried_in_declaration_order() {
        let mut map = KeyMap::new();
        map.bind("/[0-9]/", labeled("digit")).unwrap();
        map.bind("/./", labeled("any")).unwrap();
        assert_eq!(legend_of(map.resolve(&KeyPress::char('7'))), Some("digit"));
    }

    #[test]
    fn pattern_needs_a_produced_char() {
        let mut map = KeyMap::new();
        map.bind("/./", labeled("any")).unwrap();
        assert!(map.resolve(&KeyPress::parse("enter")).is_none());
    }

    #[test]
    fn no_match_is_none() {
        let map = KeyMap::new();
        assert!(map.resolve(&KeyPress::char('x')).is_none());
    }

    #[test]
    fn layered_literals_before_patterns() {
        let mut own = KeyMap::new();
        own.bind("/./", labeled("own-any")).unwrap();
        let mut inherited = KeyMap::new();
        inherited.bind("q", labeled("inherited-q")).unwrap();
        let hit = resolve_in(&[&own, &inherited], &KeyPress::char('q'));
        assert_eq!(legend_of(hit), Some("inherited-q"));
    }

    // ── Mutation ─────────────────────────────────────────────────────

    #[test]
    fn rebind_keeps_position() {
        let mut map = KeyMap::new();
        map.bind("a", labeled("1")).unwrap();
        map.bind("b", labeled("2")).unwrap();
        map.bind("a", labeled("3")).unwrap();
        let ids: Vec<_> = map.entries().map(|(k, b)| (k, b.legend.clone().unwrap())).collect();
        assert_eq!(ids, vec![("a".into(), "3".into()), ("b".into(), "2".into())]);
    }

    #[test]
    fn unbind_reindexes() {
        let mut map = KeyMap::new();
        map.bind("a", labeled("1")).unwrap();
        map.bind("b", labeled("2")).unwrap();
        map.bind("/x/", labeled("3")).unwrap();
        assert!(map.unbind("a").is_some());
        assert_eq!(legend_of(map.get("b")), Some("2"));
        assert!(map.unbind("/x/").is_some());
        assert_eq!(map.len(), 1);
        assert!(map.unbind("missing").is_none());
    }

    #[test]
    fn propagated_and_merge_missing() {
        let mut parent = KeyMap::new();
        parent.bind("q", labeled("quit").with_propagate(true)).unwrap();
        parent.bind("x", labeled("local")).unwrap();
        parent.bind("tab", labeled("next").with_propagate(true)).unwrap();

        let mut child = KeyMap::new();
        child.bind("tab", labeled("child-tab")).unwrap();
        let mut inherited = KeyMap::new();
        inherited.merge_missing(&parent.propagated());

        assert!(inherited.contains_key("q"));
        assert!(!inherited.contains_key("x"));
        // The child's own binding still wins at resolution time.
        let hit = resolve_in(&[&child, &inherited], &KeyPress::parse("tab"));
        assert_eq!(legend_of(hit), Some("child-tab"));
    }

    #[test]
    fn merge_missing_never_overwrites() {
        let mut map = KeyMap::new();
        map.bind("q", labeled("mine")).unwrap();
        let mut other = KeyMap::new();
        other.bind("q", labeled("theirs")).unwrap();
        other.bind("w", labeled("new")).unwrap();
        map.merge_missing(&other);
        assert_eq!(legend_of(map.get("q")), Some("mine"));
        assert_eq!(legend_of(map.get("w")), Some("new"));
    }
}
