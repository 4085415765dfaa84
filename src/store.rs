//! Reactive, path-addressed state container.
//!
//! A [`Store`] wraps a single `serde_json::Value` and is shared by cloning the
//! handle. Writes go through [`Store::set`], which publishes synchronously to
//! every subscriber whose path is a prefix of the written path, in
//! registration order. There is no batching: each `set` is its own
//! notification round.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::warn;

// ---------------------------------------------------------------------------
// StorePath
// ---------------------------------------------------------------------------

/// A path into the model: `"config.ui.web"` or `["items", "0", "name"]`.
///
/// The empty path addresses the whole model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StorePath(Vec<String>);

impl StorePath {
    /// The empty (root) path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a period-delimited path. Empty segments are ignored.
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// The individual segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` is a (non-strict) prefix of `other`.
    ///
    /// `"config"` is a prefix of `"config.ui.web.fgColor"`; the reverse is not.
    pub fn is_prefix_of(&self, other: &StorePath) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    /// Append `other` to this path.
    pub fn join(&self, other: impl Into<StorePath>) -> StorePath {
        let mut segments = self.0.clone();
        segments.extend(other.into().0);
        StorePath(segments)
    }

    /// Append a single segment (which may contain periods verbatim).
    pub fn child(&self, segment: impl Into<String>) -> StorePath {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        StorePath(segments)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for StorePath {
    fn from(s: &str) -> Self {
        StorePath::parse(s)
    }
}

impl From<String> for StorePath {
    fn from(s: String) -> Self {
        StorePath::parse(&s)
    }
}

impl From<&String> for StorePath {
    fn from(s: &String) -> Self {
        StorePath::parse(s)
    }
}

impl From<&StorePath> for StorePath {
    fn from(p: &StorePath) -> Self {
        p.clone()
    }
}

impl From<Vec<String>> for StorePath {
    fn from(segments: Vec<String>) -> Self {
        StorePath(segments)
    }
}

impl From<&[&str]> for StorePath {
    fn from(segments: &[&str]) -> Self {
        StorePath(segments.iter().map(|s| (*s).to_owned()).collect())
    }
}

// ---------------------------------------------------------------------------
// Value navigation
// ---------------------------------------------------------------------------

fn lookup<'v>(value: &'v Value, path: &StorePath) -> Option<&'v Value> {
    path.segments().iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// How far past the end of an array a write may land.
const MAX_ARRAY_PADDING: usize = 1024;

/// Write `new` at `path`, creating intermediate objects as needed.
///
/// Scalars in the way are replaced by objects. Numeric segments index into
/// arrays, padding with `null` when writing past the end. Returns `false`
/// (leaving `value` untouched) when an index lies more than
/// [`MAX_ARRAY_PADDING`] entries past the end of its array.
fn assign(value: &mut Value, segments: &[String], new: Value) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        *value = new;
        return true;
    };

    if let Value::Array(items) = value {
        if let Ok(index) = head.parse::<usize>() {
            if index >= items.len() {
                if index - items.len() >= MAX_ARRAY_PADDING {
                    return false;
                }
                items.resize(index + 1, Value::Null);
            }
            return assign(&mut items[index], rest, new);
        }
    }

    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => {
            let slot = map.entry(head.clone()).or_insert(Value::Null);
            assign(slot, rest, new)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

type Subscriber = Rc<dyn Fn(&StorePath, &Value)>;

struct StoreInner {
    data: RefCell<Value>,
    subscribers: RefCell<Vec<(StorePath, Subscriber)>>,
}

/// Shared handle to a reactive model. Cloning shares the same state.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    /// Create a store holding `initial`.
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                data: RefCell::new(initial),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Read a copy of the value at `path`. Absent paths return `None`.
    pub fn get(&self, path: impl Into<StorePath>) -> Option<Value> {
        let path = path.into();
        lookup(&self.inner.data.borrow(), &path).cloned()
    }

    /// Borrow the value at `path` without cloning it.
    pub fn with<R>(&self, path: impl Into<StorePath>, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let path = path.into();
        let data = self.inner.data.borrow();
        f(lookup(&data, &path))
    }

    /// Write `value` at `path`, then notify every subscriber whose path is a
    /// prefix of `path` with `(path, value)`.
    ///
    /// Subscribers may write to the store again; each nested write runs its
    /// own notification round before this one continues. A write indexing
    /// too far past the end of an array is dropped without notifying.
    pub fn set(&self, path: impl Into<StorePath>, value: Value) {
        let path = path.into();
        let written = assign(&mut self.inner.data.borrow_mut(), path.segments(), value.clone());
        if !written {
            warn!(%path, "array index out of range, write dropped");
            return;
        }

        let matched: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .filter(|(subscribed, _)| subscribed.is_prefix_of(&path))
            .map(|(_, handler)| Rc::clone(handler))
            .collect();

        for handler in matched {
            handler(&path, &value);
        }
    }

    /// Register `handler` for writes at or below `path`.
    ///
    /// Subscriptions are permanent.
    pub fn subscribe(&self, path: impl Into<StorePath>, handler: impl Fn(&StorePath, &Value) + 'static) {
        self.inner
            .subscribers
            .borrow_mut()
            .push((path.into(), Rc::new(handler)));
    }

    /// A copy of the whole model.
    pub fn snapshot(&self) -> Value {
        self.inner.data.borrow().clone()
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Whether two handles share the same underlying store.
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("data", &self.inner.data.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
