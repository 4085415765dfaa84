//! The closed event union exchanged between controllers.
//!
//! Every event has an [`EventKind`]. A fixed subset of kinds,
//! [`EventKind::BUBBLED`], is re-emitted by every controller that receives
//! it, so those events reach every ancestor. All other kinds stop at the
//! first receiver unless a handler re-emits them explicitly.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::controller::{Component, ControllerId};
use crate::geometry::StyleOptions;
use crate::store::StorePath;

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Discriminant of an [`Event`], used to key handler tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Dirty,
    Focus,
    Destroy,
    Destroyed,
    Checkbox,
    Selected,
    TextChanged,
    Log,
    Action,
    Launch,
    Custom,
}

impl EventKind {
    /// Kinds re-emitted by every receiver regardless of local handling.
    pub const BUBBLED: [EventKind; 5] = [
        EventKind::Dirty,
        EventKind::Launch,
        EventKind::Focus,
        EventKind::Log,
        EventKind::Action,
    ];

    /// Whether this kind always bubbles.
    pub fn bubbles(self) -> bool {
        Self::BUBBLED.contains(&self)
    }

    /// Kebab-case name, e.g. `"text-changed"`.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Dirty => "dirty",
            EventKind::Focus => "focus",
            EventKind::Destroy => "destroy",
            EventKind::Destroyed => "destroyed",
            EventKind::Checkbox => "checkbox",
            EventKind::Selected => "selected",
            EventKind::TextChanged => "text-changed",
            EventKind::Log => "log",
            EventKind::Action => "action",
            EventKind::Launch => "launch",
            EventKind::Custom => "custom",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// LogLevel
// ---------------------------------------------------------------------------

/// Severity carried by [`Event::Log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// Builds a fresh component instance on demand.
pub type ComponentFactory = Rc<dyn Fn() -> Box<dyn Component>>;

/// Request for the built-in `"open-modal"` action.
#[derive(Clone)]
pub struct ModalRequest {
    /// Controller that gets focus back when the modal is destroyed.
    pub requester: Option<ControllerId>,
    pub component: ComponentFactory,
    pub style: StyleOptions,
    /// Model path for the modal; defaults to the root model.
    pub model: Option<StorePath>,
}

impl ModalRequest {
    /// A request to open the component built by `factory`.
    pub fn new(factory: impl Fn() -> Box<dyn Component> + 'static) -> Self {
        Self {
            requester: None,
            component: Rc::new(factory),
            style: StyleOptions::default(),
            model: None,
        }
    }

    /// Set the requesting controller (builder).
    pub fn with_requester(mut self, requester: ControllerId) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Set the modal's style (builder).
    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }

    /// Set the modal's model path (builder).
    pub fn with_model(mut self, model: impl Into<StorePath>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl fmt::Debug for ModalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalRequest")
            .field("requester", &self.requester)
            .field("component", &"<factory>")
            .field("style", &self.style)
            .field("model", &self.model)
            .finish()
    }
}

/// A request for the application to do something, keyed by name.
#[derive(Debug, Clone)]
pub enum Action {
    OpenModal(ModalRequest),
    Named { name: String, payload: Value },
}

impl Action {
    /// A named action with a null payload.
    pub fn named(name: impl Into<String>) -> Self {
        Action::Named { name: name.into(), payload: Value::Null }
    }

    /// A named action carrying `payload`.
    pub fn with_payload(name: impl Into<String>, payload: Value) -> Self {
        Action::Named { name: name.into(), payload }
    }

    /// The action-table key.
    pub fn name(&self) -> &str {
        match self {
            Action::OpenModal(_) => "open-modal",
            Action::Named { name, .. } => name,
        }
    }

    /// The payload of a named action.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Action::OpenModal(_) => None,
            Action::Named { payload, .. } => Some(payload),
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An event flowing up the controller tree.
#[derive(Debug, Clone)]
pub enum Event {
    /// Repaint request.
    Dirty,
    /// `target` took focus.
    Focus { target: ControllerId },
    /// Command: the receiving parent should remove and destroy `target`.
    Destroy { target: ControllerId },
    /// Notification: `id` has been destroyed.
    Destroyed { id: ControllerId },
    Checkbox { id: ControllerId, checked: bool },
    Selected { id: ControllerId, index: usize, value: Option<Value> },
    TextChanged { id: ControllerId, text: String },
    Log { level: LogLevel, message: String },
    Action(Action),
    Launch { target: Value },
    Custom { name: String, payload: Value },
}

impl Event {
    /// The discriminant of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Dirty => EventKind::Dirty,
            Event::Focus { .. } => EventKind::Focus,
            Event::Destroy { .. } => EventKind::Destroy,
            Event::Destroyed { .. } => EventKind::Destroyed,
            Event::Checkbox { .. } => EventKind::Checkbox,
            Event::Selected { .. } => EventKind::Selected,
            Event::TextChanged { .. } => EventKind::TextChanged,
            Event::Log { .. } => EventKind::Log,
            Event::Action(_) => EventKind::Action,
            Event::Launch { .. } => EventKind::Launch,
            Event::Custom { .. } => EventKind::Custom,
        }
    }

    /// An info-level log event.
    pub fn log(message: impl Into<String>) -> Self {
        Event::Log { level: LogLevel::Info, message: message.into() }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bubbled_set_is_fixed() {
        let bubbling: Vec<_> = [
            EventKind::Dirty,
            EventKind::Focus,
            EventKind::Destroy,
            EventKind::Destroyed,
            EventKind::Checkbox,
            EventKind::Selected,
            EventKind::TextChanged,
            EventKind::Log,
            EventKind::Action,
            EventKind::Launch,
            EventKind::Custom,
        ]
        .into_iter()
        .filter(|k| k.bubbles())
        .collect();
        assert_eq!(
            bubbling,
            vec![EventKind::Dirty, EventKind::Focus, EventKind::Log, EventKind::Action, EventKind::Launch]
        );
    }

    #[test]
    fn kind_of_each_event() {
        assert_eq!(Event::Dirty.kind(), EventKind::Dirty);
        assert_eq!(Event::log("hi").kind(), EventKind::Log);
        assert_eq!(Event::Launch { target: json!("web") }.kind(), EventKind::Launch);
        assert_eq!(Event::Action(Action::named("quit")).kind(), EventKind::Action);
    }

    #[test]
    fn kind_names_are_kebab_case() {
        assert_eq!(EventKind::TextChanged.to_string(), "text-changed");
        assert_eq!(EventKind::Destroyed.name(), "destroyed");
    }

    #[test]
    fn action_names() {
        assert_eq!(Action::named("launch").name(), "launch");
        assert_eq!(Action::with_payload("x", json!(1)).payload(), Some(&json!(1)));
    }
}
