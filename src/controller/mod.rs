//! Controllers: composable UI nodes living in the [`Ui`] arena.
//!
//! Each controller wraps exactly one backend widget, a slice of the shared
//! model (a [`StorePath`] prefix into a [`Store`]), an ordered list of
//! children (which is also the focus order), a key map, an event handler
//! table and a list of listeners. Behavior is supplied by a [`Component`];
//! all tree operations live on [`Ui`] and address controllers by
//! [`ControllerId`].

mod events;
mod focus;
mod paint;
mod ui;

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use slotmap::new_key_type;

use crate::error::Result;
use crate::event::{Event, EventKind, KeyMap};
use crate::geometry::{Appearance, Behavior, StyleOptions};
use crate::layout::ControllerLayout;
use crate::store::{Store, StorePath};
use crate::widget::{WidgetId, WidgetKind};

pub use focus::next_focusable_index;
pub use ui::Ui;

new_key_type! {
    /// Handle to a controller in the [`Ui`] arena.
    pub struct ControllerId;
}

/// Handler registered with [`Ui::on`].
pub type EventHandler = Rc<dyn Fn(&mut Ui, ControllerId, &Event) -> Result<()>>;

/// External listener callback.
pub type HookFn = Rc<dyn Fn(&mut Ui, &Event)>;

/// Store subscription delivered with access to the [`Ui`].
pub type WatchHandler = Rc<dyn Fn(&mut Ui, ControllerId, &StorePath, &Value) -> Result<()>>;

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Where a controller's emitted events go.
#[derive(Clone)]
pub enum Listener {
    /// A parent controller; it receives the event.
    Controller(ControllerId),
    /// The application's outbox.
    Outbox,
    /// An external callback.
    Hook(HookFn),
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Controller(id) => f.debug_tuple("Controller").field(id).finish(),
            Listener::Outbox => f.write_str("Outbox"),
            Listener::Hook(_) => f.write_str("Hook(<fn>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// The behavior behind a controller.
///
/// `mount` runs once, after the controller is attached to its parent, and
/// is where a component adds children, binds keys and registers handlers.
pub trait Component {
    /// Theme key for this component (e.g. `"button"`).
    fn name(&self) -> &str;

    /// The primitive widget backing the controller.
    fn widget_kind(&self) -> WidgetKind {
        WidgetKind::Box
    }

    fn behavior(&self) -> Behavior {
        Behavior::default()
    }

    fn mount(&self, _ui: &mut Ui, _id: ControllerId) -> Result<()> {
        Ok(())
    }

    /// Runs before every paint of this controller.
    fn before_render(&self, _ui: &mut Ui, _id: ControllerId) -> Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ChildSpec
// ---------------------------------------------------------------------------

/// A component with explicit model, store or style.
pub struct ChildDescriptor {
    pub component: Box<dyn Component>,
    /// Absolute model path; defaults to the parent's.
    pub model: Option<StorePath>,
    /// Defaults to the parent's store.
    pub store: Option<Store>,
    /// Laid over the call-site style.
    pub style: Option<StyleOptions>,
}

impl ChildDescriptor {
    pub fn new(component: impl Component + 'static) -> Self {
        Self::new_boxed(Box::new(component))
    }

    pub fn new_boxed(component: Box<dyn Component>) -> Self {
        Self { component, model: None, store: None, style: None }
    }

    pub fn with_model(mut self, model: impl Into<StorePath>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = Some(style);
        self
    }
}

/// What [`Ui::add_child`] adds.
pub enum ChildSpec {
    /// An already-constructed controller, re-parented.
    Existing(ControllerId),
    /// A component built with the parent's model and store.
    Class(Box<dyn Component>),
    Descriptor(ChildDescriptor),
}

impl<C: Component + 'static> From<C> for ChildSpec {
    fn from(component: C) -> Self {
        ChildSpec::Class(Box::new(component))
    }
}

impl From<Box<dyn Component>> for ChildSpec {
    fn from(component: Box<dyn Component>) -> Self {
        ChildSpec::Class(component)
    }
}

impl From<ChildDescriptor> for ChildSpec {
    fn from(descriptor: ChildDescriptor) -> Self {
        ChildSpec::Descriptor(descriptor)
    }
}

impl From<ControllerId> for ChildSpec {
    fn from(id: ControllerId) -> Self {
        ChildSpec::Existing(id)
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// One node of the controller tree.
pub struct Controller {
    pub(crate) component: Rc<dyn Component>,
    pub(crate) widget: Option<WidgetId>,
    pub(crate) parent: Option<ControllerId>,
    pub(crate) model: StorePath,
    pub(crate) store: Store,
    pub(crate) children: Vec<ControllerId>,
    pub(crate) focused_index: usize,
    pub(crate) keys: KeyMap,
    pub(crate) inherited: KeyMap,
    pub(crate) events: HashMap<EventKind, EventHandler>,
    pub(crate) listeners: Vec<Listener>,
    pub(crate) focusable: bool,
    pub(crate) enabled: bool,
    pub(crate) selected: bool,
    pub(crate) appearance: Appearance,
    pub(crate) layout: ControllerLayout,
    pub(crate) destroyed: bool,
    /// Shared with store subscriptions so they go quiet after teardown.
    pub(crate) alive: Rc<Cell<bool>>,
}

impl Controller {
    pub(crate) fn new(component: Rc<dyn Component>, model: StorePath, store: Store) -> Self {
        let focusable = component.behavior().focusable;
        Self {
            component,
            widget: None,
            parent: None,
            model,
            store,
            children: Vec::new(),
            focused_index: 0,
            keys: KeyMap::new(),
            inherited: KeyMap::new(),
            events: HashMap::new(),
            listeners: Vec::new(),
            focusable,
            enabled: true,
            selected: false,
            appearance: Appearance::default(),
            layout: ControllerLayout::new(),
            destroyed: false,
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// The component's theme key.
    pub fn name(&self) -> &str {
        self.component.name()
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub fn widget(&self) -> Option<WidgetId> {
        self.widget
    }

    pub fn parent(&self) -> Option<ControllerId> {
        self.parent
    }

    pub fn model(&self) -> &StorePath {
        &self.model
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn children(&self) -> &[ControllerId] {
        &self.children
    }

    pub fn focused_index(&self) -> usize {
        self.focused_index
    }

    /// Keys bound on this controller.
    pub fn keys(&self) -> &KeyMap {
        &self.keys
    }

    /// Keys propagated from ancestors when this controller was added.
    pub fn inherited_keys(&self) -> &KeyMap {
        &self.inherited
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    pub fn is_focusable_self(&self) -> bool {
        self.focusable && self.enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Appearance declared through style options.
    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn layout(&self) -> &ControllerLayout {
        &self.layout
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.name())
            .field("widget", &self.widget)
            .field("parent", &self.parent)
            .field("model", &self.model)
            .field("children", &self.children)
            .field("focused_index", &self.focused_index)
            .field("keys", &self.keys.len())
            .field("inherited", &self.inherited.len())
            .field("listeners", &self.listeners)
            .field("focusable", &self.focusable)
            .field("enabled", &self.enabled)
            .field("selected", &self.selected)
            .finish()
    }
}
