//! The controller arena: construction, composition, teardown, model access,
//! geometry, key maps and layout bindings.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::Value;
use slotmap::SlotMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{trace, warn};

use super::{ChildSpec, Component, Controller, ControllerId, Listener, WatchHandler};
use crate::app::Deferred;
use crate::error::{Result, UiError};
use crate::event::{resolve_in, Event, KeyBinding, KeyMap, KeyPress};
use crate::geometry::{PropValue, Region, Size, StyleOptions};
use crate::layout::ControllerLayout;
use crate::store::{Store, StorePath};
use crate::theme::{ColorMode, Theme};
use crate::widget::{Backend, LayoutProp, WidgetId};

/// A store notification waiting to be delivered to a controller watcher.
pub(crate) struct PendingWatch {
    pub(crate) id: ControllerId,
    pub(crate) handler: WatchHandler,
    pub(crate) path: StorePath,
    pub(crate) value: Value,
}

/// Owns every controller, the backend, the theme and the default store.
pub struct Ui {
    pub(crate) controllers: SlotMap<ControllerId, Controller>,
    pub(crate) backend: Box<dyn Backend>,
    pub(crate) theme: Rc<Theme>,
    pub(crate) color_mode: ColorMode,
    pub(crate) store: Store,
    pub(crate) outbox: VecDeque<Event>,
    pub(crate) focused: Option<ControllerId>,
    pub(crate) active: Option<ControllerId>,
    pub(crate) roots: Vec<ControllerId>,
    pub(crate) watch_queue: Rc<RefCell<VecDeque<PendingWatch>>>,
    pub(crate) deferred: Option<UnboundedSender<Deferred>>,
    pub(crate) quit: bool,
}

impl Ui {
    /// A UI over `backend` with an empty store and the built-in theme.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self::with_store(backend, Store::default())
    }

    pub fn with_store(backend: Box<dyn Backend>, store: Store) -> Self {
        Self {
            controllers: SlotMap::with_key(),
            backend,
            theme: Rc::new(Theme::builtin()),
            color_mode: ColorMode::default(),
            store,
            outbox: VecDeque::new(),
            focused: None,
            active: None,
            roots: Vec::new(),
            watch_queue: Rc::new(RefCell::new(VecDeque::new())),
            deferred: None,
            quit: false,
        }
    }

    // -- Environment --------------------------------------------------------

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    /// Downcast the backend.
    pub fn backend_as<T: 'static>(&self) -> Option<&T> {
        self.backend.as_any().downcast_ref::<T>()
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Rc<Theme>) {
        self.theme = theme;
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    /// The application-wide store.
    pub fn default_store(&self) -> &Store {
        &self.store
    }

    pub fn screen_size(&self) -> Size {
        self.backend.screen_size()
    }

    /// Resize the screen and request a repaint.
    pub fn resize(&mut self, size: Size) {
        self.backend.resize(size);
        self.outbox.push_back(Event::Dirty);
    }

    /// Sender for work finishing off the UI thread, if a run loop is attached.
    pub fn deferred(&self) -> Option<UnboundedSender<Deferred>> {
        self.deferred.clone()
    }

    pub(crate) fn set_deferred(&mut self, tx: UnboundedSender<Deferred>) {
        self.deferred = Some(tx);
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// The controller whose key map receives input: the last one to report
    /// focus to the application.
    pub fn active_controller(&self) -> Option<ControllerId> {
        self.active.filter(|id| self.controllers.contains_key(*id))
    }

    pub(crate) fn set_active_controller(&mut self, id: ControllerId) {
        self.active = Some(id);
    }

    /// Pop the oldest event that reached the top of the tree.
    pub fn next_outbox_event(&mut self) -> Option<Event> {
        self.outbox.pop_front()
    }

    pub fn outbox_len(&self) -> usize {
        self.outbox.len()
    }

    // -- Lookup -------------------------------------------------------------

    pub fn contains(&self, id: ControllerId) -> bool {
        self.controllers.contains_key(id)
    }

    pub fn controller(&self, id: ControllerId) -> Option<&Controller> {
        self.controllers.get(id)
    }

    pub(crate) fn get(&self, id: ControllerId) -> Result<&Controller> {
        self.controllers.get(id).ok_or(UiError::UnknownController(id))
    }

    pub(crate) fn get_mut(&mut self, id: ControllerId) -> Result<&mut Controller> {
        self.controllers.get_mut(id).ok_or(UiError::UnknownController(id))
    }

    pub fn parent(&self, id: ControllerId) -> Option<ControllerId> {
        self.controllers.get(id).and_then(|c| c.parent)
    }

    pub fn children(&self, id: ControllerId) -> &[ControllerId] {
        self.controllers.get(id).map(|c| c.children.as_slice()).unwrap_or_default()
    }

    /// Top-level controllers, in creation order.
    pub fn roots(&self) -> &[ControllerId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// The backing widget, or [`UiError::NoWidget`].
    pub fn widget(&self, id: ControllerId) -> Result<WidgetId> {
        self.get(id)?.widget.ok_or(UiError::NoWidget(id))
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: ControllerId, id: ControllerId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    // -- Construction -------------------------------------------------------

    /// Arena entry plus a detached widget; no mount.
    fn instantiate(&mut self, component: Box<dyn Component>, model: StorePath, store: Store) -> ControllerId {
        let component: Rc<dyn Component> = Rc::from(component);
        let kind = component.widget_kind();
        let name = component.name().to_owned();
        let id = self.controllers.insert(Controller::new(component, model, store));
        let widget = self.backend.create(kind);
        if let Some(c) = self.controllers.get_mut(id) {
            c.widget = Some(widget);
        }
        trace!(?id, component = %name, "controller created");
        id
    }

    fn mount(&mut self, id: ControllerId) -> Result<()> {
        let component = Rc::clone(&self.get(id)?.component);
        if let Err(err) = component.mount(self, id) {
            let _ = self.destroy(id);
            return Err(err);
        }
        Ok(())
    }

    /// Resolve a spec into a fresh controller (or the existing one) plus the
    /// style to apply, using `model`/`store` as defaults.
    fn resolve_spec(
        &mut self,
        spec: ChildSpec,
        model: &StorePath,
        store: &Store,
        style: Option<StyleOptions>,
    ) -> Result<(ControllerId, Option<StyleOptions>, bool)> {
        match spec {
            ChildSpec::Existing(id) => {
                self.get(id)?;
                Ok((id, style, false))
            }
            ChildSpec::Class(component) => {
                Ok((self.instantiate(component, model.clone(), store.clone()), style, true))
            }
            ChildSpec::Descriptor(d) => {
                let id = self.instantiate(
                    d.component,
                    d.model.unwrap_or_else(|| model.clone()),
                    d.store.unwrap_or_else(|| store.clone()),
                );
                let style = match (style, d.style) {
                    (Some(call_site), Some(declared)) => Some(call_site.overlay(&declared)),
                    (call_site, declared) => declared.or(call_site),
                };
                Ok((id, style, true))
            }
        }
    }

    /// Build a controller that is not yet in the tree. Its model defaults to
    /// the root path of the default store. Existing ids are returned as-is.
    pub fn create(&mut self, spec: impl Into<ChildSpec>) -> Result<ControllerId> {
        let store = self.store.clone();
        let (id, style, fresh) = self.resolve_spec(spec.into(), &StorePath::root(), &store, None)?;
        if let Some(style) = style {
            self.apply_style(id, &style)?;
        }
        if fresh {
            self.mount(id)?;
        }
        Ok(id)
    }

    /// Build a top-level controller whose events reach the application
    /// outbox. Its widget is attached at the screen's top level.
    pub fn create_root(&mut self, spec: impl Into<ChildSpec>, style: Option<StyleOptions>) -> Result<ControllerId> {
        let store = self.store.clone();
        let (id, style, fresh) = self.resolve_spec(spec.into(), &StorePath::root(), &store, style)?;
        if !fresh {
            self.detach_from_parent(id);
        }
        let widget = self.widget(id)?;
        self.roots.retain(|r| *r != id);
        self.roots.push(id);
        let c = self.get_mut(id)?;
        if !c.listeners.iter().any(|l| matches!(l, Listener::Outbox)) {
            c.listeners.push(Listener::Outbox);
        }
        self.backend.attach(widget, None);
        if let Some(style) = style {
            self.apply_style(id, &style)?;
        }
        if fresh {
            self.mount(id)?;
        }
        self.outbox.push_back(Event::Dirty);
        Ok(id)
    }

    /// Add a child under `parent`.
    ///
    /// The child is appended to `parent`'s children, `parent` is registered
    /// as its listener, its widget is attached under `parent`'s widget, the
    /// style is applied and, for new controllers, the component is mounted.
    /// A failed mount destroys the child and returns the error.
    pub fn add_child(
        &mut self,
        parent: ControllerId,
        spec: impl Into<ChildSpec>,
        style: Option<StyleOptions>,
    ) -> Result<ControllerId> {
        let parent_widget = self.widget(parent)?;
        let (model, store) = {
            let p = self.get(parent)?;
            (p.model.clone(), p.store.clone())
        };
        let inherited = self.propagated_keys(parent)?;
        let (child, style, fresh) = self.resolve_spec(spec.into(), &model, &store, style)?;

        if !fresh {
            if self.is_ancestor(child, parent) {
                return Err(UiError::Cycle { child, parent });
            }
            self.detach_from_parent(child);
        }
        let child_widget = self.widget(child)?;

        let c = self.get_mut(child)?;
        c.parent = Some(parent);
        c.inherited = inherited;
        c.listeners.retain(|l| !matches!(l, Listener::Outbox));
        c.listeners.push(Listener::Controller(parent));
        self.get_mut(parent)?.children.push(child);
        self.backend.attach(child_widget, Some(parent_widget));
        if let Some(style) = style {
            self.apply_style(child, &style)?;
        }
        if fresh {
            self.mount(child)?;
        }
        self.emit(parent, &Event::Dirty);
        Ok(child)
    }

    /// Remove `id` from its parent's children (or the top level) and detach
    /// its widget. The controller stays alive.
    pub(crate) fn detach_from_parent(&mut self, id: ControllerId) {
        let parent = self.controllers.get_mut(id).and_then(|c| c.parent.take());
        if let Some(parent) = parent {
            self.remove_from_children(parent, id);
        }
        if let Some(c) = self.controllers.get_mut(id) {
            c.listeners.retain(|l| !matches!(l, Listener::Controller(p) if Some(*p) == parent));
        }
        self.roots.retain(|r| *r != id);
        if let Some(widget) = self.controllers.get(id).and_then(|c| c.widget) {
            self.backend.detach(widget);
        }
    }

    /// Drop `child` from `parent.children`, keeping `focused_index` on the
    /// same child where possible.
    pub(crate) fn remove_from_children(&mut self, parent: ControllerId, child: ControllerId) {
        let Some(p) = self.controllers.get_mut(parent) else { return };
        let Some(pos) = p.children.iter().position(|c| *c == child) else { return };
        p.children.remove(pos);
        if pos < p.focused_index {
            p.focused_index -= 1;
        }
        if p.focused_index >= p.children.len() {
            p.focused_index = p.children.len().saturating_sub(1);
        }
    }

    /// Apply geometry and declared appearance from `style`.
    pub fn apply_style(&mut self, id: ControllerId, style: &StyleOptions) -> Result<()> {
        let widget = self.widget(id)?;
        for (prop, value) in [
            (LayoutProp::Top, &style.top),
            (LayoutProp::Bottom, &style.bottom),
            (LayoutProp::Left, &style.left),
            (LayoutProp::Right, &style.right),
            (LayoutProp::Width, &style.width),
            (LayoutProp::Height, &style.height),
        ] {
            if let Some(value) = value {
                self.backend.set(widget, prop, value.clone());
            }
        }
        let c = self.get_mut(id)?;
        c.appearance = c.appearance.overlay(&style.appearance);
        Ok(())
    }

    // -- Teardown -----------------------------------------------------------

    /// Destroy `id`, its descendants and its widget, then notify listeners
    /// with [`Event::Destroyed`]. Destroying twice is a no-op.
    pub fn destroy(&mut self, id: ControllerId) -> Result<()> {
        let c = self.get_mut(id)?;
        if c.destroyed {
            return Ok(());
        }
        c.destroyed = true;
        c.alive.set(false);
        let children = c.children.clone();
        for child in children {
            let _ = self.destroy(child);
        }

        if let Some(widget) = self.controllers.get_mut(id).and_then(|c| c.widget.take()) {
            self.backend.destroy(widget);
        }
        if self.focused == Some(id) {
            self.focused = None;
        }

        self.emit(id, &Event::Destroyed { id });

        if let Some(parent) = self.parent(id) {
            self.remove_from_children(parent, id);
        }
        self.roots.retain(|r| *r != id);
        self.controllers.remove(id);
        trace!(?id, "controller destroyed");
        Ok(())
    }

    /// Destroy every child of `id`.
    pub fn remove_all_children(&mut self, id: ControllerId) -> Result<()> {
        let children = self.get(id)?.children.clone();
        for child in children {
            self.destroy(child)?;
        }
        self.emit(id, &Event::Dirty);
        Ok(())
    }

    // -- Model --------------------------------------------------------------

    /// The store `id` reads and writes.
    pub fn store(&self, id: ControllerId) -> Result<Store> {
        Ok(self.get(id)?.store.clone())
    }

    /// The absolute model path of `id`.
    pub fn model_path(&self, id: ControllerId) -> Result<StorePath> {
        Ok(self.get(id)?.model.clone())
    }

    /// `id`'s whole model slice.
    pub fn model(&self, id: ControllerId) -> Result<Option<Value>> {
        let c = self.get(id)?;
        Ok(c.store.get(&c.model))
    }

    /// Read `rel` relative to `id`'s model.
    pub fn model_get(&self, id: ControllerId, rel: impl Into<StorePath>) -> Result<Option<Value>> {
        let c = self.get(id)?;
        Ok(c.store.get(c.model.join(rel)))
    }

    /// Write `rel` relative to `id`'s model and deliver queued watchers.
    pub fn model_set(&mut self, id: ControllerId, rel: impl Into<StorePath>, value: Value) -> Result<()> {
        let (store, path) = {
            let c = self.get(id)?;
            (c.store.clone(), c.model.join(rel))
        };
        store.set(path, value);
        self.flush_watchers();
        Ok(())
    }

    /// Write an absolute path in the default store and deliver watchers.
    pub fn set(&mut self, path: impl Into<StorePath>, value: Value) {
        self.store.set(path, value);
        self.flush_watchers();
    }

    /// Subscribe `id` to writes at or below `rel` in its model. Deliveries
    /// are queued and run with `&mut Ui` by [`Ui::flush_watchers`]; they stop
    /// once the controller is destroyed.
    pub fn watch(
        &mut self,
        id: ControllerId,
        rel: impl Into<StorePath>,
        handler: impl Fn(&mut Ui, ControllerId, &StorePath, &Value) -> Result<()> + 'static,
    ) -> Result<()> {
        let (store, path, alive) = {
            let c = self.get(id)?;
            (c.store.clone(), c.model.join(rel), Rc::clone(&c.alive))
        };
        let handler: WatchHandler = Rc::new(handler);
        let queue = Rc::downgrade(&self.watch_queue);
        store.subscribe(path, move |written, value| {
            if !alive.get() {
                return;
            }
            if let Some(queue) = queue.upgrade() {
                queue.borrow_mut().push_back(PendingWatch {
                    id,
                    handler: Rc::clone(&handler),
                    path: written.clone(),
                    value: value.clone(),
                });
            }
        });
        Ok(())
    }

    /// Deliver queued store notifications, in write order.
    pub fn flush_watchers(&mut self) {
        loop {
            let next = self.watch_queue.borrow_mut().pop_front();
            let Some(pending) = next else { break };
            if !self.controllers.get(pending.id).is_some_and(|c| !c.destroyed) {
                continue;
            }
            if let Err(err) = (pending.handler)(self, pending.id, &pending.path, &pending.value) {
                warn!(id = ?pending.id, path = %pending.path, %err, "watch handler failed");
            }
        }
    }

    pub fn pending_watchers(&self) -> usize {
        self.watch_queue.borrow().len()
    }

    // -- Geometry and content -----------------------------------------------

    pub fn prop(&self, id: ControllerId, prop: LayoutProp) -> Result<PropValue> {
        Ok(self.backend.get(self.widget(id)?, prop))
    }

    pub fn set_prop(&mut self, id: ControllerId, prop: LayoutProp, value: impl Into<PropValue>) -> Result<()> {
        let widget = self.widget(id)?;
        self.backend.set(widget, prop, value.into());
        Ok(())
    }

    /// `(top, left)`.
    pub fn position(&self, id: ControllerId) -> Result<(PropValue, PropValue)> {
        Ok((self.prop(id, LayoutProp::Top)?, self.prop(id, LayoutProp::Left)?))
    }

    pub fn set_position(&mut self, id: ControllerId, top: impl Into<PropValue>, left: impl Into<PropValue>) -> Result<()> {
        self.set_prop(id, LayoutProp::Top, top)?;
        self.set_prop(id, LayoutProp::Left, left)
    }

    /// `(width, height)`.
    pub fn size(&self, id: ControllerId) -> Result<(PropValue, PropValue)> {
        Ok((self.prop(id, LayoutProp::Width)?, self.prop(id, LayoutProp::Height)?))
    }

    pub fn set_size(&mut self, id: ControllerId, width: impl Into<PropValue>, height: impl Into<PropValue>) -> Result<()> {
        self.set_prop(id, LayoutProp::Width, width)?;
        self.set_prop(id, LayoutProp::Height, height)
    }

    /// Resolved screen region.
    pub fn region(&self, id: ControllerId) -> Result<Region> {
        Ok(self.backend.region(self.widget(id)?))
    }

    pub fn set_content(&mut self, id: ControllerId, content: &str) -> Result<()> {
        let widget = self.widget(id)?;
        self.backend.set_content(widget, content);
        Ok(())
    }

    pub fn set_items(&mut self, id: ControllerId, items: Vec<String>) -> Result<()> {
        let widget = self.widget(id)?;
        self.backend.set_items(widget, items);
        Ok(())
    }

    pub fn select_item(&mut self, id: ControllerId, index: Option<usize>) -> Result<()> {
        let widget = self.widget(id)?;
        self.backend.select_item(widget, index);
        Ok(())
    }

    pub fn set_checked(&mut self, id: ControllerId, checked: bool) -> Result<()> {
        let widget = self.widget(id)?;
        self.backend.set_checked(widget, checked);
        Ok(())
    }

    // -- Keys ---------------------------------------------------------------

    /// Bind `key` on `id`; the binding is owned by `id`.
    pub fn bind_key(&mut self, id: ControllerId, key: &str, mut binding: KeyBinding) -> Result<()> {
        binding.owner = Some(id);
        self.get_mut(id)?.keys.bind(key, binding)
    }

    pub fn unbind_key(&mut self, id: ControllerId, key: &str) -> Result<Option<KeyBinding>> {
        Ok(self.get_mut(id)?.keys.unbind(key))
    }

    /// Own keys first, then inherited keys not defined locally.
    pub fn effective_keymap(&self, id: ControllerId) -> Result<KeyMap> {
        let c = self.get(id)?;
        let mut map = c.keys.clone();
        map.merge_missing(&c.inherited);
        Ok(map)
    }

    /// What a child added to `id` right now would inherit.
    pub fn propagated_keys(&self, id: ControllerId) -> Result<KeyMap> {
        let c = self.get(id)?;
        let mut map = c.keys.propagated();
        map.merge_missing(&c.inherited.propagated());
        Ok(map)
    }

    /// Resolve a key press against `id`'s own and inherited keys.
    pub fn resolve_key(&self, id: ControllerId, key: &KeyPress) -> Option<KeyBinding> {
        let c = self.controllers.get(id)?;
        resolve_in(&[&c.keys, &c.inherited], key).cloned()
    }

    // -- Layout -------------------------------------------------------------

    pub fn bind_layout(
        &mut self,
        id: ControllerId,
        prop: LayoutProp,
        provider: impl Fn(&Ui, ControllerId) -> PropValue + 'static,
    ) -> Result<()> {
        self.get_mut(id)?.layout.bind(prop, provider);
        Ok(())
    }

    pub fn unbind_layout(&mut self, id: ControllerId, prop: LayoutProp) -> Result<bool> {
        Ok(self.get_mut(id)?.layout.unbind(prop))
    }

    /// Evaluate `id`'s layout providers and write the results to its widget.
    pub fn apply_layout(&mut self, id: ControllerId) -> Result<()> {
        let widget = self.widget(id)?;
        let layout: ControllerLayout = self.get(id)?.layout.clone();
        for (prop, value) in layout.evaluate(self, id) {
            self.backend.set(widget, prop, value);
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
