//! Handler registration and single-pass bubbling.
//!
//! `emit` hands an event to every listener of the emitting controller. A
//! parent controller that receives it runs its handler for the event's kind,
//! applies the structural reactions to `Destroy`/`Destroyed`, and re-emits
//! the event if its kind is in [`EventKind::BUBBLED`]. Everything else stops
//! at the first receiver.

use std::rc::Rc;

use tracing::{trace, warn};

use super::{ControllerId, EventHandler, Listener, Ui};
use crate::error::Result;
use crate::event::{Action, Event, EventKind};

impl Ui {
    /// Register the handler for `kind` on `id`, replacing any previous one.
    pub fn on(
        &mut self,
        id: ControllerId,
        kind: EventKind,
        handler: impl Fn(&mut Ui, ControllerId, &Event) -> Result<()> + 'static,
    ) -> Result<()> {
        let handler: EventHandler = Rc::new(handler);
        self.get_mut(id)?.events.insert(kind, handler);
        Ok(())
    }

    /// Remove the handler for `kind`. Returns whether one was registered.
    pub fn off(&mut self, id: ControllerId, kind: EventKind) -> Result<bool> {
        Ok(self.get_mut(id)?.events.remove(&kind).is_some())
    }

    /// Add a listener to `id`'s emitted events.
    pub fn listen(&mut self, id: ControllerId, listener: Listener) -> Result<()> {
        self.get_mut(id)?.listeners.push(listener);
        Ok(())
    }

    /// Attach an external callback to `id`'s emitted events.
    pub fn hook(&mut self, id: ControllerId, hook: impl Fn(&mut Ui, &Event) + 'static) -> Result<()> {
        self.listen(id, Listener::Hook(Rc::new(hook)))
    }

    /// Notify every listener of `id`, in registration order.
    pub fn emit(&mut self, id: ControllerId, event: &Event) {
        let Some(listeners) = self.controllers.get(id).map(|c| c.listeners.clone()) else {
            return;
        };
        self.deliver(&listeners, event);
    }

    fn deliver(&mut self, listeners: &[Listener], event: &Event) {
        for listener in listeners.iter().cloned() {
            match listener {
                Listener::Controller(parent) => self.receive(parent, event),
                Listener::Outbox => self.outbox.push_back(event.clone()),
                Listener::Hook(hook) => hook(self, event),
            }
        }
    }

    /// Deliver `event` to `id` as if a child had emitted it.
    pub fn receive(&mut self, id: ControllerId, event: &Event) {
        let kind = event.kind();
        // Bubbling goes to the listeners present on arrival, even if the
        // handler tears this controller down.
        let (handler, listeners) = match self.controllers.get(id) {
            Some(c) if !c.destroyed => (c.events.get(&kind).cloned(), c.listeners.clone()),
            _ => return,
        };

        if let Some(handler) = handler {
            if let Err(err) = handler(self, id, event) {
                warn!(?id, event = %kind, %err, "event handler failed");
            }
        }

        match event {
            Event::Destroyed { id: child } if self.children(id).contains(child) => {
                trace!(parent = ?id, child = ?child, "detaching destroyed child");
                self.remove_from_children(id, *child);
            }
            Event::Destroy { target } if self.children(id).contains(target) => {
                if let Err(err) = self.destroy(*target) {
                    warn!(parent = ?id, ?target, %err, "destroy command failed");
                }
            }
            _ => {}
        }

        if kind.bubbles() {
            self.deliver(&listeners, event);
        }
    }

    /// Emit [`Event::Action`] from `id`.
    pub fn dispatch(&mut self, id: ControllerId, action: Action) -> Result<()> {
        self.get(id)?;
        self.emit(id, &Event::Action(action));
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
