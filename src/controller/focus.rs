//! Focus traversal and interaction state.

use tracing::debug;

use super::{ControllerId, Ui};
use crate::error::Result;
use crate::event::Event;

/// Index of the next focusable entry after `from`, stepping by `direction`
/// and wrapping around. `from` itself is considered last, so a single
/// focusable entry returns to itself. `None` when nothing is focusable.
pub fn next_focusable_index(focusable: &[bool], from: usize, direction: isize) -> Option<usize> {
    let len = focusable.len();
    if len == 0 {
        return None;
    }
    let len_i = len as isize;
    let step = if direction < 0 { -1 } else { 1 };
    let start = (from % len) as isize;
    (1..=len_i)
        .map(|n| (start + step * n).rem_euclid(len_i) as usize)
        .find(|&i| focusable[i])
}

impl Ui {
    /// Whether `id` or any descendant can take focus.
    pub fn is_focusable(&self, id: ControllerId) -> bool {
        let Some(c) = self.controllers.get(id) else {
            return false;
        };
        c.is_focusable_self() || c.children.iter().any(|child| self.is_focusable(*child))
    }

    /// The controller whose widget holds focus.
    pub fn focused_controller(&self) -> Option<ControllerId> {
        self.focused
    }

    /// Focus `id`.
    ///
    /// Delegates to the focused child when that child can take focus.
    /// Otherwise `id` focuses its own widget and emits [`Event::Focus`].
    pub fn focus(&mut self, id: ControllerId) -> Result<()> {
        let current = {
            let c = self.get(id)?;
            c.children.get(c.focused_index).copied()
        };
        if let Some(child) = current.filter(|child| self.is_focusable(*child)) {
            return self.focus(child);
        }

        let widget = self.widget(id)?;
        self.backend.focus(widget);
        let previous = self.focused.replace(id);
        if previous != Some(id) {
            debug!(?id, "focus moved");
            self.emit(id, &Event::Dirty);
        }
        self.emit(id, &Event::Focus { target: id });
        Ok(())
    }

    /// Move focus among `id`'s children by `direction` (±1), skipping those
    /// that can't take focus. Returns the newly focused child, or `None` if
    /// none can.
    pub fn next_child(&mut self, id: ControllerId, direction: isize) -> Result<Option<ControllerId>> {
        let (children, index) = {
            let c = self.get(id)?;
            (c.children.clone(), c.focused_index)
        };
        let flags: Vec<bool> = children.iter().map(|child| self.is_focusable(*child)).collect();
        let Some(next) = next_focusable_index(&flags, index, direction) else {
            return Ok(None);
        };
        self.get_mut(id)?.focused_index = next;
        let child = children[next];
        self.focus(child)?;
        Ok(Some(child))
    }

    /// Make `child` the focused child of its parent without moving focus.
    pub fn set_focused_child(&mut self, parent: ControllerId, child: ControllerId) -> Result<bool> {
        let c = self.get_mut(parent)?;
        match c.children.iter().position(|x| *x == child) {
            Some(i) => {
                c.focused_index = i;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enable `id`. Emits [`Event::Dirty`] only when the state changes.
    pub fn enable(&mut self, id: ControllerId) -> Result<bool> {
        self.set_enabled(id, true)
    }

    /// Disable `id`. Emits [`Event::Dirty`] only when the state changes.
    pub fn disable(&mut self, id: ControllerId) -> Result<bool> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&mut self, id: ControllerId, enabled: bool) -> Result<bool> {
        let c = self.get_mut(id)?;
        if c.enabled == enabled {
            return Ok(false);
        }
        c.enabled = enabled;
        self.emit(id, &Event::Dirty);
        Ok(true)
    }

    pub fn select(&mut self, id: ControllerId) -> Result<bool> {
        self.set_selected(id, true)
    }

    pub fn deselect(&mut self, id: ControllerId) -> Result<bool> {
        self.set_selected(id, false)
    }

    fn set_selected(&mut self, id: ControllerId, selected: bool) -> Result<bool> {
        let c = self.get_mut(id)?;
        if c.selected == selected {
            return Ok(false);
        }
        c.selected = selected;
        self.emit(id, &Event::Dirty);
        Ok(true)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
