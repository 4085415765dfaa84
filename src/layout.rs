//! Per-frame layout bindings.
//!
//! A [`ControllerLayout`] holds one provider per [`LayoutProp`]. Providers
//! are evaluated against the live [`Ui`] immediately before every paint and
//! their results written to the widget, so positions and colors can follow
//! other controllers, the screen size or the store instead of being fixed at
//! construction.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::controller::{ControllerId, Ui};
use crate::error::Result;
use crate::geometry::PropValue;
use crate::widget::LayoutProp;

/// Computes one property for a controller.
pub type LayoutProvider = Rc<dyn Fn(&Ui, ControllerId) -> PropValue>;

/// The layout providers bound on one controller.
#[derive(Clone, Default)]
pub struct ControllerLayout {
    providers: BTreeMap<LayoutProp, LayoutProvider>,
}

impl ControllerLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the provider for `prop`.
    pub fn bind(&mut self, prop: LayoutProp, provider: impl Fn(&Ui, ControllerId) -> PropValue + 'static) {
        self.providers.insert(prop, Rc::new(provider));
    }

    /// Bind by property name (`"top"`, `"focused-bg"`, ...).
    pub fn bind_named(
        &mut self,
        name: &str,
        provider: impl Fn(&Ui, ControllerId) -> PropValue + 'static,
    ) -> Result<()> {
        self.bind(name.parse()?, provider);
        Ok(())
    }

    /// Remove the provider for `prop`. Returns whether one was bound.
    pub fn unbind(&mut self, prop: LayoutProp) -> bool {
        self.providers.remove(&prop).is_some()
    }

    pub fn is_bound(&self, prop: LayoutProp) -> bool {
        self.providers.contains_key(&prop)
    }

    /// Bound properties, in declaration order.
    pub fn props(&self) -> impl Iterator<Item = LayoutProp> + '_ {
        self.providers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run every provider for `id`.
    pub fn evaluate(&self, ui: &Ui, id: ControllerId) -> Vec<(LayoutProp, PropValue)> {
        self.providers
            .iter()
            .map(|(prop, provider)| (*prop, provider(ui, id)))
            .collect()
    }
}

impl fmt::Debug for ControllerLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.providers.keys()).finish()
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Always `value`.
pub fn fixed(value: impl Into<PropValue>) -> impl Fn(&Ui, ControllerId) -> PropValue + 'static {
    let value = value.into();
    move |_, _| value.clone()
}

/// A `top` that places the controller `gap` rows below `other`, measured in
/// the controller's parent's coordinates.
pub fn below(other: ControllerId, gap: i32) -> impl Fn(&Ui, ControllerId) -> PropValue + 'static {
    move |ui, id| {
        let Ok(anchor) = ui.region(other) else {
            return PropValue::Unset;
        };
        let origin = ui
            .parent(id)
            .and_then(|p| ui.region(p).ok())
            .map_or(0, |r| r.y);
        PropValue::Cells(anchor.bottom() - origin + gap)
    }
}

/// Track the screen: `percent` of its width, plus `offset` cells.
pub fn screen_width(percent: u16, offset: i32) -> impl Fn(&Ui, ControllerId) -> PropValue + 'static {
    move |ui, _| PropValue::Cells(ui.screen_size().width * i32::from(percent) / 100 + offset)
}

// ===========================================================================
// Tests
// ===========================================================================
