//! # trellis-tui
//!
//! A reactive controller framework for terminal user interfaces.
//!
//! An application is a tree of controllers. Each controller owns one
//! backend widget, a slice of a shared JSON model, a key map and a table of
//! event handlers. Events emitted by a controller flow to its parent; a
//! fixed set of kinds bubbles all the way to the [`Application`], which
//! turns them into repaints, focus changes and named actions. Key legends
//! are derived from the active controller's effective key map and culled to
//! fit the available width.
//!
//! ## Core Systems
//!
//! - **[`controller`]**: the controller arena ([`Ui`]), composition, focus, bubbling
//! - **[`event`]**: input normalization, key maps, the controller event union
//! - **[`store`]**: the shared JSON model with path subscriptions
//! - **[`layout`]**: computed layout properties evaluated each frame
//! - **[`theme`]**: per-component appearance with color-mode and state overrides
//! - **[`legend`]**: key legend generation and width culling
//! - **[`widget`]**: the backend contract plus headless and terminal backends
//! - **[`render`]**: cell canvas and crossterm driver
//! - **[`components`]**: built-in components
//! - **[`app`]**: the application root and run loop
//! - **[`testing`]**: the headless [`Pilot`](testing::Pilot)

// Foundation
pub mod error;
pub mod geometry;
pub mod store;

// Controller tree
pub mod controller;
pub mod event;
pub mod layout;
pub mod theme;

// Output
pub mod render;
pub mod widget;

// Legends and components
pub mod components;
pub mod legend;

// Application
pub mod app;
pub mod testing;

pub use app::{AppConfig, Application, Deferred};
pub use controller::{ChildDescriptor, Component, ControllerId, Ui};
pub use error::{Result, UiError};
pub use event::{Action, Event, EventKind, KeyBinding, KeyPress};
pub use store::{Store, StorePath};
