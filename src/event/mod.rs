//! Event system: raw input, key maps, and the controller event union.

pub mod input;
pub mod keymap;
pub mod message;

pub use input::{InputEvent, KeyPress};
pub use keymap::{resolve_in, KeyBinding, KeyHandler, KeyMap, KeyPattern};
pub use message::{Action, ComponentFactory, Event, EventKind, LogLevel, ModalRequest};
