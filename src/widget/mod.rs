//! Widget capability: the backend contract and its two implementations.

pub mod backend;
pub mod headless;
pub mod surface;
pub mod terminal;

pub use backend::{Backend, LayoutProp, WidgetId, WidgetKind};
pub use headless::{BackendCall, HeadlessBackend};
pub use surface::{Surface, WidgetRecord};
pub use terminal::TerminalBackend;
