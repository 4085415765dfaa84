//! Headless testing support.
//!
//! Use the [`Pilot`] to drive an [`Application`](crate::app::Application)
//! without a real terminal and assert on the painted frame.

pub mod pilot;

pub use pilot::Pilot;
