//! Rendering pipeline: cells, frame canvas, terminal driver.

pub mod canvas;
pub mod cell;
pub mod driver;

pub use canvas::{Canvas, CellUpdate};
pub use cell::{Cell, CellStyle};
pub use driver::{parse_color, Driver};
