//! Screen buffer with clipped drawing and frame diffing.
//!
//! A [`Canvas`] is one full frame. Widgets paint into it with [`Canvas::fill`]
//! and [`Canvas::put_str`], both clipped to a region. [`Canvas::diff`]
//! compares two frames and yields only the cells that changed, which is what
//! the driver sends to the terminal.

use super::cell::{Cell, CellStyle};
use crate::geometry::{Region, Size};

/// A single cell that changed between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

/// A full-screen grid of cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    /// A blank canvas of the given dimensions.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    /// A blank canvas covering `size` (negative extents clamp to zero).
    pub fn with_size(size: Size) -> Self {
        let clamp = |n: i32| u16::try_from(n.max(0)).unwrap_or(u16::MAX);
        Self::new(clamp(size.width), clamp(size.height))
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The whole canvas as a region.
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, i32::from(self.width), i32::from(self.height))
    }

    /// The cell at (x, y), if in bounds.
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < usize::from(self.width) && y < usize::from(self.height))
            .then(|| y * usize::from(self.width) + x)
    }

    /// Fill `region` (clipped to `clip` and the canvas) with blanks.
    pub fn fill(&mut self, region: Region, clip: Region, style: &CellStyle) {
        let area = region.intersection(clip).intersection(self.bounds());
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = Cell::blank(style.clone());
                }
            }
        }
    }

    /// Write `text` starting at (x, y), clipped to `clip` and the canvas.
    /// Returns the number of columns consumed, including clipped ones.
    pub fn put_str(&mut self, x: i32, y: i32, text: &str, style: &CellStyle, clip: Region) -> i32 {
        let clip = clip.intersection(self.bounds());
        let mut col = x;
        for ch in text.chars() {
            if clip.contains(col, y) {
                if let Some(i) = self.index(col, y) {
                    self.cells[i] = Cell::new(ch, style.clone());
                }
            }
            col += 1;
        }
        col - x
    }

    /// Cells that differ from `previous`. Cells outside `previous` always count
    /// as changed.
    pub fn diff(&self, previous: &Canvas) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let Some(cell) = self.get(x, y) else { continue };
                if previous.get(x, y) != Some(cell) {
                    updates.push(CellUpdate { x, y, cell: cell.clone() });
                }
            }
        }
        updates
    }

    /// Every cell, as a full-screen update.
    pub fn full_update(&self) -> Vec<CellUpdate> {
        self.diff(&Canvas::new(0, 0))
    }

    /// The characters of row `y` with trailing spaces trimmed.
    pub fn row_text(&self, y: u16) -> String {
        let row: String = (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|cell| cell.ch)
            .collect();
        row.trim_end().to_owned()
    }

    /// The whole frame as text, one line per row, trailing blank rows
    /// dropped.
    pub fn to_text(&self) -> String {
        let mut rows: Vec<String> = (0..self.height).map(|y| self.row_text(y)).collect();
        while rows.last().is_some_and(String::is_empty) {
            rows.pop();
        }
        rows.join("\n")
    }
}

// ===========================================================================
// Tests
// ===========================================================================
