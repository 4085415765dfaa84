//! Terminal cells and their resolved style.

use crate::geometry::Appearance;

// ---------------------------------------------------------------------------
// CellStyle
// ---------------------------------------------------------------------------

/// Fully resolved visual style for one cell. Colors are kept as strings and
/// parsed by the driver (named colors or `#rrggbb`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub underline: bool,
    pub reverse: bool,
}

impl CellStyle {
    /// Flatten an [`Appearance`]; unset flags become `false`.
    pub fn from_appearance(appearance: &Appearance) -> Self {
        CellStyle {
            fg: appearance.fg.clone(),
            bg: appearance.bg.clone(),
            bold: appearance.bold.unwrap_or(false),
            underline: appearance.underline.unwrap_or(false),
            reverse: appearance.inverse.unwrap_or(false),
        }
    }

    /// The same style with reverse video toggled.
    pub fn inverted(&self) -> Self {
        CellStyle { reverse: !self.reverse, ..self.clone() }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One character with its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(ch: char, style: CellStyle) -> Self {
        Self { ch, style }
    }

    /// A space with the given style.
    pub fn blank(style: CellStyle) -> Self {
        Self { ch: ' ', style }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(CellStyle::default())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_appearance_flattens_flags() {
        let a = Appearance::new().with_fg("red").with_bold(true);
        let s = CellStyle::from_appearance(&a);
        assert_eq!(s.fg.as_deref(), Some("red"));
        assert!(s.bold);
        assert!(!s.underline);
        assert!(!s.reverse);
    }

    #[test]
    fn inverted_toggles_reverse() {
        let s = CellStyle::from_appearance(&Appearance::new().with_inverse(true));
        assert!(!s.inverted().reverse);
        assert!(CellStyle::default().inverted().reverse);
    }

    #[test]
    fn default_cell_is_blank() {
        assert_eq!(Cell::default().ch, ' ');
    }
}
