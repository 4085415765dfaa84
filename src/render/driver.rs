//! Crossterm output: terminal mode switching and cell-update emission.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::canvas::CellUpdate;
use super::cell::CellStyle;

/// Buffered crossterm writer over stdout.
pub struct Driver {
    writer: BufWriter<Stdout>,
    active: bool,
}

impl Driver {
    pub fn new() -> Self {
        Self { writer: BufWriter::new(io::stdout()), active: false }
    }

    /// Enter the alternate screen in raw mode with the cursor hidden.
    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.writer, EnterAlternateScreen, cursor::Hide)?;
        self.active = true;
        Ok(())
    }

    /// Restore the terminal. Safe to call more than once.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.writer, cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Queue `updates`; call [`Driver::flush`] to send them.
    pub fn apply(&mut self, updates: &[CellUpdate]) -> io::Result<()> {
        for update in updates {
            queue!(self.writer, cursor::MoveTo(update.x, update.y))?;
            self.queue_style(&update.cell.style)?;
            queue!(self.writer, Print(update.cell.ch), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Current terminal size as (columns, rows).
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn queue_style(&mut self, style: &CellStyle) -> io::Result<()> {
        if let Some(color) = style.fg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetForegroundColor(color))?;
        }
        if let Some(color) = style.bg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetBackgroundColor(color))?;
        }
        for (on, attr) in [
            (style.bold, Attribute::Bold),
            (style.underline, Attribute::Underlined),
            (style.reverse, Attribute::Reverse),
        ] {
            if on {
                queue!(self.writer, SetAttribute(attr))?;
            }
        }
        Ok(())
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ---------------------------------------------------------------------------
// Color parsing
// ---------------------------------------------------------------------------

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("grey", Color::Grey),
    ("gray", Color::Grey),
    ("darkred", Color::DarkRed),
    ("darkgreen", Color::DarkGreen),
    ("darkyellow", Color::DarkYellow),
    ("darkblue", Color::DarkBlue),
    ("darkmagenta", Color::DarkMagenta),
    ("darkcyan", Color::DarkCyan),
    ("darkgrey", Color::DarkGrey),
    ("darkgray", Color::DarkGrey),
];

/// Parse `#rrggbb`, `#rgb`, or a named color (case-insensitive; `_` and `-`
/// separators ignored, so `dark_blue` and `dark-blue` both work).
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
        return match hex.len() {
            6 => Some(Color::Rgb { r: channel(0, 2)?, g: channel(2, 2)?, b: channel(4, 2)? }),
            3 => {
                let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
                Some(Color::Rgb { r: r * 17, g: g * 17, b: b * 17 })
            }
            _ => None,
        };
    }
    let name: String = s
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    NAMED_COLORS.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

// ===========================================================================
// Tests
// ===========================================================================
