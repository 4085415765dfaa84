//! Raw input types wrapping crossterm for decoupling.
//!
//! Key presses are normalized to [`KeyPress`]: the produced character (if
//! any) plus a full key identifier following the `[C-][M-][S-]name`
//! convention (`"a"`, `"enter"`, `"S-up"`, `"C-c"`). Key maps match on that
//! identifier, so the rest of the framework never depends on crossterm.

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};

// ---------------------------------------------------------------------------
// KeyPress
// ---------------------------------------------------------------------------

/// A normalized key press.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPress {
    /// The character the key produced, if any. Named keys and
    /// control/meta chords produce none.
    pub ch: Option<char>,
    /// The full key identifier, e.g. `"S-up"`.
    pub full: String,
}

impl KeyPress {
    /// Build a key press from its identifier.
    ///
    /// Single-character identifiers produce that character; `"space"`
    /// produces `' '`; everything else produces none.
    pub fn parse(full: &str) -> Self {
        let mut chars = full.chars();
        let ch = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ if full == "space" => Some(' '),
            _ => None,
        };
        Self { ch, full: full.to_owned() }
    }

    /// A key press producing `c`. A space is identified as `"space"`, the
    /// same as a terminal would report it.
    pub fn char(c: char) -> Self {
        let full = if c == ' ' { "space".to_owned() } else { c.to_string() };
        Self { ch: Some(c), full }
    }

    /// Convert a crossterm key event. Key releases and unsupported codes
    /// return `None`.
    pub fn from_crossterm(ct: crossterm::event::KeyEvent) -> Option<Self> {
        if ct.kind == KeyEventKind::Release {
            return None;
        }

        let ctrl = ct.modifiers.contains(KeyModifiers::CONTROL);
        let alt = ct.modifiers.contains(KeyModifiers::ALT);
        let shift = ct.modifiers.contains(KeyModifiers::SHIFT);

        let (name, produced) = match ct.code {
            KeyCode::Char(' ') => ("space".to_owned(), Some(' ')),
            KeyCode::Char(c) => (c.to_string(), Some(c)),
            KeyCode::Enter => ("enter".to_owned(), None),
            KeyCode::Esc => ("escape".to_owned(), None),
            KeyCode::Tab => ("tab".to_owned(), None),
            KeyCode::BackTab => return Some(Self { ch: None, full: "S-tab".to_owned() }),
            KeyCode::Backspace => ("backspace".to_owned(), None),
            KeyCode::Delete => ("delete".to_owned(), None),
            KeyCode::Insert => ("insert".to_owned(), None),
            KeyCode::Left => ("left".to_owned(), None),
            KeyCode::Right => ("right".to_owned(), None),
            KeyCode::Up => ("up".to_owned(), None),
            KeyCode::Down => ("down".to_owned(), None),
            KeyCode::Home => ("home".to_owned(), None),
            KeyCode::End => ("end".to_owned(), None),
            KeyCode::PageUp => ("pageup".to_owned(), None),
            KeyCode::PageDown => ("pagedown".to_owned(), None),
            KeyCode::F(n) => (format!("f{n}"), None),
            _ => return None,
        };

        let mut full = String::new();
        if ctrl {
            full.push_str("C-");
        }
        if alt {
            full.push_str("M-");
        }
        // Shift on a character is already reflected in the character itself.
        if shift && produced.is_none_or(|c| c == ' ') {
            full.push_str("S-");
        }
        full.push_str(&name);

        let ch = if ctrl || alt { None } else { produced };
        Some(Self { ch, full })
    }
}

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// Top-level input event delivered to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyPress),
    Resize { width: u16, height: u16 },
    Paste(String),
}

impl InputEvent {
    /// Convert a crossterm event. Mouse and focus events are not routed.
    pub fn from_crossterm(event: crossterm::event::Event) -> Option<Self> {
        match event {
            crossterm::event::Event::Key(ke) => KeyPress::from_crossterm(ke).map(InputEvent::Key),
            crossterm::event::Event::Resize(width, height) => {
                Some(InputEvent::Resize { width, height })
            }
            crossterm::event::Event::Paste(text) => Some(InputEvent::Paste(text)),
            _ => None,
        }
    }
}

impl From<KeyPress> for InputEvent {
    fn from(key: KeyPress) -> Self {
        InputEvent::Key(key)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{Event, KeyEvent, KeyEventState};

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyPress> {
        KeyPress::from_crossterm(KeyEvent::new(code, modifiers))
    }

    // ── KeyPress::parse ──────────────────────────────────────────────

    #[test]
    fn parse_single_char() {
        assert_eq!(KeyPress::parse("j"), KeyPress { ch: Some('j'), full: "j".into() });
    }

    #[test]
    fn parse_named_has_no_char() {
        assert_eq!(KeyPress::parse("S-up").ch, None);
        assert_eq!(KeyPress::parse("enter").ch, None);
        assert_eq!(KeyPress::parse("space").ch, Some(' '));
    }

    #[test]
    fn typed_space_matches_named_space() {
        assert_eq!(KeyPress::char(' '), KeyPress::parse("space"));
    }

    // ── from_crossterm ───────────────────────────────────────────────

    #[test]
    fn plain_char() {
        let k = press(KeyCode::Char('x'), KeyModifiers::NONE).unwrap();
        assert_eq!(k, KeyPress::char('x'));
    }

    #[test]
    fn shifted_char_keeps_case_without_prefix() {
        let k = press(KeyCode::Char('A'), KeyModifiers::SHIFT).unwrap();
        assert_eq!(k.full, "A");
        assert_eq!(k.ch, Some('A'));
    }

    #[test]
    fn shift_arrow() {
        let k = press(KeyCode::Up, KeyModifiers::SHIFT).unwrap();
        assert_eq!(k.full, "S-up");
        assert_eq!(k.ch, None);
    }

    #[test]
    fn ctrl_char_has_no_produced_char() {
        let k = press(KeyCode::Char('c'), KeyModifiers::CONTROL).unwrap();
        assert_eq!(k.full, "C-c");
        assert_eq!(k.ch, None);
    }

    #[test]
    fn modifier_prefix_order() {
        let k = press(KeyCode::Left, KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT)
            .unwrap();
        assert_eq!(k.full, "C-M-S-left");
    }

    #[test]
    fn named_keys() {
        for (code, name) in [
            (KeyCode::Enter, "enter"),
            (KeyCode::Esc, "escape"),
            (KeyCode::Tab, "tab"),
            (KeyCode::BackTab, "S-tab"),
            (KeyCode::Backspace, "backspace"),
            (KeyCode::PageDown, "pagedown"),
            (KeyCode::F(5), "f5"),
            (KeyCode::Char(' '), "space"),
        ] {
            assert_eq!(press(code, KeyModifiers::NONE).unwrap().full, name);
        }
    }

    #[test]
    fn release_is_dropped() {
        let ev = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(KeyPress::from_crossterm(ev), None);
    }

    // ── InputEvent ───────────────────────────────────────────────────

    #[test]
    fn input_event_conversions() {
        assert_eq!(
            InputEvent::from_crossterm(Event::Resize(120, 40)),
            Some(InputEvent::Resize { width: 120, height: 40 })
        );
        assert_eq!(
            InputEvent::from_crossterm(Event::Paste("hi".into())),
            Some(InputEvent::Paste("hi".into()))
        );
        assert_eq!(InputEvent::from_crossterm(Event::FocusGained), None);
        assert_eq!(
            InputEvent::from_crossterm(Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))),
            Some(InputEvent::Key(KeyPress::parse("enter")))
        );
    }
}
