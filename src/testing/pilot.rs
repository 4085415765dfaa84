//! Pilot: programmatic interaction with a headless Application.
//!
//! The `Pilot` owns an [`Application`] over a
//! [`HeadlessBackend`](crate::widget::HeadlessBackend) and offers the input
//! side of a terminal session (key presses, typing, paste, resize) plus the
//! output side (the last painted frame as text, the store, the legend).
//! Every input is processed to completion and repainted before the call
//! returns.

use serde_json::Value;

use crate::app::{AppConfig, Application};
use crate::controller::{ChildSpec, ControllerId};
use crate::error::Result;
use crate::event::{InputEvent, KeyPress};
use crate::legend::{render_legend_categories, RenderOptions};
use crate::store::Store;
use crate::widget::HeadlessBackend;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless application driver for tests.
///
/// # Examples
///
/// ```ignore
/// use serde_json::json;
/// use trellis_tui::components::Checkbox;
/// use trellis_tui::testing::Pilot;
///
/// let mut pilot = Pilot::headless(40, 5, Checkbox::new("Dark mode", "dark"), json!({"dark": false}))?;
/// pilot.press("space")?;
/// assert_eq!(pilot.store().get("dark"), Some(json!(true)));
/// assert_eq!(pilot.screen(), "[x] Dark mode");
/// ```
pub struct Pilot {
    app: Application,
}

impl Pilot {
    /// Wrap an existing application and paint its first frame.
    pub fn new(mut app: Application) -> Result<Self> {
        app.render()?;
        Ok(Self { app })
    }

    /// Build a headless application of `width` x `height` with default
    /// configuration.
    pub fn headless(width: u16, height: u16, root: impl Into<ChildSpec>, model: Value) -> Result<Self> {
        Self::with_config(width, height, root, model, AppConfig::default())
    }

    pub fn with_config(
        width: u16,
        height: u16,
        root: impl Into<ChildSpec>,
        model: Value,
        config: AppConfig,
    ) -> Result<Self> {
        Self::new(Application::headless(width, height, root, model, config)?)
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Press the key named `key` (`"enter"`, `"S-tab"`, `"q"`).
    pub fn press(&mut self, key: &str) -> Result<()> {
        self.app.handle_input(InputEvent::Key(KeyPress::parse(key)))
    }

    /// Press each key in turn.
    pub fn press_all(&mut self, keys: &[&str]) -> Result<()> {
        keys.iter().try_for_each(|key| self.press(key))
    }

    pub fn press_char(&mut self, ch: char) -> Result<()> {
        self.app.handle_input(InputEvent::Key(KeyPress::char(ch)))
    }

    /// Type `text` one character at a time.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        text.chars().try_for_each(|ch| self.press_char(ch))
    }

    /// Deliver `text` as a single paste.
    pub fn paste(&mut self, text: &str) -> Result<()> {
        self.app.handle_input(InputEvent::Paste(text.to_owned()))
    }

    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.app.handle_input(InputEvent::Resize { width, height })
    }

    // ── Processing ───────────────────────────────────────────────────

    /// Apply queued deferred messages, then repaint if anything changed.
    /// Returns how many messages were applied.
    pub fn pump(&mut self) -> Result<usize> {
        let applied = self.app.pump_deferred();
        if self.app.is_dirty() {
            self.app.render()?;
        }
        Ok(applied)
    }

    // ── Query ────────────────────────────────────────────────────────

    /// The last painted frame, one line per row, trailing blanks trimmed.
    pub fn screen(&self) -> String {
        self.headless_backend().map(HeadlessBackend::screen_text).unwrap_or_default()
    }

    /// Row `y` of the last painted frame.
    pub fn line(&self, y: usize) -> String {
        self.screen().lines().nth(y).unwrap_or_default().to_owned()
    }

    /// How many frames have been painted.
    pub fn frames(&self) -> usize {
        self.headless_backend().map_or(0, HeadlessBackend::render_count)
    }

    pub fn store(&self) -> &Store {
        self.app.store()
    }

    /// The controller currently receiving keys.
    pub fn active(&self) -> ControllerId {
        self.app.active()
    }

    /// The active controller's legend rendered on one line, unculled.
    pub fn legend_text(&self) -> Result<String> {
        let legend = self.app.legend()?;
        Ok(render_legend_categories(&legend, &RenderOptions::default()).text)
    }

    pub fn is_running(&self) -> bool {
        !self.app.should_quit()
    }

    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut Application {
        &mut self.app
    }

    fn headless_backend(&self) -> Option<&HeadlessBackend> {
        self.app.ui().backend_as::<HeadlessBackend>()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
