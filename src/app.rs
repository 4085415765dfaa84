//! Application root: input routing, action table, render cycle and the
//! deferred-message channel.
//!
//! [`Application`] owns the [`Ui`] and one root controller. Key presses are
//! resolved against the active key map (the controller that most recently
//! reported focus). Events that bubble past the root land in the outbox and
//! are handled here: `Focus` switches the active controller, `Action` runs
//! the action table, `Log` forwards to `tracing`. The `headless` constructor
//! allows testing without a real terminal.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::EventStream;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

use crate::controller::{ChildDescriptor, ChildSpec, ControllerId, Ui};
use crate::error::Result;
use crate::event::{Action, Event, InputEvent, KeyPress, LogLevel};
use crate::geometry::Size;
use crate::legend::{generate_keystroke_legend, Legend, LegendOptions};
use crate::store::{Store, StorePath};
use crate::theme::{ColorMode, Theme};
use crate::widget::{Backend, HeadlessBackend};

/// Handler in the application's action table.
pub type ActionHandler = Rc<dyn Fn(&mut Application, &Action) -> Result<()>>;

/// Action names handled by the application itself.
pub const BUILTIN_ACTIONS: [&str; 2] = ["open-modal", "quit"];

// ---------------------------------------------------------------------------
// Deferred
// ---------------------------------------------------------------------------

/// Work reported back to the UI thread by a task started from an action.
#[derive(Debug, Clone)]
pub enum Deferred {
    /// Write the default store.
    Set { path: StorePath, value: Value },
    /// Run an action as if it had bubbled to the root.
    Dispatch(Action),
    Log { level: LogLevel, message: String },
}

impl Deferred {
    pub fn set(path: impl Into<StorePath>, value: Value) -> Self {
        Deferred::Set { path: path.into(), value }
    }
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Optional window/app title.
    pub title: Option<String>,
    pub color_mode: ColorMode,
    /// Defaults to [`Theme::builtin`].
    pub theme: Option<Theme>,
    /// Target frames per second for the render loop.
    pub fps: u32,
    /// Options for [`Application::legend`].
    pub legend: LegendOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: None,
            color_mode: ColorMode::default(),
            theme: None,
            fps: 30,
            legend: LegendOptions::new().with_default_symbols(),
        }
    }
}

impl AppConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title (builder).
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Set the target FPS (builder).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn with_legend(mut self, legend: LegendOptions) -> Self {
        self.legend = legend;
        self
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// The application root.
pub struct Application {
    ui: Ui,
    root: ControllerId,
    actions: HashMap<String, ActionHandler>,
    config: AppConfig,
    tx: UnboundedSender<Deferred>,
    rx: UnboundedReceiver<Deferred>,
    dirty: bool,
}

impl Application {
    /// Build the application over `backend` with `root` as the top-level
    /// controller and `model` as the initial store contents.
    pub fn new(backend: Box<dyn Backend>, root: impl Into<ChildSpec>, model: Value, config: AppConfig) -> Result<Self> {
        Self::with_actions(backend, root, model, config, Vec::new())
    }

    /// Like [`Application::new`], with extra action handlers. Handlers named
    /// like a built-in action are ignored.
    pub fn with_actions(
        backend: Box<dyn Backend>,
        root: impl Into<ChildSpec>,
        model: Value,
        config: AppConfig,
        actions: impl IntoIterator<Item = (String, ActionHandler)>,
    ) -> Result<Self> {
        let mut ui = Ui::with_store(backend, Store::new(model));
        ui.set_color_mode(config.color_mode);
        if let Some(theme) = &config.theme {
            ui.set_theme(Rc::new(theme.clone()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        ui.set_deferred(tx.clone());

        let mut table: HashMap<String, ActionHandler> = HashMap::new();
        table.insert("open-modal".to_owned(), Rc::new(open_modal));
        table.insert("quit".to_owned(), Rc::new(|app: &mut Application, _: &Action| -> Result<()> {
            app.quit();
            Ok(())
        }));
        for (name, handler) in actions {
            if BUILTIN_ACTIONS.contains(&name.as_str()) {
                warn!(action = %name, "built-in action cannot be overridden");
                continue;
            }
            table.insert(name, handler);
        }

        let root = ui.create_root(root, None)?;
        ui.set_active_controller(root);
        let mut app = Self { ui, root, actions: table, config, tx, rx, dirty: true };
        app.ui.focus(root)?;
        app.process();
        Ok(app)
    }

    /// An application over a [`HeadlessBackend`] of `width` x `height`.
    pub fn headless(width: u16, height: u16, root: impl Into<ChildSpec>, model: Value, config: AppConfig) -> Result<Self> {
        Self::new(Box::new(HeadlessBackend::new(width, height)), root, model, config)
    }

    // -- Accessors ----------------------------------------------------------

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    /// The application-wide store.
    pub fn store(&self) -> &Store {
        self.ui.default_store()
    }

    pub fn root(&self) -> ControllerId {
        self.root
    }

    /// The controller whose key map receives input.
    pub fn active(&self) -> ControllerId {
        self.ui.active_controller().unwrap_or(self.root)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// A sender for [`Deferred`] messages, for tasks started by actions.
    pub fn deferred_sender(&self) -> UnboundedSender<Deferred> {
        self.tx.clone()
    }

    /// Whether an action is registered under `name`.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Whether the app should quit.
    pub fn should_quit(&self) -> bool {
        self.ui.quit_requested()
    }

    /// Request the app to quit.
    pub fn quit(&mut self) {
        self.ui.request_quit();
    }

    /// Whether a repaint is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // -- Input --------------------------------------------------------------

    /// Handle one input event completely: key handler, bubbled events,
    /// repaint.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::Key(key) => {
                self.handle_key(&key);
            }
            InputEvent::Resize { width, height } => {
                self.ui.resize(Size::new(i32::from(width), i32::from(height)));
            }
            InputEvent::Paste(text) => {
                for ch in text.chars() {
                    self.handle_key(&KeyPress::char(ch));
                    self.process();
                }
            }
        }
        self.process();
        if self.dirty {
            self.render()?;
        }
        Ok(())
    }

    /// Resolve `key` against the active key map and run the handler against
    /// the binding's owner. Returns whether a binding matched.
    pub fn handle_key(&mut self, key: &KeyPress) -> bool {
        let active = self.active();
        let Some(binding) = self.ui.resolve_key(active, key) else {
            trace!(key = %key.full, "unbound key");
            return false;
        };
        let owner = binding.owner.filter(|o| self.ui.contains(*o)).unwrap_or(active);
        if let Err(err) = (binding.handler)(&mut self.ui, owner, key) {
            warn!(key = %key.full, %err, "key handler failed");
        }
        true
    }

    // -- Events -------------------------------------------------------------

    /// Drain store watchers and the outbox until both are empty, then make
    /// sure focus and the active controller point at live controllers.
    pub fn process(&mut self) {
        loop {
            self.ui.flush_watchers();
            let Some(event) = self.ui.next_outbox_event() else { break };
            self.handle_event(event);
        }
        self.ensure_focus();
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Dirty => self.dirty = true,
            Event::Focus { target } => {
                if self.ui.contains(target) && self.ui.active_controller() != Some(target) {
                    debug!(?target, "active key map switched");
                    self.ui.set_active_controller(target);
                }
            }
            Event::Log { level, message } => forward_log(level, &message),
            Event::Action(action) => self.run_action(&action),
            Event::Launch { target } => {
                if self.has_action("launch") {
                    self.run_action(&Action::with_payload("launch", target));
                } else {
                    debug!("launch requested but no launch action registered");
                }
            }
            Event::Destroy { target } => {
                if self.ui.roots().contains(&target) && target != self.root {
                    if let Err(err) = self.ui.destroy(target) {
                        warn!(?target, %err, "failed to destroy top-level controller");
                    }
                }
            }
            _ => {}
        }
    }

    /// Run the handler registered for `action`. Unknown names are ignored.
    pub fn run_action(&mut self, action: &Action) {
        let Some(handler) = self.actions.get(action.name()).cloned() else {
            debug!(action = %action.name(), "no handler for action");
            return;
        };
        if let Err(err) = handler(self, action) {
            warn!(action = %action.name(), %err, "action failed");
        }
    }

    fn ensure_focus(&mut self) {
        if self.ui.active_controller().is_none() {
            debug!("active controller gone, falling back to root");
            self.ui.set_active_controller(self.root);
        }
        if self.ui.focused_controller().is_none() {
            let active = self.active();
            if let Err(err) = self.ui.focus(active) {
                warn!(%err, "could not restore focus");
            }
            // Focus events raised above only need the active switch.
            while let Some(event) = self.ui.next_outbox_event() {
                self.handle_event(event);
            }
        }
    }

    // -- Deferred -----------------------------------------------------------

    /// Apply every queued [`Deferred`] message in arrival order, then
    /// process the resulting events. Returns how many were applied.
    pub fn pump_deferred(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.apply_deferred(message);
            applied += 1;
        }
        if applied > 0 {
            self.process();
        }
        applied
    }

    fn apply_deferred(&mut self, message: Deferred) {
        match message {
            Deferred::Set { path, value } => self.ui.set(path, value),
            Deferred::Dispatch(action) => self.run_action(&action),
            Deferred::Log { level, message } => forward_log(level, &message),
        }
    }

    // -- Rendering ----------------------------------------------------------

    /// Repaint every controller.
    pub fn render(&mut self) -> Result<()> {
        self.ui.render()?;
        self.dirty = false;
        Ok(())
    }

    /// The legend for the active controller.
    pub fn legend(&self) -> Result<Legend> {
        generate_keystroke_legend(&self.ui, self.active(), &self.config.legend)
    }

    /// Drive the application from the terminal until an action quits.
    ///
    /// Key events, deferred messages and the frame ticker are multiplexed;
    /// each input event is fully processed before the next is read.
    pub async fn run(&mut self) -> Result<()> {
        let mut input = EventStream::new();
        let mut ticker = tokio::time::interval(self.config.frame_interval());
        self.render()?;

        while !self.should_quit() {
            tokio::select! {
                next = input.next() => match next {
                    Some(Ok(event)) => {
                        if let Some(event) = InputEvent::from_crossterm(event) {
                            self.handle_input(event)?;
                        }
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
                Some(message) = self.rx.recv() => {
                    self.apply_deferred(message);
                    self.process();
                }
                _ = ticker.tick() => {
                    if self.dirty {
                        self.render()?;
                    }
                }
            }
        }
        info!("application stopped");
        Ok(())
    }
}

fn forward_log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Trace => trace!(target: "trellis::app", "{message}"),
        LogLevel::Debug => debug!(target: "trellis::app", "{message}"),
        LogLevel::Info => info!(target: "trellis::app", "{message}"),
        LogLevel::Warn => warn!(target: "trellis::app", "{message}"),
        LogLevel::Error => tracing::error!(target: "trellis::app", "{message}"),
    }
}

/// Built-in `"open-modal"`: build the requested component as a new
/// top-level controller, focus it, and hand focus back to the requester
/// (or the root) when it is destroyed.
fn open_modal(app: &mut Application, action: &Action) -> Result<()> {
    let Action::OpenModal(request) = action else {
        debug!("open-modal without a modal request");
        return Ok(());
    };
    let mut descriptor = ChildDescriptor::new_boxed((request.component)()).with_style(request.style.clone());
    if let Some(model) = &request.model {
        descriptor = descriptor.with_model(model.clone());
    }

    let modal = app.ui.create_root(descriptor, None)?;
    let root = app.root;
    let requester = request.requester;
    app.ui.hook(modal, move |ui, event| {
        if !matches!(event, Event::Destroyed { .. }) {
            return;
        }
        let target = requester.filter(|r| ui.contains(*r)).unwrap_or(root);
        if let Err(err) = ui.focus(target) {
            warn!(%err, "could not restore focus after modal");
        }
    })?;
    app.ui.focus(modal)?;
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
