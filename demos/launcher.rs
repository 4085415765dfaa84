//! A project launcher: pick a component, launch it, watch its status.
//!
//! Run with `cargo run --example launcher`. Set `TRELLIS_LOG=debug` to write
//! a trace to `trellis.log` in the working directory.

use std::fs::File;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

use trellis_tui::app::{ActionHandler, AppConfig, Application, Deferred};
use trellis_tui::components::{Checkbox, Container, KeyLegendBar, Label, ListView, Modal};
use trellis_tui::event::{Action, KeyBinding, LogLevel, ModalRequest};
use trellis_tui::geometry::StyleOptions;
use trellis_tui::legend::{LegendOptions, RenderOptions};
use trellis_tui::widget::TerminalBackend;
use trellis_tui::{Component, ControllerId, Result, Ui};

/// The launcher screen: title, component list, options, status line and
/// key legend.
struct Launcher;

impl Component for Launcher {
    fn name(&self) -> &str {
        "container"
    }

    fn mount(&self, ui: &mut Ui, id: ControllerId) -> Result<()> {
        ui.bind_key(
            id,
            "q",
            KeyBinding::new(|ui, id, _| ui.dispatch(id, Action::named("quit")))
                .with_propagate(true)
                .with_legend("Quit")
                .with_category("app")
                .with_priority(10),
        )?;
        ui.bind_key(
            id,
            "?",
            KeyBinding::new(|ui, id, _| {
                let mut request = ModalRequest::new(|| {
                    Box::new(
                        Modal::new("Help", "enter launches the selected component\nspace toggles watch mode")
                            .with_button("Close", Action::named("help-closed")),
                    )
                });
                if let Some(requester) = ui.focused_controller() {
                    request = request.with_requester(requester);
                }
                ui.dispatch(id, Action::OpenModal(request))
            })
            .with_propagate(true)
            .with_legend("Help")
            .with_category("app")
            .with_priority(5),
        )?;

        let body = Container::new()
            .stacked(1)
            .with_navigation()
            .with_child(|| Box::new(ListView::new("apps").launching()), None)
            .with_child(|| Box::new(Checkbox::new("Watch mode", "options.watch")), None);
        ui.add_child(id, Label::new("trellis launcher"), Some(StyleOptions::new().top(0).left(1)))?;
        let body = ui.add_child(id, body, Some(StyleOptions::new().top(2).left(2).right(2).bottom(3)))?;
        ui.set_focused_child(id, body)?;
        ui.add_child(id, Label::bound("status"), Some(StyleOptions::new().bottom(1).left(1)))?;
        ui.add_child(
            id,
            KeyLegendBar::new(
                LegendOptions::new().with_default_symbols(),
                RenderOptions::new().with_category_limit("app", 24usize),
            ),
            None,
        )?;
        Ok(())
    }
}

/// Pretend to start the selected component on a background task, reporting
/// progress through the deferred channel.
fn launch(app: &mut Application, action: &Action) -> Result<()> {
    let name = action
        .payload()
        .and_then(|v| v.get("name").or(Some(v)))
        .and_then(Value::as_str)
        .unwrap_or("component")
        .to_owned();
    let watch = app.store().get("options.watch").and_then(|v| v.as_bool()).unwrap_or(false);
    let tx = app.deferred_sender();

    tokio::task::spawn_local(async move {
        let _ = tx.send(Deferred::set("status", json!(format!("starting {name}..."))));
        tokio::time::sleep(Duration::from_millis(400)).await;
        let mode = if watch { " (watching)" } else { "" };
        let _ = tx.send(Deferred::set("status", json!(format!("{name} running{mode}"))));
        let _ = tx.send(Deferred::Log { level: LogLevel::Info, message: format!("launched {name}") });
    });
    Ok(())
}

fn init_logging() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let Ok(filter) = std::env::var("TRELLIS_LOG") else {
        return Ok(());
    };
    let file = File::create("trellis.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let model = json!({
        "apps": [
            {"name": "web", "label": "web      frontend"},
            {"name": "api", "label": "api      http service"},
            {"name": "worker", "label": "worker   job runner"},
        ],
        "options": {"watch": false},
        "status": "ready",
    });
    let config = AppConfig::new().with_title("trellis launcher").with_fps(30);
    let actions: Vec<(String, ActionHandler)> = vec![("launch".to_owned(), Rc::new(launch))];

    let backend = TerminalBackend::new()?;
    let mut app = Application::with_actions(Box::new(backend), Launcher, model, config, actions)?;

    LocalSet::new().run_until(app.run()).await?;
    Ok(())
}
