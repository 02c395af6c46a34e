use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use ph_core::Registry;

use crate::app::{App, ConfirmAction, Mode};
use crate::event::AppEvent;

/// Handle a key event, dispatching based on current mode.
pub fn handle_key(
    app: &mut App,
    key: KeyEvent,
    registry: &Arc<Registry>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    tracing::debug!(mode = ?app.mode, key = ?key.code, "handle_key");
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    match &app.mode {
        Mode::LeaseList => handle_lease_list(app, key, registry, event_tx),
        Mode::ConfirmDialog { .. } => handle_confirm_dialog(app, key, registry, event_tx),
        Mode::HelpDialog => handle_help_dialog(app, key),
    }
}

fn handle_lease_list(
    app: &mut App,
    key: KeyEvent,
    registry: &Arc<Registry>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('r') | KeyCode::Char('R') => {
            let _ = event_tx.send(AppEvent::Tick);
        }
        KeyCode::Char('s') | KeyCode::Char('S') => {
            if let Some(lease) = app.selected_lease() {
                stop_lease(lease.project_name.clone(), registry, event_tx);
            }
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            let confirm = app.selected_lease().map(|lease| Mode::ConfirmDialog {
                message: format!(
                    "Release port {} held by '{}'? The next deploy will be a first install.",
                    lease.port, lease.project_name
                ),
                action: ConfirmAction::Release(lease.project_name.clone()),
            });
            if let Some(mode) = confirm {
                app.mode = mode;
            }
        }
        KeyCode::Char('?') => app.mode = Mode::HelpDialog,
        _ => {}
    }
}

fn handle_confirm_dialog(
    app: &mut App,
    key: KeyEvent,
    registry: &Arc<Registry>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            let Mode::ConfirmDialog { action, .. } =
                std::mem::replace(&mut app.mode, Mode::LeaseList)
            else {
                return;
            };
            match action {
                ConfirmAction::Release(project) => release_lease(project, registry, event_tx),
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.mode = Mode::LeaseList;
        }
        _ => {}
    }
}

fn handle_help_dialog(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
        app.mode = Mode::LeaseList;
    }
}

fn stop_lease(
    project: String,
    registry: &Arc<Registry>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let registry = Arc::clone(registry);
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match registry.stop(&project).await {
            Ok(_) => AppEvent::Info(format!("Stopped {project}")),
            Err(e) => AppEvent::Error(format!("Error: stop {project} failed: {e}")),
        };
        let _ = tx.send(event);
    });
}

fn release_lease(
    project: String,
    registry: &Arc<Registry>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let registry = Arc::clone(registry);
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match registry.release(&project).await {
            Ok(Some(lease)) => AppEvent::Info(format!("Released port {} from {project}", lease.port)),
            Ok(None) => AppEvent::Info(format!("{project} was already released")),
            Err(e) => AppEvent::Error(format!("Error: release {project} failed: {e}")),
        };
        let _ = tx.send(event);
    });
}
