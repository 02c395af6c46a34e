use std::io;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use ph_core::Registry;

use crate::app::App;
use crate::event::{spawn_input_task, spawn_tick_task, AppEvent};
use crate::keys;
use crate::ui;

use super::Context;

/// Live view of the ledger. Every tick re-reads the file, so changes made by
/// other `protohost` processes show up within two seconds.
pub async fn run(ctx: &Context) -> Result<()> {
    let registry = Arc::new(ctx.registry()?);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let _input_task = spawn_input_task(event_tx.clone());
    let _tick_task = spawn_tick_task(event_tx.clone());

    let mut app = App::new();
    app.registry_path = registry.ledger().path().display().to_string();
    refresh(&mut app, &registry).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| ui::render(f, &app, None))?;

        if let Ok(event) = event_rx.try_recv() {
            process_event(&mut app, event, &registry, &event_tx).await;
        } else {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

pub async fn process_event(
    app: &mut App,
    event: AppEvent,
    registry: &Arc<Registry>,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match event {
        AppEvent::Key(key) => keys::handle_key(app, key, registry, event_tx),
        AppEvent::Tick => refresh(app, registry).await,
        AppEvent::Info(msg) | AppEvent::Error(msg) => {
            app.set_status(msg);
            refresh(app, registry).await;
        }
    }
}

pub async fn refresh(app: &mut App, registry: &Registry) {
    match registry.list().await {
        Ok(leases) => app.set_leases(leases),
        Err(e) => app.set_status(format!("Error: {e}")),
    }
}
