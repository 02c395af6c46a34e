pub mod detail_panel;
pub mod dialog_confirm;
pub mod dialog_help;
pub mod layout;
pub mod lease_table;
pub mod status_bar;

use chrono::{DateTime, Utc};
use ratatui::Frame;

use crate::app::{App, Mode};

/// Top-level render dispatch. Pass `now` to pin expiry labels for deterministic output,
/// or `None` to use the current time.
pub fn render(f: &mut Frame, app: &App, now: Option<DateTime<Utc>>) {
    let now = now.unwrap_or_else(Utc::now);
    let chunks = layout::main_layout(f.area());

    layout::render_title(f, chunks[0], app);

    let content_chunks = layout::content_layout(chunks[1]);
    lease_table::render(f, content_chunks[0], app, now);
    detail_panel::render_with_now(f, content_chunks[1], app, now);

    status_bar::render(f, chunks[2], app);

    match &app.mode {
        Mode::ConfirmDialog { message, action } => dialog_confirm::render(f, app, message, action),
        Mode::HelpDialog => dialog_help::render(f),
        Mode::LeaseList => {}
    }
}
