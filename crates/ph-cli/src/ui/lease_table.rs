use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use ph_core::models::{Lease, LeaseStatus};

use crate::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App, now: DateTime<Utc>) {
    let items: Vec<ListItem> = app
        .leases
        .iter()
        .map(|lease| {
            let line = Line::from(vec![
                Span::raw(" "),
                status_icon(lease, now),
                Span::raw(" "),
                Span::styled(
                    format!("{:<5}", lease.port),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" "),
                Span::styled(
                    truncate(&lease.project_name, 28),
                    Style::default().fg(Color::White),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Leases ({}) ", app.leases.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(0x1A, 0x3A, 0x5C))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !app.leases.is_empty() {
        state.select(Some(app.selected_index));
    }

    f.render_stateful_widget(list, area, &mut state);
}

/// A running lease past its expiry but not yet swept gets a warning marker.
fn status_icon(lease: &Lease, now: DateTime<Utc>) -> Span<'static> {
    match lease.status {
        LeaseStatus::Running if lease.is_past_expiry(now) => {
            Span::styled("!", Style::default().fg(Color::Yellow))
        }
        LeaseStatus::Running => Span::styled("▶", Style::default().fg(Color::Green)),
        LeaseStatus::Stopped => Span::styled("■", Style::default().fg(Color::Yellow)),
        LeaseStatus::Expired => Span::styled("✗", Style::default().fg(Color::Red)),
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
