use chrono::{DateTime, Utc};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use ph_core::models::{Lease, LeaseStatus};
use ph_core::services::status::{Expiry, LeaseView};

use crate::app::App;

pub fn render_with_now(f: &mut Frame, area: Rect, app: &App, now: DateTime<Utc>) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(lease) = app.selected_lease() else {
        let empty = Paragraph::new(" No leases recorded").block(block);
        f.render_widget(empty, area);
        return;
    };

    let lines = build_detail_lines(lease, now);
    let paragraph = Paragraph::new(lines).block(block);
    f.render_widget(paragraph, area);
}

fn build_detail_lines(lease: &Lease, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let view = LeaseView::at(lease.clone(), now);
    let expiry_color = match view.expiry {
        Expiry::In { .. } => Color::White,
        Expiry::Overdue { .. } => Color::Red,
    };

    let mut lines = vec![
        detail_line("Project", &lease.project_name, Color::White),
        detail_line("Branch", &lease.branch, Color::White),
        detail_line("Status", lease.status.as_str(), status_color(lease.status)),
        detail_line("Port", &lease.port.to_string(), Color::Cyan),
        detail_line("URL", &lease.local_url(), Color::Cyan),
        detail_line(
            "Created",
            &lease.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            Color::DarkGray,
        ),
        detail_line("Expires", &view.expiry_label(), expiry_color),
    ];

    if let Some(ref repo) = lease.repo_url {
        lines.push(detail_line("Repo", repo, Color::DarkGray));
    }

    lines
}

fn detail_line(label: &str, value: &str, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {label:<10} "),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(value.to_string(), Style::default().fg(color)),
    ])
}

pub fn status_color(status: LeaseStatus) -> Color {
    match status {
        LeaseStatus::Running => Color::Green,
        LeaseStatus::Stopped => Color::Yellow,
        LeaseStatus::Expired => Color::Red,
    }
}
