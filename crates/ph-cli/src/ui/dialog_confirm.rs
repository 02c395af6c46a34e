use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, ConfirmAction};
use crate::ui::detail_panel::status_color;
use crate::ui::layout::popup_rect;

/// Confirmation popup sized to its content. Shows the lease the action
/// targets so the port being given up is visible before answering.
pub fn render(f: &mut Frame, app: &App, message: &str, action: &ConfirmAction) {
    let (title, project) = match action {
        ConfirmAction::Release(project) => (format!(" Release {project} "), project),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::White),
        )),
    ];

    if let Some(lease) = app.leases.iter().find(|l| &l.project_name == project) {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {}", lease.status),
                Style::default().fg(status_color(lease.status)),
            ),
            Span::styled(
                format!("  {}", lease.local_url()),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                format!("  {}", lease.branch),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" [Y]", Style::default().fg(Color::Green)),
        Span::styled("es  ", Style::default().fg(Color::DarkGray)),
        Span::styled("[N]", Style::default().fg(Color::Red)),
        Span::styled("o / Esc", Style::default().fg(Color::DarkGray)),
    ]));

    let content_width = lines.iter().map(Line::width).max().unwrap_or(0) + 1;
    let width = content_width.max(title.chars().count() + 2) + 2;
    let height = lines.len() + 2;
    let area = popup_rect(
        u16::try_from(width).unwrap_or(u16::MAX),
        u16::try_from(height).unwrap_or(u16::MAX),
        f.area(),
    );
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}
