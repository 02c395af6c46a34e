use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::ui::layout::centered_rect;

pub fn render(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let lines = vec![
        section_header("Leases"),
        key_line("Up/Down j/k", "Move selection"),
        key_line("S", "Mark selected lease stopped"),
        key_line("X", "Release selected port"),
        key_line("R", "Re-read the ledger"),
        key_line("?", "Show this help"),
        key_line("Q / Ctrl+C", "Quit"),
        Line::from(""),
        section_header("Status"),
        status_line("▶", Color::Green, "running"),
        status_line("!", Color::Yellow, "running, past expiry"),
        status_line("■", Color::Yellow, "stopped, port kept"),
        status_line("✗", Color::Red, "expired, awaiting cleanup"),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("    {key:<12}"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc.to_string(), Style::default().fg(Color::White)),
    ])
}

fn status_line(icon: &str, color: Color, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {icon:<12}"), Style::default().fg(color)),
        Span::styled(desc.to_string(), Style::default().fg(Color::White)),
    ])
}
