use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Mode};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    // First line: status message or blank
    let status_line = if let Some(ref msg) = app.status_message {
        let color = if msg.starts_with("Error") || msg.contains("failed") {
            Color::Red
        } else {
            Color::Green
        };
        Line::from(Span::styled(format!(" {msg}"), Style::default().fg(color)))
    } else {
        Line::from("")
    };

    let hints = match app.mode {
        Mode::ConfirmDialog { .. } => Line::from(vec![
            hint("Y", "es"),
            Span::raw(" "),
            hint("N", "o"),
        ]),
        Mode::HelpDialog => Line::from(vec![hint("Esc", "close")]),
        Mode::LeaseList => Line::from(vec![
            hint("j/k", "nav"),
            Span::raw(" "),
            hint("S", "top"),
            Span::raw(" "),
            hint("X", "release"),
            Span::raw(" "),
            hint("R", "efresh"),
            Span::raw(" "),
            hint("?", "help"),
            Span::raw(" "),
            hint("Q", "uit"),
        ]),
    };

    let widget = Paragraph::new(vec![status_line, hints]);
    f.render_widget(widget, area);
}

fn hint(key: &str, label: &str) -> Span<'static> {
    Span::styled(
        format!("[{key}]{label}"),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
}
