// Each test binary compiles this module independently and uses a different
// subset of helpers, so unused-function warnings are expected.
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};

use ph_cli::app::App;
use ph_cli::ui;
use ph_core::models::{Lease, LeaseStatus};
use ratatui::{backend::TestBackend, Terminal};

/// Render the app to a string using a TestBackend of the given dimensions.
pub fn render_to_string(app: &App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| ui::render(f, app, None)).unwrap();
    terminal.backend().to_string()
}

/// Render the app with a fixed `now` for deterministic expiry labels.
pub fn render_to_string_at(app: &App, width: u16, height: u16, now: DateTime<Utc>) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal.draw(|f| ui::render(f, app, Some(now))).unwrap();
    terminal.backend().to_string()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Lease for `feature/<name>` under prefix `shop`, created 2025-03-01 with a 7 day TTL.
pub fn make_lease(name: &str, port: u16, status: LeaseStatus) -> Lease {
    let mut lease = Lease::new(
        format!("shop-{name}"),
        port,
        format!("feature/{name}"),
        Some("git@example.com:shop.git".into()),
        ts("2025-03-01T00:00:00Z"),
        Duration::days(7),
    )
    .unwrap();
    lease.status = status;
    lease
}

/// Line of the rendered buffer that contains `needle`.
pub fn line_with<'a>(output: &'a str, needle: &str) -> Option<&'a str> {
    output.lines().find(|line| line.contains(needle))
}
