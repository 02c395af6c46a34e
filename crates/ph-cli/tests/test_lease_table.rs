mod common;

use ph_cli::app::App;
use ph_core::models::LeaseStatus;

use common::{line_with, make_lease, render_to_string, render_to_string_at, ts};

#[test]
fn empty_ledger() {
    let app = App::new();
    let output = render_to_string(&app, 100, 14);
    insta::assert_snapshot!(output);
}

#[test]
fn leases_listed_with_ports() {
    let mut app = App::new();
    app.leases = vec![
        make_lease("auth", 3000, LeaseStatus::Running),
        make_lease("payments", 3001, LeaseStatus::Stopped),
        make_lease("search", 3002, LeaseStatus::Expired),
    ];
    let output = render_to_string_at(&app, 100, 14, ts("2025-03-02T00:00:00Z"));
    insta::assert_snapshot!(output);
}

#[test]
fn overdue_running_lease_is_flagged() {
    let mut app = App::new();
    app.leases = vec![make_lease("auth", 3000, LeaseStatus::Running)];
    let output = render_to_string_at(&app, 100, 24, ts("2025-03-20T00:00:00Z"));
    assert!(line_with(&output, "3000  shop-auth").unwrap().contains('!'));
}

#[test]
fn selection_marker_follows_index() {
    let mut app = App::new();
    app.leases = vec![
        make_lease("auth", 3000, LeaseStatus::Running),
        make_lease("payments", 3001, LeaseStatus::Running),
    ];
    app.selected_index = 1;
    let output = render_to_string(&app, 100, 24);
    assert!(line_with(&output, "3001  shop-payments").unwrap().contains("> "));
    assert!(!line_with(&output, "3000  shop-auth").unwrap().contains("> "));
}

#[test]
fn long_project_names_are_truncated() {
    let mut app = App::new();
    app.leases = vec![make_lease(
        "a-really-long-branch-name-for-testing",
        3000,
        LeaseStatus::Running,
    )];
    let output = render_to_string(&app, 100, 24);
    assert!(output.contains("shop-a-really-long-branch..."));
}

#[test]
fn status_message_shown() {
    let mut app = App::new();
    app.set_status("Released port 3000 from shop-auth");
    let output = render_to_string(&app, 100, 24);
    assert!(output.contains("Released port 3000 from shop-auth"));
    assert!(output.contains("[X]release"));
}
