mod common;

use ph_cli::app::App;
use ph_core::models::LeaseStatus;

use common::{make_lease, render_to_string_at, ts};

#[test]
fn running_lease_details() {
    let mut app = App::new();
    app.leases = vec![make_lease("auth", 3004, LeaseStatus::Running)];
    let output = render_to_string_at(&app, 100, 14, ts("2025-03-03T00:00:00Z"));
    insta::assert_snapshot!(output);
}

#[test]
fn overdue_lease_reports_days_ago() {
    let mut app = App::new();
    app.leases = vec![make_lease("auth", 3004, LeaseStatus::Expired)];
    let output = render_to_string_at(&app, 100, 24, ts("2025-03-12T12:00:00Z"));
    assert!(output.contains("Status     expired"));
    assert!(output.contains("Expires    expired 4 days ago"));
}

#[test]
fn details_follow_selection() {
    let mut app = App::new();
    app.leases = vec![
        make_lease("auth", 3000, LeaseStatus::Running),
        make_lease("payments", 3001, LeaseStatus::Stopped),
    ];
    app.selected_index = 1;
    let output = render_to_string_at(&app, 100, 24, ts("2025-03-03T00:00:00Z"));
    assert!(output.contains("Project    shop-payments"));
    assert!(output.contains("Status     stopped"));
    assert!(!output.contains("Project    shop-auth"));
}
