mod common;

use ph_cli::app::{App, ConfirmAction, Mode};
use ph_core::models::LeaseStatus;

use common::{make_lease, render_to_string, render_to_string_at, ts};

#[test]
fn confirm_release() {
    let mut app = App::new();
    app.leases = vec![
        make_lease("auth", 3000, LeaseStatus::Running),
        make_lease("payments", 3001, LeaseStatus::Stopped),
    ];
    app.mode = Mode::ConfirmDialog {
        message: "Release port 3000 held by 'shop-auth'? The next deploy will be a first install."
            .into(),
        action: ConfirmAction::Release("shop-auth".into()),
    };
    let output = render_to_string_at(&app, 100, 14, ts("2025-03-02T00:00:00Z"));
    insta::assert_snapshot!(output);
}

#[test]
fn confirm_for_unlisted_project_omits_lease_line() {
    let mut app = App::new();
    app.mode = Mode::ConfirmDialog {
        message: "Release port 3000?".into(),
        action: ConfirmAction::Release("shop-gone".into()),
    };
    let output = render_to_string(&app, 100, 30);
    assert!(output.contains(" Release shop-gone "));
    assert!(output.contains("Release port 3000?"));
    assert!(output.contains("[N]o / Esc"));
    assert!(!output.contains("http://localhost"));
}

#[test]
fn help_dialog_renders() {
    let mut app = App::new();
    app.mode = Mode::HelpDialog;
    let output = render_to_string(&app, 100, 40);
    assert!(output.contains("Help"));
    assert!(output.contains("Release selected port"));
    assert!(output.contains("expired, awaiting cleanup"));
    assert!(output.contains("[Esc]close"));
}
