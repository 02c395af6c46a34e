use ph_core::models::Lease;
use ph_core::services::status::{summarize, StatusSummary};

/// The active mode determines which UI is shown and how keys are dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    LeaseList,
    ConfirmDialog {
        message: String,
        action: ConfirmAction,
    },
    HelpDialog,
}

/// What a confirmed dialog action should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Release(String),
}

/// Dashboard state. `leases` is replaced wholesale on every refresh.
pub struct App {
    pub leases: Vec<Lease>,
    pub selected_index: usize,
    pub mode: Mode,
    pub status_message: Option<String>,
    pub should_quit: bool,
    pub registry_path: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            leases: Vec::new(),
            selected_index: 0,
            mode: Mode::LeaseList,
            status_message: None,
            should_quit: false,
            registry_path: String::new(),
        }
    }

    pub fn selected_lease(&self) -> Option<&Lease> {
        self.leases.get(self.selected_index)
    }

    pub fn select_next(&mut self) {
        if !self.leases.is_empty() && self.selected_index + 1 < self.leases.len() {
            self.selected_index += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Replace the lease list, keeping the selection on the same project when
    /// it still exists.
    pub fn set_leases(&mut self, leases: Vec<Lease>) {
        let selected = self.selected_lease().map(|l| l.project_name.clone());
        self.leases = leases;
        self.selected_index = selected
            .and_then(|name| self.leases.iter().position(|l| l.project_name == name))
            .unwrap_or(self.selected_index)
            .min(self.leases.len().saturating_sub(1));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn summary(&self) -> StatusSummary {
        summarize(&self.leases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn lease(name: &str, port: u16) -> Lease {
        Lease::new(
            name.into(),
            port,
            "main".into(),
            None,
            Utc::now(),
            Duration::days(7),
        )
        .unwrap()
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = App::new();
        app.select_next();
        assert_eq!(app.selected_index, 0);

        app.leases = vec![lease("a", 3000), lease("b", 3001)];
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_index, 1);
        app.select_prev();
        app.select_prev();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn refresh_follows_selected_project() {
        let mut app = App::new();
        app.leases = vec![lease("a", 3000), lease("b", 3001)];
        app.selected_index = 1;

        app.set_leases(vec![lease("c", 3002), lease("a", 3000), lease("b", 3001)]);
        assert_eq!(app.selected_lease().unwrap().project_name, "b");
    }

    #[test]
    fn refresh_clamps_when_selected_project_disappears() {
        let mut app = App::new();
        app.leases = vec![lease("a", 3000), lease("b", 3001)];
        app.selected_index = 1;

        app.set_leases(vec![lease("a", 3000)]);
        assert_eq!(app.selected_index, 0);

        app.set_leases(Vec::new());
        assert_eq!(app.selected_index, 0);
        assert!(app.selected_lease().is_none());
    }
}
