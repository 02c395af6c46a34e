use chrono::Duration;

use super::lease::Lease;

/// Input to `Registry::upsert_running`, supplied by the deployment workflow.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub project_name: String,
    pub branch: String,
    pub repo_url: Option<String>,
    pub ttl_days: u32,
    pub base_port: u16,
}

impl DeployRequest {
    pub fn ttl(&self) -> Duration {
        Duration::days(i64::from(self.ttl_days))
    }
}

/// Result of reserving or reusing a port.
#[derive(Debug, Clone)]
pub struct Allocation {
    pub port: u16,
    /// True the first time a project is provisioned; drives the first-install hook.
    pub is_new: bool,
    pub lease: Lease,
}
