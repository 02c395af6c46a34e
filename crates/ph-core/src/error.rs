use std::path::PathBuf;

use crate::models::LeaseStatus;

/// A uniqueness violation detected when committing a new lease.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    #[error("project '{0}' already holds a lease")]
    Project(String),

    #[error("port {0} is already leased")]
    Port(u16),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("ledger storage failed: {0}")]
    Storage(String),

    #[error("lease conflict: {0}")]
    Conflict(#[from] Conflict),

    #[error("no available ports in range {start}-{end}")]
    Exhausted { start: u16, end: u16 },

    #[error("no lease found for '{0}'")]
    NotFound(String),

    #[error("lease '{project}' cannot move from {from} to {to}")]
    InvalidTransition {
        project: String,
        from: LeaseStatus,
        to: LeaseStatus,
    },

    #[error("config file not found at {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("git operation failed: {0}")]
    Git(String),

    #[error("docker compose failed: {0}")]
    Compose(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
