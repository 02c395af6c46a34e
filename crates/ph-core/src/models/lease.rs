use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LeaseStatus {
    Running,
    Stopped,
    Expired,
}

impl LeaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaseStatus::Running => "running",
            LeaseStatus::Stopped => "stopped",
            LeaseStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project's reservation of a single web port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub project_name: String,
    pub port: u16,
    pub branch: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: LeaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

impl Lease {
    /// A freshly allocated lease: running, created now, expiring after `ttl`.
    pub fn new(
        project_name: String,
        port: u16,
        branch: String,
        repo_url: Option<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self> {
        Ok(Self {
            project_name,
            port,
            branch,
            created_at: now,
            expires_at: expiry_after(now, ttl)?,
            status: LeaseStatus::Running,
            repo_url,
        })
    }

    /// Whether the TTL has lapsed at `now`. A lease expiring exactly at `now` is still valid.
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// `now + ttl`, or `InvalidConfig` when the sum leaves chrono's date range.
pub fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    now.checked_add_signed(ttl).ok_or_else(|| {
        RegistryError::InvalidConfig(format!("ttl of {} days is out of range", ttl.num_days()))
    })
}
