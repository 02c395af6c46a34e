use chrono::{DateTime, Utc};

use crate::error::{RegistryError, Result};
use crate::models::{Lease, LeaseStatus};

use super::ledger::LeaseLedger;

/// How far a lease is from its expiry, in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    In { days: i64 },
    Overdue { days: i64 },
}

/// A lease as shown by `list`/`info` at a given instant.
#[derive(Debug, Clone)]
pub struct LeaseView {
    pub lease: Lease,
    pub expiry: Expiry,
}

impl LeaseView {
    pub fn at(lease: Lease, now: DateTime<Utc>) -> Self {
        let expiry = if lease.is_past_expiry(now) {
            Expiry::Overdue {
                days: (now - lease.expires_at).num_days(),
            }
        } else {
            Expiry::In {
                days: (lease.expires_at - now).num_days(),
            }
        };
        Self { lease, expiry }
    }

    pub fn expiry_label(&self) -> String {
        match self.expiry {
            Expiry::In { days } => format!("in {days} days"),
            Expiry::Overdue { days } => format!("expired {days} days ago"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub running: usize,
    pub stopped: usize,
    pub expired: usize,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.running + self.stopped + self.expired
    }
}

/// Read-only queries. Every call goes back to the ledger; nothing is cached.
pub struct StatusProjection<'a> {
    ledger: &'a LeaseLedger,
}

impl<'a> StatusProjection<'a> {
    pub fn new(ledger: &'a LeaseLedger) -> Self {
        Self { ledger }
    }

    pub async fn get(&self, project_name: &str) -> Result<Option<Lease>> {
        self.ledger.get(project_name).await
    }

    pub async fn require(&self, project_name: &str) -> Result<Lease> {
        self.get(project_name)
            .await?
            .ok_or_else(|| RegistryError::NotFound(project_name.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<Lease>> {
        self.ledger.list().await
    }

    /// What `sweep_expired(now)` would return, without marking anything.
    pub async fn expired(&self, now: DateTime<Utc>) -> Result<Vec<Lease>> {
        let mut due = self
            .ledger
            .read(|leases| {
                leases
                    .iter()
                    .filter(|l| l.status != LeaseStatus::Expired && l.is_past_expiry(now))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await?;
        due.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        Ok(due)
    }

    pub async fn views(&self, now: DateTime<Utc>) -> Result<Vec<LeaseView>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|lease| LeaseView::at(lease, now))
            .collect())
    }

    pub async fn summary(&self) -> Result<StatusSummary> {
        self.ledger.read(summarize).await
    }
}

pub fn summarize(leases: &[Lease]) -> StatusSummary {
    leases
        .iter()
        .fold(StatusSummary::default(), |mut summary, lease| {
            match lease.status {
                LeaseStatus::Running => summary.running += 1,
                LeaseStatus::Stopped => summary.stopped += 1,
                LeaseStatus::Expired => summary.expired += 1,
            }
            summary
        })
}
