use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{RegistryError, Result};
use crate::models::{Allocation, DeployRequest, Lease, LeaseStatus};

use super::ledger::LeaseLedger;
use super::ports::PortAllocator;
use super::status::StatusProjection;

/// Commit attempts before a lost allocation race is reported as exhaustion.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Entry point for the deploy, teardown, cleanup and reporting workflows.
pub struct Registry {
    ledger: LeaseLedger,
    allocator: PortAllocator,
}

impl Registry {
    pub fn new(ledger: LeaseLedger, allocator: PortAllocator) -> Self {
        Self { ledger, allocator }
    }

    /// Ledger at `path` with the live TCP probe.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(LeaseLedger::new(path), PortAllocator::new())
    }

    pub fn ledger(&self) -> &LeaseLedger {
        &self.ledger
    }

    pub fn status(&self) -> StatusProjection<'_> {
        StatusProjection::new(&self.ledger)
    }

    /// Reserve a port for a new project, or reuse and renew an existing lease.
    pub async fn upsert_running(&self, request: &DeployRequest) -> Result<Allocation> {
        self.upsert_running_at(request, Utc::now()).await
    }

    pub async fn upsert_running_at(
        &self,
        request: &DeployRequest,
        now: DateTime<Utc>,
    ) -> Result<Allocation> {
        let ttl = request.ttl();
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            if let Some(lease) = self
                .ledger
                .refresh_running(&request.project_name, now, ttl)
                .await?
            {
                return Ok(Allocation {
                    port: lease.port,
                    is_new: false,
                    lease,
                });
            }

            let reserved = self.ledger.ports().await?;
            let port = self.allocator.allocate(request.base_port, &reserved)?;
            let lease = Lease::new(
                request.project_name.clone(),
                port,
                request.branch.clone(),
                request.repo_url.clone(),
                now,
                ttl,
            )?;

            match self.ledger.insert(lease).await {
                Ok(lease) => {
                    return Ok(Allocation {
                        port,
                        is_new: true,
                        lease,
                    })
                }
                Err(RegistryError::Conflict(conflict)) => {
                    warn!(
                        project = %request.project_name,
                        attempt,
                        %conflict,
                        "lost allocation race, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let window = PortAllocator::window(request.base_port);
        Err(RegistryError::Exhausted {
            start: *window.start(),
            end: *window.end(),
        })
    }

    /// Normal stop: the port stays reserved for the next deploy.
    pub async fn stop(&self, project_name: &str) -> Result<Lease> {
        self.ledger
            .set_status(project_name, LeaseStatus::Stopped)
            .await
    }

    pub async fn set_status(&self, project_name: &str, status: LeaseStatus) -> Result<Lease> {
        self.ledger.set_status(project_name, status).await
    }

    /// Drop the lease so the next deploy is treated as first-time again.
    pub async fn release(&self, project_name: &str) -> Result<Option<Lease>> {
        self.ledger.release(project_name).await
    }

    /// Release only if the lease is still in `status`.
    pub async fn release_if(
        &self,
        project_name: &str,
        status: LeaseStatus,
    ) -> Result<Option<Lease>> {
        self.ledger.release_if(project_name, status).await
    }

    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<Lease>> {
        let expired = self.ledger.sweep_expired(now).await?;
        for lease in &expired {
            info!(project = %lease.project_name, port = lease.port, "lease expired");
        }
        Ok(expired)
    }

    pub async fn get(&self, project_name: &str) -> Result<Option<Lease>> {
        self.status().get(project_name).await
    }

    pub async fn list(&self) -> Result<Vec<Lease>> {
        self.status().list().await
    }
}
