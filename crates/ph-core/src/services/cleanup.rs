use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{Lease, LeaseStatus};

use super::registry::Registry;

/// Removes the external resources of a deployment: containers, files,
/// proxy config. The ledger is only told once this succeeds.
pub trait Teardown {
    fn teardown(&self, lease: &Lease) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy)]
pub struct CleanupOptions {
    pub dry_run: bool,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Leases selected for teardown: newly swept plus those left expired by earlier runs.
    pub expired: Vec<Lease>,
    /// Torn down and released.
    pub removed: Vec<Lease>,
    /// Still in the ledger (as expired) with the reason teardown or release failed.
    pub failed: Vec<(Lease, String)>,
    pub dry_run: bool,
}

/// Sweep expired leases and tear each one down independently.
///
/// A dry run only previews the selection. A lease whose teardown fails stays
/// expired and keeps its port; the next run picks it up again.
pub async fn run<T: Teardown>(
    registry: &Registry,
    teardown: &T,
    options: CleanupOptions,
) -> Result<CleanupReport> {
    if options.dry_run {
        let mut expired = registry.status().expired(options.now).await?;
        expired.extend(leftovers(registry, &expired).await?);
        return Ok(CleanupReport {
            expired,
            dry_run: true,
            ..Default::default()
        });
    }

    let mut expired = registry.sweep_expired(options.now).await?;
    expired.extend(leftovers(registry, &expired).await?);
    let mut report = CleanupReport {
        expired: expired.clone(),
        ..Default::default()
    };

    for lease in expired {
        if let Err(e) = teardown.teardown(&lease).await {
            warn!(project = %lease.project_name, error = %e, "teardown failed, keeping lease");
            report.failed.push((lease, e.to_string()));
            continue;
        }
        match registry
            .release_if(&lease.project_name, LeaseStatus::Expired)
            .await
        {
            Ok(_) => {
                info!(project = %lease.project_name, port = lease.port, "deployment cleaned up");
                report.removed.push(lease);
            }
            Err(e) => {
                warn!(project = %lease.project_name, error = %e, "failed to release port");
                report.failed.push((lease, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Leases already marked expired by an earlier sweep and not in `swept`.
async fn leftovers(registry: &Registry, swept: &[Lease]) -> Result<Vec<Lease>> {
    Ok(registry
        .list()
        .await?
        .into_iter()
        .filter(|l| l.status == LeaseStatus::Expired)
        .filter(|l| !swept.iter().any(|s| s.project_name == l.project_name))
        .collect())
}
