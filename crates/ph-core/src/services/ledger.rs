use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{Conflict, RegistryError, Result};
use crate::models::{Lease, LeaseStatus};

use super::lease_manager;

const LEDGER_VERSION: u32 = 1;

#[derive(Deserialize)]
struct LedgerDocument {
    version: u32,
    #[serde(default)]
    leases: Vec<Lease>,
}

#[derive(Serialize)]
struct LedgerDocumentRef<'a> {
    version: u32,
    leases: &'a [Lease],
}

#[derive(Debug, Clone, Copy)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Advisory lock on the ledger's sibling `.lock` file, released on drop.
struct LedgerLock {
    file: std::fs::File,
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Durable project → port lease store.
///
/// Leases live in a single JSON document. Reads hold a shared lock and
/// mutations an exclusive lock from load through the atomic rename of the
/// rewritten file, so concurrent `protohost` processes see serialized,
/// all-or-nothing updates.
pub struct LeaseLedger {
    path: PathBuf,
    lock_path: PathBuf,
}

impl LeaseLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, ".lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self, project_name: &str) -> Result<Option<Lease>> {
        self.read(|leases| {
            leases
                .iter()
                .find(|l| l.project_name == project_name)
                .cloned()
        })
        .await
    }

    /// Every recorded port, whatever the lease status.
    pub async fn ports(&self) -> Result<HashSet<u16>> {
        self.read(|leases| leases.iter().map(|l| l.port).collect())
            .await
    }

    /// All leases, newest first.
    pub async fn list(&self) -> Result<Vec<Lease>> {
        let mut leases = self.read(|leases| leases.to_vec()).await?;
        leases.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.project_name.cmp(&b.project_name))
        });
        Ok(leases)
    }

    /// Commit a new lease, enforcing project and port uniqueness.
    pub async fn insert(&self, lease: Lease) -> Result<Lease> {
        self.write(|leases| {
            if leases.iter().any(|l| l.project_name == lease.project_name) {
                return Err(Conflict::Project(lease.project_name.clone()).into());
            }
            if leases.iter().any(|l| l.port == lease.port) {
                return Err(Conflict::Port(lease.port).into());
            }
            leases.push(lease.clone());
            Ok(lease)
        })
        .await
        .inspect(|lease| info!(project = %lease.project_name, port = lease.port, "lease created"))
    }

    /// Mark an existing lease running again and slide its expiry to `now + ttl`.
    pub async fn refresh_running(
        &self,
        project_name: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Option<Lease>> {
        let refreshed = self
            .write(|leases| {
                let Some(lease) = leases.iter_mut().find(|l| l.project_name == project_name)
                else {
                    return Ok(None);
                };
                lease_manager::renew(lease, now, ttl)?;
                Ok(Some(lease.clone()))
            })
            .await?;
        if let Some(ref lease) = refreshed {
            info!(project = %lease.project_name, port = lease.port, expires_at = %lease.expires_at, "lease renewed");
        }
        Ok(refreshed)
    }

    /// Request a status change. Idempotent; illegal transitions fail softly
    /// with `InvalidTransition` and leave the lease untouched.
    pub async fn set_status(&self, project_name: &str, status: LeaseStatus) -> Result<Lease> {
        self.write(|leases| {
            let lease = leases
                .iter_mut()
                .find(|l| l.project_name == project_name)
                .ok_or_else(|| RegistryError::NotFound(project_name.to_string()))?;
            if let Some(transition) = lease_manager::requested_transition(lease, status)? {
                lease_manager::apply(lease, transition)?;
                info!(project = %project_name, %status, "lease status changed");
            }
            Ok(lease.clone())
        })
        .await
    }

    /// Delete a lease. Its port is free for the next allocation immediately.
    pub async fn release(&self, project_name: &str) -> Result<Option<Lease>> {
        let released = self
            .write(|leases| {
                let index = leases.iter().position(|l| l.project_name == project_name);
                Ok(index.map(|i| leases.remove(i)))
            })
            .await?;
        if let Some(ref lease) = released {
            info!(project = %lease.project_name, port = lease.port, "lease released");
        }
        Ok(released)
    }

    /// Delete a lease only while it is still in `status`. A lease that moved
    /// on (for example a redeploy after a sweep) is left in place and
    /// returned as `Err(RegistryError::InvalidTransition)`.
    pub async fn release_if(
        &self,
        project_name: &str,
        status: LeaseStatus,
    ) -> Result<Option<Lease>> {
        let released = self
            .write(|leases| {
                let Some(index) = leases.iter().position(|l| l.project_name == project_name)
                else {
                    return Ok(None);
                };
                if leases[index].status != status {
                    return Err(RegistryError::InvalidTransition {
                        project: project_name.to_string(),
                        from: leases[index].status,
                        to: status,
                    });
                }
                Ok(Some(leases.remove(index)))
            })
            .await?;
        if let Some(ref lease) = released {
            info!(project = %lease.project_name, port = lease.port, %status, "lease released");
        }
        Ok(released)
    }

    /// Flip every due lease to expired in one locked transaction. Returns the
    /// leases as they were before the flip, oldest expiry first.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<Lease>> {
        let mut expired = self
            .write(|leases| {
                Ok(leases
                    .iter_mut()
                    .filter_map(|lease| {
                        let snapshot = lease.clone();
                        lease_manager::expire_if_due(lease, now).then_some(snapshot)
                    })
                    .collect::<Vec<_>>())
            })
            .await?;
        expired.sort_by(|a, b| a.expires_at.cmp(&b.expires_at));
        if !expired.is_empty() {
            info!(count = expired.len(), "leases expired");
        }
        Ok(expired)
    }

    /// Run `f` over a consistent snapshot under a shared lock.
    pub(crate) async fn read<T>(&self, f: impl FnOnce(&[Lease]) -> T) -> Result<T> {
        let _lock = self.lock(LockMode::Shared).await?;
        let leases = self.load().await?;
        Ok(f(&leases))
    }

    /// Run `f` under an exclusive lock and persist its changes before returning.
    /// Nothing is written when `f` fails or leaves the leases unchanged.
    async fn write<T>(&self, f: impl FnOnce(&mut Vec<Lease>) -> Result<T>) -> Result<T> {
        let _lock = self.lock(LockMode::Exclusive).await?;
        let mut leases = self.load().await?;
        let before = leases.clone();
        let out = f(&mut leases)?;
        if leases != before {
            self.save(&leases).await?;
        }
        Ok(out)
    }

    async fn lock(&self, mode: LockMode) -> Result<LedgerLock> {
        if let Some(parent) = self.lock_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RegistryError::Storage(format!("failed to create ledger dir: {e}"))
            })?;
        }
        let lock_path = self.lock_path.clone();
        tokio::task::spawn_blocking(move || {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&lock_path)?;
            match mode {
                LockMode::Shared => FileExt::lock_shared(&file)?,
                LockMode::Exclusive => FileExt::lock_exclusive(&file)?,
            }
            Ok::<_, std::io::Error>(LedgerLock { file })
        })
        .await
        .map_err(|e| RegistryError::Storage(format!("ledger lock task failed: {e}")))?
        .map_err(|e| RegistryError::Storage(format!("failed to lock ledger: {e}")))
    }

    async fn load(&self) -> Result<Vec<Lease>> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(RegistryError::Storage(format!(
                    "failed to read ledger: {e}"
                )))
            }
        };
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: LedgerDocument = serde_json::from_str(&json).map_err(|e| {
            RegistryError::Storage(format!("ledger {} is corrupt: {e}", self.path.display()))
        })?;
        if doc.version != LEDGER_VERSION {
            return Err(RegistryError::Storage(format!(
                "unsupported ledger version {} (expected {LEDGER_VERSION})",
                doc.version
            )));
        }
        check_unique(&doc.leases)?;
        debug!(path = %self.path.display(), count = doc.leases.len(), "ledger loaded");
        Ok(doc.leases)
    }

    async fn save(&self, leases: &[Lease]) -> Result<()> {
        let json = serde_json::to_string_pretty(&LedgerDocumentRef {
            version: LEDGER_VERSION,
            leases,
        })?;
        let tmp_path = sibling(&self.path, ".tmp");
        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| RegistryError::Storage(format!("failed to write ledger: {e}")))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| RegistryError::Storage(format!("failed to write ledger: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| RegistryError::Storage(format!("failed to sync ledger: {e}")))?;
        drop(file);
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| RegistryError::Storage(format!("failed to replace ledger: {e}")))?;
        Ok(())
    }
}

fn check_unique(leases: &[Lease]) -> Result<()> {
    let mut projects = HashSet::new();
    let mut ports = HashSet::new();
    for lease in leases {
        if !projects.insert(lease.project_name.as_str()) {
            return Err(RegistryError::Storage(format!(
                "ledger is corrupt: duplicate project '{}'",
                lease.project_name
            )));
        }
        if !ports.insert(lease.port) {
            return Err(RegistryError::Storage(format!(
                "ledger is corrupt: duplicate port {}",
                lease.port
            )));
        }
    }
    Ok(())
}

/// `registry.json` + `.lock` → `registry.json.lock`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("registry.json"));
    name.push(suffix);
    path.with_file_name(name)
}
