use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::style::Stylize;

use ph_core::models::Lease;
use ph_core::services::cleanup::{self, CleanupOptions, CleanupReport, Teardown};
use ph_core::services::compose;
use ph_core::Registry;

use super::Context;

/// Tears a deployment down with `docker compose down -v` and removes its
/// directory under the deployments dir.
pub struct ComposeTeardown {
    pub deployments_dir: PathBuf,
}

impl Teardown for ComposeTeardown {
    async fn teardown(&self, lease: &Lease) -> ph_core::Result<()> {
        let deploy_dir = self.deployments_dir.join(&lease.project_name);
        let exists = tokio::fs::try_exists(&deploy_dir).await.unwrap_or(false);
        let working_dir = if exists {
            deploy_dir.clone()
        } else {
            std::env::temp_dir()
        };

        compose::down(&lease.project_name, &working_dir, true).await?;

        if exists {
            tokio::fs::remove_dir_all(&deploy_dir).await?;
        }
        Ok(())
    }
}

pub async fn run(ctx: &Context, dry_run: bool) -> Result<()> {
    let paths = ctx.paths()?;
    let registry = Registry::open(paths.registry_path);
    let teardown = ComposeTeardown {
        deployments_dir: paths.deployments_dir,
    };
    let now = Utc::now();
    let report = cleanup::run(&registry, &teardown, CleanupOptions { dry_run, now }).await?;
    write_report(&mut std::io::stdout(), &report, now)?;
    Ok(())
}

pub fn write_report(
    out: &mut impl Write,
    report: &CleanupReport,
    now: DateTime<Utc>,
) -> std::io::Result<()> {
    if report.expired.is_empty() {
        return writeln!(out, "No expired deployments found");
    }

    writeln!(out, "Found expired deployments:")?;
    for lease in &report.expired {
        let days_ago = (now - lease.expires_at).num_days().max(0);
        writeln!(
            out,
            "  - {} {}",
            lease.project_name,
            format!("(expired {days_ago} days ago)").red()
        )?;
    }
    writeln!(out)?;

    if report.dry_run {
        return writeln!(out, "Dry run - no changes made");
    }

    for lease in &report.removed {
        writeln!(
            out,
            "  {} Removed {}, released port {}",
            "✓".green(),
            lease.project_name,
            lease.port
        )?;
    }
    for (lease, reason) in &report.failed {
        writeln!(
            out,
            "  {} Kept {}: {reason}",
            "✗".red(),
            lease.project_name
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Cleanup complete: removed {}, failed {}",
        report.removed.len(),
        report.failed.len()
    )
}
