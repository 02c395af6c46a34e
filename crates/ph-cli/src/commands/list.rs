use std::io::Write;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::style::Stylize;

use ph_core::models::LeaseStatus;
use ph_core::services::status::{Expiry, LeaseView, StatusSummary};

use super::Context;

/// Every lease on this host, newest first.
pub async fn run(ctx: &Context) -> Result<()> {
    let registry = ctx.registry()?;
    let status = registry.status();
    let views = status.views(Utc::now()).await?;
    let summary = status.summary().await?;
    write_report(&mut std::io::stdout(), &views, summary)?;
    Ok(())
}

pub fn write_report(
    out: &mut impl Write,
    views: &[LeaseView],
    summary: StatusSummary,
) -> std::io::Result<()> {
    if views.is_empty() {
        return writeln!(out, "No local deployments found");
    }

    writeln!(out, "Local Deployments")?;
    writeln!(out, "=================")?;
    writeln!(out)?;

    for view in views {
        let lease = &view.lease;
        let status = match lease.status {
            LeaseStatus::Running => lease.status.as_str().green(),
            LeaseStatus::Stopped => lease.status.as_str().yellow(),
            LeaseStatus::Expired => lease.status.as_str().red(),
        };
        writeln!(out, "{} ({status})", lease.project_name)?;
        writeln!(out, "  Branch:   {}", lease.branch)?;
        writeln!(out, "  Port:     {}", lease.port)?;
        writeln!(out, "  URL:      {}", lease.local_url())?;
        writeln!(
            out,
            "  Created:  {}",
            lease.created_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        match view.expiry {
            Expiry::In { .. } => writeln!(out, "  Expires:  {}", view.expiry_label())?,
            Expiry::Overdue { .. } => writeln!(out, "  Expires:  {}", view.expiry_label().red())?,
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "{} leases: {} running, {} stopped, {} expired",
        summary.total(),
        summary.running,
        summary.stopped,
        summary.expired
    )
}
