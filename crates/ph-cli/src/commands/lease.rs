use std::io::Write;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::style::Stylize;

use ph_core::models::{Allocation, Lease};
use ph_core::services::status::LeaseView;

use super::Context;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reserve (or reuse and renew) the port for the branch deployment.
pub async fn allocate(ctx: &Context, branch: Option<String>) -> Result<()> {
    let target = ctx.target(branch).await?;
    let registry = ctx.registry_for(&target);
    let allocation = registry.upsert_running(&target.deploy_request()).await?;
    write_allocation(&mut std::io::stdout(), &allocation)?;
    Ok(())
}

pub async fn info(ctx: &Context, branch: Option<String>) -> Result<()> {
    let target = ctx.target(branch).await?;
    let registry = ctx.registry_for(&target);
    let lease = registry.status().require(&target.project_name).await?;
    write_info(&mut std::io::stdout(), &LeaseView::at(lease, Utc::now()))?;
    Ok(())
}

pub async fn stop(ctx: &Context, branch: Option<String>) -> Result<()> {
    let target = ctx.target(branch).await?;
    let registry = ctx.registry_for(&target);
    let lease = registry.stop(&target.project_name).await?;
    println!(
        "{} stopped, port {} stays reserved",
        lease.project_name, lease.port
    );
    Ok(())
}

pub async fn release(ctx: &Context, branch: Option<String>) -> Result<()> {
    let target = ctx.target(branch).await?;
    let registry = ctx.registry_for(&target);
    match registry.release(&target.project_name).await? {
        Some(lease) => println!("Released port {} from {}", lease.port, lease.project_name),
        None => println!("No lease held by {}", target.project_name),
    }
    Ok(())
}

pub fn write_allocation(out: &mut impl Write, allocation: &Allocation) -> std::io::Result<()> {
    let lease = &allocation.lease;
    writeln!(out, "Project:       {}", lease.project_name)?;
    writeln!(out, "Port:          {}", allocation.port)?;
    writeln!(out, "URL:           {}", lease.local_url())?;
    writeln!(
        out,
        "First install: {}",
        if allocation.is_new { "yes".green() } else { "no".dark_grey() }
    )?;
    writeln!(out, "Expires:       {}", lease.expires_at.format(TIMESTAMP_FORMAT))
}

pub fn write_info(out: &mut impl Write, view: &LeaseView) -> std::io::Result<()> {
    let lease: &Lease = &view.lease;
    writeln!(out, "Project: {}", lease.project_name)?;
    writeln!(out, "Branch:  {}", lease.branch)?;
    writeln!(out, "Status:  {}", lease.status)?;
    writeln!(out, "Port:    {}", lease.port)?;
    writeln!(out, "URL:     {}", lease.local_url())?;
    if let Some(repo) = &lease.repo_url {
        writeln!(out, "Repo:    {repo}")?;
    }
    writeln!(out, "Created: {}", lease.created_at.format(TIMESTAMP_FORMAT))?;
    writeln!(
        out,
        "Expires: {} ({})",
        lease.expires_at.format(TIMESTAMP_FORMAT),
        view.expiry_label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn lease() -> Lease {
        Lease::new(
            "shop-main".into(),
            3004,
            "main".into(),
            Some("git@example.com:shop.git".into()),
            ts("2025-03-01T09:30:00Z"),
            Duration::days(7),
        )
        .unwrap()
    }

    #[test]
    fn info_report() {
        let mut out = Vec::new();
        let view = LeaseView::at(lease(), ts("2025-03-03T09:30:00Z"));
        write_info(&mut out, &view).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Project: shop-main"));
        assert!(text.contains("Status:  running"));
        assert!(text.contains("URL:     http://localhost:3004"));
        assert!(text.contains("Repo:    git@example.com:shop.git"));
        assert!(text.contains("Created: 2025-03-01 09:30:00"));
        assert!(text.contains("Expires: 2025-03-08 09:30:00 (in 5 days)"));
    }

    #[test]
    fn allocation_report() {
        let mut out = Vec::new();
        let allocation = Allocation {
            port: 3004,
            is_new: true,
            lease: lease(),
        };
        write_allocation(&mut out, &allocation).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Port:          3004"));
        assert!(text.contains("yes"));
        assert!(text.contains("Expires:       2025-03-08 09:30:00"));
    }
}
