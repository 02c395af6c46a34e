use std::path::PathBuf;

use color_eyre::eyre::Result;
use tracing::warn;

use ph_core::services::{compose, git};

use super::{Context, Target};

/// Stop the branch deployment's containers, then record it in the ledger:
/// stopped (port kept) normally, released when volumes are removed so the
/// next deploy runs as a first install.
pub async fn run(ctx: &Context, branch: Option<String>, remove_volumes: bool) -> Result<()> {
    let target = ctx.target(branch).await?;
    let deploy_dir = deploy_dir(ctx, &target).await;

    compose::down(&target.project_name, &deploy_dir, remove_volumes).await?;

    let registry = ctx.registry_for(&target);
    if remove_volumes {
        if let Err(e) = registry.release(&target.project_name).await {
            warn!(project = %target.project_name, error = %e, "failed to release port");
            eprintln!("Warning: failed to release port: {e}");
        }
    } else if let Err(e) = registry.stop(&target.project_name).await {
        warn!(project = %target.project_name, error = %e, "failed to update status");
        eprintln!("Warning: failed to update status: {e}");
    }

    println!("Deployment {} stopped", target.project_name);
    Ok(())
}

/// Deployments launched from a checkout run in place; otherwise they live
/// under the deployments directory.
async fn deploy_dir(ctx: &Context, target: &Target) -> PathBuf {
    if git::is_git_repo(&ctx.cwd).await {
        ctx.cwd.clone()
    } else {
        target.deployment_dir()
    }
}
