use std::path::Path;

use tokio::process::Command;

use crate::error::{RegistryError, Result};

async fn run_git(args: &[&str], working_directory: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(working_directory)
        .output()
        .await
        .map_err(|e| RegistryError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RegistryError::Git(format!(
            "git {} failed (exit {}): {}",
            args.join(" "),
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Branch checked out in `repo_path`. A detached HEAD is an error since it
/// cannot name a deployment.
pub async fn current_branch(repo_path: &Path) -> Result<String> {
    let branch = run_git(&["rev-parse", "--abbrev-ref", "HEAD"], repo_path).await?;
    if branch.is_empty() || branch == "HEAD" {
        return Err(RegistryError::Git(
            "HEAD is detached; pass --branch explicitly".into(),
        ));
    }
    Ok(branch)
}

pub async fn is_git_repo(path: &Path) -> bool {
    matches!(
        run_git(&["rev-parse", "--is-inside-work-tree"], path).await.as_deref(),
        Ok("true")
    )
}
