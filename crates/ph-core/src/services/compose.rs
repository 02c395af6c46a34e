use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::error::{RegistryError, Result};

async fn run_compose(project_name: &str, arguments: &[&str], working_directory: &Path) -> Result<()> {
    debug!(project = %project_name, args = ?arguments, "docker compose");
    let output = Command::new("docker")
        .arg("compose")
        .args(["-p", project_name])
        .args(arguments)
        .current_dir(working_directory)
        .output()
        .await
        .map_err(|e| RegistryError::Compose(format!("failed to start docker: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RegistryError::Compose(format!(
            "docker compose {} failed (exit {}): {}",
            arguments.join(" "),
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }
    Ok(())
}

/// Stop and remove a deployment's containers, and its volumes when asked.
pub async fn down(project_name: &str, working_directory: &Path, remove_volumes: bool) -> Result<()> {
    let mut args = vec!["down"];
    if remove_volumes {
        args.push("-v");
    }
    run_compose(project_name, &args, working_directory).await
}
