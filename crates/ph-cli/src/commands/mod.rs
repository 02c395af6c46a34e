pub mod cleanup;
pub mod dashboard;
pub mod down;
pub mod lease;
pub mod list;

use std::path::PathBuf;

use color_eyre::eyre::{Result, WrapErr};

use ph_core::models::{DeployRequest, ProtohostConfig};
use ph_core::services::{config_loader, git, naming};
use ph_core::{Registry, RegistryError};

/// Global inputs shared by every command: the working directory and the
/// `--registry` override.
pub struct Context {
    pub cwd: PathBuf,
    pub registry_override: Option<PathBuf>,
}

/// Ledger and deployment locations, from the project config when there is one.
#[derive(Debug, Clone)]
pub struct Paths {
    pub registry_path: PathBuf,
    pub deployments_dir: PathBuf,
}

/// The deployment a branch-scoped command acts on.
pub struct Target {
    pub config: ProtohostConfig,
    pub branch: String,
    pub project_name: String,
}

impl Target {
    pub fn deploy_request(&self) -> DeployRequest {
        DeployRequest {
            project_name: self.project_name.clone(),
            branch: self.branch.clone(),
            repo_url: self.config.repo_url.clone(),
            ttl_days: self.config.ttl_days,
            base_port: self.config.base_web_port,
        }
    }

    pub fn deployment_dir(&self) -> PathBuf {
        self.config.deployments_dir.join(&self.project_name)
    }
}

impl Context {
    pub fn new(cwd: PathBuf, registry_override: Option<PathBuf>) -> Self {
        Self {
            cwd,
            registry_override,
        }
    }

    /// Project config for the working directory. Commands that only touch the
    /// ledger work without one.
    pub fn optional_config(&self) -> Result<Option<ProtohostConfig>> {
        match config_loader::load(&self.cwd) {
            Ok(config) => Ok(Some(config)),
            Err(RegistryError::ConfigNotFound(_)) => Ok(None),
            Err(e) => Err(e).wrap_err("failed to load config"),
        }
    }

    pub fn paths(&self) -> Result<Paths> {
        let paths = match self.optional_config()? {
            Some(config) => Paths {
                registry_path: config.registry_path,
                deployments_dir: config.deployments_dir,
            },
            None => {
                let home = config_loader::protohost_home()?;
                Paths {
                    registry_path: home.join("registry.json"),
                    deployments_dir: home.join("deployments"),
                }
            }
        };
        Ok(self.with_override(paths))
    }

    fn with_override(&self, mut paths: Paths) -> Paths {
        if let Some(path) = &self.registry_override {
            paths.registry_path = path.clone();
        }
        paths
    }

    pub fn registry(&self) -> Result<Registry> {
        Ok(Registry::open(self.paths()?.registry_path))
    }

    /// Resolve the project for `branch`, or for the checked-out branch when none is given.
    pub async fn target(&self, branch: Option<String>) -> Result<Target> {
        let config = config_loader::load(&self.cwd).wrap_err("failed to load config")?;
        let branch = match branch {
            Some(branch) => branch,
            None => git::current_branch(&self.cwd)
                .await
                .wrap_err("failed to detect branch")?,
        };
        let project_name = naming::project_name(&config.project_prefix, &branch);
        Ok(Target {
            config,
            branch,
            project_name,
        })
    }

    pub fn registry_for(&self, target: &Target) -> Registry {
        let path = self
            .registry_override
            .clone()
            .unwrap_or_else(|| target.config.registry_path.clone());
        Registry::open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn target(prefix: &str, branch: &str) -> Target {
        Target {
            config: ProtohostConfig {
                project_prefix: prefix.into(),
                repo_url: Some("git@example.com:shop.git".into()),
                ttl_days: 3,
                base_web_port: 4000,
                registry_path: PathBuf::from("/var/protohost/registry.json"),
                deployments_dir: PathBuf::from("/var/protohost/deployments"),
            },
            branch: branch.into(),
            project_name: naming::project_name(prefix, branch),
        }
    }

    #[test]
    fn deploy_request_carries_config() {
        let t = target("shop", "feature/cart");
        let request = t.deploy_request();
        assert_eq!(request.project_name, "shop-feature-cart");
        assert_eq!(request.branch, "feature/cart");
        assert_eq!(request.ttl_days, 3);
        assert_eq!(request.base_port, 4000);
        assert_eq!(request.repo_url.as_deref(), Some("git@example.com:shop.git"));
        assert_eq!(
            t.deployment_dir(),
            Path::new("/var/protohost/deployments/shop-feature-cart")
        );
    }

    #[test]
    fn registry_override_wins() {
        let ctx = Context::new(
            PathBuf::from("."),
            Some(PathBuf::from("/tmp/override.json")),
        );
        let registry = ctx.registry_for(&target("shop", "main"));
        assert_eq!(registry.ledger().path(), Path::new("/tmp/override.json"));
    }

    #[test]
    fn explicit_paths_come_from_config() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(
            project.path().join(config_loader::PROJECT_CONFIG_FILENAME),
            "project_prefix: shop\nregistry_path: /srv/ph/registry.json\ndeployments_dir: /srv/ph/deployments\n",
        )
        .unwrap();
        let ctx = Context::new(project.path().to_path_buf(), None);
        let paths = ctx.paths().unwrap();
        assert_eq!(paths.registry_path, Path::new("/srv/ph/registry.json"));
        assert_eq!(paths.deployments_dir, Path::new("/srv/ph/deployments"));
    }
}
