use std::path::PathBuf;

use serde::Deserialize;

/// One YAML config file. Every key is optional so layers can be merged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigLayer {
    #[serde(default)]
    pub project_prefix: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub ttl_days: Option<u32>,
    #[serde(default)]
    pub base_web_port: Option<u16>,
    #[serde(default)]
    pub registry_path: Option<String>,
    #[serde(default)]
    pub deployments_dir: Option<String>,
}

impl ConfigLayer {
    /// Overlay `other` on top of `self`; keys set in `other` win.
    pub fn merge(self, other: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            project_prefix: other.project_prefix.or(self.project_prefix),
            repo_url: other.repo_url.or(self.repo_url),
            ttl_days: other.ttl_days.or(self.ttl_days),
            base_web_port: other.base_web_port.or(self.base_web_port),
            registry_path: other.registry_path.or(self.registry_path),
            deployments_dir: other.deployments_dir.or(self.deployments_dir),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct ProtohostConfig {
    pub project_prefix: String,
    pub repo_url: Option<String>,
    pub ttl_days: u32,
    pub base_web_port: u16,
    pub registry_path: PathBuf,
    pub deployments_dir: PathBuf,
}
