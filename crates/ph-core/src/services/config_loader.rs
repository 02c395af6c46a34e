use std::path::{Path, PathBuf};

use crate::error::{RegistryError, Result};
use crate::models::{ConfigLayer, ProtohostConfig};

pub const PROJECT_CONFIG_FILENAME: &str = ".protohost.yaml";
pub const LOCAL_CONFIG_FILENAME: &str = ".protohost.local.yaml";
const GLOBAL_CONFIG_FILENAME: &str = "config.yaml";

const DEFAULT_TTL_DAYS: u32 = 7;
/// Upper bound on `ttl_days`, ten years.
pub const MAX_TTL_DAYS: u32 = 3650;
const DEFAULT_BASE_WEB_PORT: u16 = 3000;

/// `~/.protohost`, home of the global config, the ledger and deployments.
pub fn protohost_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".protohost"))
        .ok_or_else(|| RegistryError::InvalidConfig("cannot determine home directory".into()))
}

/// Load config for the project in `project_dir`, layering the global config,
/// `.protohost.yaml` and `.protohost.local.yaml` (highest priority).
pub fn load(project_dir: &Path) -> Result<ProtohostConfig> {
    let home = dirs::home_dir()
        .ok_or_else(|| RegistryError::InvalidConfig("cannot determine home directory".into()))?;
    load_from(project_dir, &home)
}

pub fn load_from(project_dir: &Path, home: &Path) -> Result<ProtohostConfig> {
    let global_path = home.join(".protohost").join(GLOBAL_CONFIG_FILENAME);
    let project_path = project_dir.join(PROJECT_CONFIG_FILENAME);
    if !project_path.exists() {
        return Err(RegistryError::ConfigNotFound(project_path));
    }

    let mut layer = ConfigLayer::default();
    for path in [
        global_path,
        project_path,
        project_dir.join(LOCAL_CONFIG_FILENAME),
    ] {
        if let Some(next) = read_layer(&path)? {
            layer = layer.merge(next);
        }
    }
    resolve(layer, home)
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Some(ConfigLayer::default()));
    }
    let layer: ConfigLayer = serde_yaml::from_str(&contents)
        .map_err(|e| RegistryError::InvalidConfig(format!("{}: {e}", path.display())))?;
    Ok(Some(layer))
}

/// Apply defaults and validate a merged layer.
pub fn resolve(layer: ConfigLayer, home: &Path) -> Result<ProtohostConfig> {
    let project_prefix = layer
        .project_prefix
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RegistryError::InvalidConfig("project_prefix field is required".into()))?;

    let base_web_port = layer.base_web_port.unwrap_or(DEFAULT_BASE_WEB_PORT);
    if base_web_port == 0 {
        return Err(RegistryError::InvalidConfig(
            "base_web_port must be greater than zero".into(),
        ));
    }

    let ttl_days = layer.ttl_days.unwrap_or(DEFAULT_TTL_DAYS);
    if ttl_days > MAX_TTL_DAYS {
        return Err(RegistryError::InvalidConfig(format!(
            "ttl_days must be at most {MAX_TTL_DAYS}, got {ttl_days}"
        )));
    }

    let protohost_dir = home.join(".protohost");
    let registry_path = layer
        .registry_path
        .map(|p| expand_tilde(&p, home))
        .unwrap_or_else(|| protohost_dir.join("registry.json"));
    let deployments_dir = layer
        .deployments_dir
        .map(|p| expand_tilde(&p, home))
        .unwrap_or_else(|| protohost_dir.join("deployments"));

    Ok(ProtohostConfig {
        project_prefix,
        repo_url: layer.repo_url.filter(|u| !u.is_empty()),
        ttl_days,
        base_web_port,
        registry_path,
        deployments_dir,
    })
}

pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_global(home: &Path, yaml: &str) {
        let dir = home.join(".protohost");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(GLOBAL_CONFIG_FILENAME), yaml).unwrap();
    }

    #[test]
    fn parse_full_config() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let yaml = r#"
project_prefix: shop
repo_url: git@github.com:acme/shop.git
ttl_days: 14
base_web_port: 4000
registry_path: ~/state/registry.json
deployments_dir: /srv/deployments
"#;
        fs::write(project.path().join(PROJECT_CONFIG_FILENAME), yaml).unwrap();
        let config = load_from(project.path(), home.path()).unwrap();
        assert_eq!(config.project_prefix, "shop");
        assert_eq!(
            config.repo_url.as_deref(),
            Some("git@github.com:acme/shop.git")
        );
        assert_eq!(config.ttl_days, 14);
        assert_eq!(config.base_web_port, 4000);
        assert_eq!(
            config.registry_path,
            home.path().join("state/registry.json")
        );
        assert_eq!(config.deployments_dir, PathBuf::from("/srv/deployments"));
    }

    #[test]
    fn parse_minimal_config_applies_defaults() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(
            project.path().join(PROJECT_CONFIG_FILENAME),
            "project_prefix: shop\n",
        )
        .unwrap();
        let config = load_from(project.path(), home.path()).unwrap();
        assert_eq!(config.ttl_days, 7);
        assert_eq!(config.base_web_port, 3000);
        assert!(config.repo_url.is_none());
        assert_eq!(
            config.registry_path,
            home.path().join(".protohost/registry.json")
        );
        assert_eq!(
            config.deployments_dir,
            home.path().join(".protohost/deployments")
        );
    }

    #[test]
    fn layers_override_in_priority_order() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        write_global(home.path(), "ttl_days: 30\nbase_web_port: 5000\nproject_prefix: global\n");
        fs::write(
            project.path().join(PROJECT_CONFIG_FILENAME),
            "project_prefix: shop\nttl_days: 3\n",
        )
        .unwrap();
        fs::write(project.path().join(LOCAL_CONFIG_FILENAME), "ttl_days: 1\n").unwrap();

        let config = load_from(project.path(), home.path()).unwrap();
        assert_eq!(config.project_prefix, "shop");
        assert_eq!(config.ttl_days, 1);
        assert_eq!(config.base_web_port, 5000);
    }

    #[test]
    fn missing_project_config_returns_error() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_from(project.path(), home.path()),
            Err(RegistryError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn missing_prefix_is_invalid() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(project.path().join(PROJECT_CONFIG_FILENAME), "ttl_days: 3\n").unwrap();
        assert!(matches!(
            load_from(project.path(), home.path()),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn oversized_ttl_is_invalid() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(
            project.path().join(PROJECT_CONFIG_FILENAME),
            "project_prefix: shop\nttl_days: 4000000000\n",
        )
        .unwrap();
        assert!(matches!(
            load_from(project.path(), home.path()),
            Err(RegistryError::InvalidConfig(_))
        ));

        fs::write(
            project.path().join(PROJECT_CONFIG_FILENAME),
            "project_prefix: shop\nttl_days: 3650\n",
        )
        .unwrap();
        assert_eq!(load_from(project.path(), home.path()).unwrap().ttl_days, 3650);
    }

    #[test]
    fn malformed_yaml_is_invalid() {
        let home = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        fs::write(
            project.path().join(PROJECT_CONFIG_FILENAME),
            "project_prefix: shop\nbase_web_port: not-a-port\n",
        )
        .unwrap();
        assert!(matches!(
            load_from(project.path(), home.path()),
            Err(RegistryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn tilde_expansion() {
        let home = Path::new("/home/dev");
        assert_eq!(expand_tilde("~", home), PathBuf::from("/home/dev"));
        assert_eq!(expand_tilde("~/x", home), PathBuf::from("/home/dev/x"));
        assert_eq!(expand_tilde("/abs", home), PathBuf::from("/abs"));
    }
}
