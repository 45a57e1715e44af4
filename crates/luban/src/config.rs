use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};

pub const DEFAULT_CONFIG_FILENAME: &str = "luban.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9090";
pub const DEFAULT_USER_ID_HEADER: &str = "x-luban-user-id";
pub const DEFAULT_USER_NAME_HEADER: &str = "x-luban-user-name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceConfig {
    pub bind_addr: String,
    /// Directory for file-backed storage. In-memory storage when unset.
    pub data_dir: Option<PathBuf>,
    /// Header carrying the authenticated user's id, set by the upstream
    /// authenticator.
    pub user_id_header: String,
    pub user_name_header: String,
    /// Create an empty user record on first request from an unknown user.
    pub auto_provision_users: bool,
    pub cors_allow_any: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            data_dir: None,
            user_id_header: DEFAULT_USER_ID_HEADER.to_string(),
            user_name_header: DEFAULT_USER_NAME_HEADER.to_string(),
            auto_provision_users: true,
            cors_allow_any: true,
        }
    }
}

impl ServiceConfig {
    /// Defaults, then `path` if it exists, then `LUBAN_*` environment
    /// overrides.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let mut config = if path.exists() {
            Self::read_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|name| env::var(name).ok());
        Ok(config)
    }

    fn read_file(path: &Path) -> CoreResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|error| {
            CoreError::Internal(format!(
                "failed to read config {}: {error}",
                path.display()
            ))
        })?;
        serde_json::from_str(&data).map_err(|error| {
            CoreError::Internal(format!(
                "failed to parse config {}: {error}",
                path.display()
            ))
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("LUBAN_BIND_ADDR").filter(|value| !value.is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(dir) = lookup("LUBAN_DATA_DIR").filter(|value| !value.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = lookup("LUBAN_AUTO_PROVISION").and_then(|value| parse_flag(&value)) {
            self.auto_provision_users = flag;
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_file_or_env() {
        let dir = tempdir().expect("tempdir");
        assert!(ServiceConfig::read_file(&dir.path().join("absent.json")).is_err());

        let mut config = ServiceConfig::default();
        config.apply_env(|_| None);
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        std::fs::write(&path, r#"{ "dataDir": "/var/lib/luban", "autoProvisionUsers": false }"#)
            .expect("write config");

        let config = ServiceConfig::read_file(&path).expect("read");
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/lib/luban")));
        assert!(!config.auto_provision_users);
        assert_eq!(config.user_id_header, DEFAULT_USER_ID_HEADER);
    }

    #[test]
    fn env_overrides_file() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LUBAN_BIND_ADDR", "0.0.0.0:8080"),
            ("LUBAN_DATA_DIR", "/data"),
            ("LUBAN_AUTO_PROVISION", "off"),
        ]);
        let mut config = ServiceConfig::default();
        config.apply_env(|name| vars.get(name).map(|value| value.to_string()));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.data_dir, Some(PathBuf::from("/data")));
        assert!(!config.auto_provision_users);
    }

    #[test]
    fn unparseable_flag_is_ignored() {
        let mut config = ServiceConfig::default();
        config.apply_env(|name| (name == "LUBAN_AUTO_PROVISION").then(|| "maybe".to_string()));
        assert!(config.auto_provision_users);
    }
}
