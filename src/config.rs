use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SojournConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Shared key required on every write endpoint.
    pub auth_key: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

impl Default for SojournConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8330,
            log_level: "info".into(),
            auth_key: String::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_sojourn_dir()
            .join("history.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

/// Returns `~/.sojourn/`
pub fn default_sojourn_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".sojourn")
}

/// Returns the default config file path: `~/.sojourn/config.toml`
pub fn default_config_path() -> PathBuf {
    default_sojourn_dir().join("config.toml")
}

impl SojournConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            SojournConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (SOJOURN_DB, SOJOURN_KEY, SOJOURN_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SOJOURN_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("SOJOURN_KEY") {
            self.server.auth_key = val;
        }
        if let Ok(val) = std::env::var("SOJOURN_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SojournConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8330);
        assert_eq!(config.server.log_level, "info");
        assert!(config.server.auth_key.is_empty());
        assert!(config.storage.db_path.ends_with("history.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 9000
log_level = "debug"
auth_key = "hunter2"

[storage]
db_path = "/tmp/test.db"
"#;
        let config: SojournConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.server.auth_key, "hunter2");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        // defaults still apply for unset fields
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SojournConfig::default();
        std::env::set_var("SOJOURN_DB", "/tmp/override.db");
        std::env::set_var("SOJOURN_KEY", "env-key");
        std::env::set_var("SOJOURN_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.auth_key, "env-key");
        assert_eq!(config.server.log_level, "trace");

        // Clean up
        std::env::remove_var("SOJOURN_DB");
        std::env::remove_var("SOJOURN_KEY");
        std::env::remove_var("SOJOURN_LOG_LEVEL");
    }
}
