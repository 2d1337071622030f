use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ToolSchemaConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OptimizerConfig {
    /// `"local"` or `"http"`.
    pub provider: String,
    /// Cleanup service URL, used by the http provider.
    pub endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 7410,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_toolschema_dir()
            .join("schemas.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            provider: "local".into(),
            endpoint: String::new(),
        }
    }
}

/// Returns `~/.toolschema/`, or `./.toolschema/` when there is no home directory.
pub fn default_toolschema_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".toolschema")
}

/// Returns the default config file path: `~/.toolschema/config.toml`
pub fn default_config_path() -> PathBuf {
    default_toolschema_dir().join("config.toml")
}

impl ToolSchemaConfig {
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
            ToolSchemaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (TOOLSCHEMA_DB, TOOLSCHEMA_LOG_LEVEL, TOOLSCHEMA_OPTIMIZER_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("TOOLSCHEMA_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("TOOLSCHEMA_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("TOOLSCHEMA_OPTIMIZER_URL") {
            self.optimizer.provider = "http".into();
            self.optimizer.endpoint = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
