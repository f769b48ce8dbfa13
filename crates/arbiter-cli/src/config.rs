//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Reasoning backend settings
    #[serde(default)]
    pub backend: BackendSettings,

    /// Registry settings
    #[serde(default)]
    pub registry: RegistrySettings,
}

/// Reasoning backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Model slug sent to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; the OPENROUTER_API_KEY environment variable overrides this
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Registry API endpoint
    #[serde(default = "default_registry_endpoint")]
    pub endpoint: String,
}

fn default_db_path() -> String {
    "arbiter.db".to_string()
}

fn default_model() -> String {
    "anthropic/claude-sonnet-4".to_string()
}

fn default_registry_endpoint() -> String {
    arbiter_registry::client::DEFAULT_ENDPOINT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            backend: BackendSettings::default(),
            registry: RegistrySettings::default(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
        }
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            endpoint: default_registry_endpoint(),
        }
    }
}

impl Config {
    /// Default configuration file path (`~/.config/arbiter/config.toml`).
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".config").join("arbiter").join("config.toml"))
    }

    /// Load configuration from the given path, or from the default path.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(path) => PathBuf::from(path),
            None => Self::path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Resolve the backend API key: environment first, config file second.
    pub fn api_key(&self) -> Option<String> {
        std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.backend.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.db_path, "arbiter.db");
        assert!(config.registry.endpoint.contains("gleif"));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let config = Config::load(Some("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.db_path, "arbiter.db");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            db_path = "/tmp/test.db"

            [backend]
            model = "test/model"
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, "/tmp/test.db");
        assert_eq!(config.backend.model, "test/model");
        assert!(config.registry.endpoint.contains("gleif"));
    }
}
