//! Configuration for the claim generator

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the claim generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Maximum time for the LLM-assisted fallback extraction (seconds)
    pub llm_timeout_secs: u64,

    /// Maximum raw-content characters sent to the backend
    pub content_snippet_chars: usize,
}

impl GeneratorConfig {
    /// Get the LLM timeout as a Duration
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.llm_timeout_secs == 0 {
            return Err("llm_timeout_secs must be greater than 0".to_string());
        }
        if self.content_snippet_chars == 0 {
            return Err("content_snippet_chars must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            llm_timeout_secs: 30,
            content_snippet_chars: 4_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = GeneratorConfig {
            llm_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GeneratorConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = GeneratorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.llm_timeout_secs, config.llm_timeout_secs);
        assert_eq!(parsed.content_snippet_chars, config.content_snippet_chars);
    }
}
