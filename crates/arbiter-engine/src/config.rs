//! Configuration for the arbitration engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the arbitration engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum time for the single reasoning-backend call (seconds)
    pub backend_timeout_secs: u64,

    /// Shortlist size
    pub max_ranked: usize,

    /// Maximum candidate claims embedded in the backend prompt
    pub prompt_claims_limit: usize,

    /// Legal-form codes that score the legal-form criterion
    pub preferred_legal_forms: Vec<String>,
}

impl EngineConfig {
    /// Get the backend timeout as a Duration
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_timeout_secs == 0 {
            return Err("backend_timeout_secs must be greater than 0".to_string());
        }
        if self.max_ranked == 0 {
            return Err("max_ranked must be greater than 0".to_string());
        }
        if self.prompt_claims_limit == 0 {
            return Err("prompt_claims_limit must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend_timeout_secs: 45,
            max_ranked: 5,
            prompt_claims_limit: 20,
            // Corporate-form tokens as they appear in registry legal-form
            // fields; matched case-insensitively.
            preferred_legal_forms: [
                "INC",
                "CORP",
                "CORPORATION",
                "LLC",
                "LTD",
                "LIMITED",
                "GMBH",
                "AG",
                "SA",
                "PLC",
                "SE",
                "NV",
                "BV",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_shortlist_is_five() {
        assert_eq!(EngineConfig::default().max_ranked, 5);
    }

    #[test]
    fn test_zero_max_ranked_is_invalid() {
        let config = EngineConfig {
            max_ranked: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = EngineConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.max_ranked, config.max_ranked);
        assert_eq!(parsed.preferred_legal_forms, config.preferred_legal_forms);
    }
}
