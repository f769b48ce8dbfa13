//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] arbiter_store::StoreError),

    /// Pipeline error
    #[error("Pipeline error: {0}")]
    Engine(#[from] arbiter_engine::EngineError),

    /// Backend construction error
    #[error("Backend error: {0}")]
    Backend(#[from] arbiter_llm::LlmError),

    /// Registry client error
    #[error("Registry error: {0}")]
    Registry(#[from] arbiter_registry::RegistryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
