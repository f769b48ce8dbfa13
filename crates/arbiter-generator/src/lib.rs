//! Arbiter Claim Generator
//!
//! Assembles the claim set for one domain: a baseline "claim 0" describing
//! what the website itself implies, plus N candidate claims from the
//! entity-search collaborator.
//!
//! # Failure semantics
//!
//! The generator degrades instead of failing: a missing base entity falls
//! back through a priority chain ending at the domain name itself, an empty
//! search yields zero candidate claims, and only a totally unusable dump
//! produces the single synthetic low-confidence error-fallback claim.

#![warn(missing_docs)]

pub mod config;
pub mod confidence;
pub mod generator;
pub mod heuristics;
pub mod prompt;
pub mod types;

use thiserror::Error;

pub use config::GeneratorConfig;
pub use confidence::calculate_gleif_confidence;
pub use generator::ClaimGenerator;
pub use types::DomainDump;

/// Errors that can occur during claim generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// The dump carried nothing a base claim could be built from
    #[error("No base entity could be derived for domain '{0}'")]
    NoBaseEntity(String),

    /// Reasoning backend error during fallback name extraction
    #[error("LLM extraction error: {0}")]
    Llm(String),

    /// Extraction timed out
    #[error("LLM extraction timeout")]
    Timeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
