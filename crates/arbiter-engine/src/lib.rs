//! Arbiter Arbitration Engine
//!
//! Ranks competing identity claims into an explainable shortlist. Per
//! request the engine runs enrich, then rank (primary), then rank
//! (fallback) when the primary path fails, then persist:
//!
//! - **Enrichment** attaches corporate-hierarchy data to every claim that
//!   carries a LEI, fanned out concurrently per claim
//! - The **primary path** asks a pluggable reasoning backend to rank the
//!   claims under the user's weighting policy, single attempt, bounded
//!   timeout
//! - The **fallback path** is a deterministic scorer that takes over
//!   whenever the backend errors, times out, or yields nothing usable
//!
//! The `RequestPipeline` wraps the engine with the request lifecycle:
//! claim generation, normalization, persistence, and status transitions.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod service;

use thiserror::Error;

pub use config::EngineConfig;
pub use engine::ArbitrationEngine;
pub use fallback::FallbackRanker;
pub use prompt::PromptBuilder;
pub use service::RequestPipeline;

/// Errors that can occur during arbitration
#[derive(Error, Debug)]
pub enum EngineError {
    /// Reasoning backend call failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Reasoning backend call exceeded its timeout
    #[error("Backend timeout")]
    Timeout,

    /// Backend response could not be decoded as a ranking envelope
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// Backend response decoded but ranked nothing
    #[error("Backend ranked zero entities")]
    EmptyRanking,

    /// Persistence error; the only unrecoverable kind
    #[error("Store error: {0}")]
    Store(String),
}
