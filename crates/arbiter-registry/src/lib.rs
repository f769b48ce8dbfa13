//! Arbiter Registry Layer
//!
//! Integration with the GLEIF-style registry: entity search (candidate
//! supply for claim generation) and corporate-relationship resolution with a
//! time-boxed cache.
//!
//! # Architecture
//!
//! - `GleifClient` implements the `EntitySearch` and `RelationshipRegistry`
//!   traits over HTTP
//! - `RelationshipResolver` layers cache-first resolution, hierarchy
//!   classification, and the ultimate-parent walk on top of any registry
//! - `MemoryRelationshipCache` is the in-process cache; `arbiter-store`
//!   provides the persistent one behind the same trait

#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod resolver;

use thiserror::Error;

pub use cache::MemoryRelationshipCache;
pub use client::GleifClient;
pub use resolver::RelationshipResolver;

/// Errors that can occur talking to the registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// HTTP error status from the registry
    #[error("Registry returned HTTP {0}")]
    Status(u16),

    /// Generic error
    #[error("Registry error: {0}")]
    Other(String),
}
