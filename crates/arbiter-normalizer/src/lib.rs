//! Arbiter Claim Normalizer
//!
//! Validates, canonicalizes, and deduplicates raw claim records into the
//! strict internal schema.
//!
//! # Behavior
//!
//! - Heterogeneous field casing is resolved through ordered alias lists
//! - Claim 0 (the website baseline) gets relaxed validation and is never
//!   rejected
//! - All other claims pass strict per-claim validation; a violation excludes
//!   that claim with a typed error record and never aborts the batch
//! - LEIs and confidences are normalized with warnings rather than errors
//!   where the field is optional or recoverable
//! - Duplicates collapse by LEI (highest confidence wins), then by exact
//!   entity-name match (first occurrence wins)

#![warn(missing_docs)]

pub mod normalizer;
pub mod outcome;

pub use normalizer::{ClaimNormalizer, UNKNOWN_ENTITY_PLACEHOLDER, WEBSITE_SOURCE};
pub use outcome::{ClaimError, NormalizationOutcome, NormalizationStats};
