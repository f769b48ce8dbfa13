//! Normalization outcome types

use arbiter_domain::Claim;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A per-claim validation failure.
///
/// Indexed by position in the raw input batch, not by claim number, so
/// errors stay addressable even when the claim number itself was the
/// problem.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("claim {claim_index}: {field}: {issue}")]
pub struct ClaimError {
    /// Position of the offending record in the input batch
    pub claim_index: usize,

    /// Field that failed validation
    pub field: String,

    /// What was wrong
    pub issue: String,
}

/// Counters describing one normalization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Records in the raw input batch
    pub total_claims: usize,

    /// Claims that survived validation and deduplication
    pub valid_claims: usize,

    /// Claims excluded by validation errors
    pub rejected_claims: usize,

    /// Claims collapsed by LEI or exact-name deduplication
    pub duplicates_removed: usize,

    /// Field-level transformations (defaults, clamps, fallbacks, nulling)
    pub transformations_applied: usize,
}

/// The result of normalizing one raw claim batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationOutcome {
    /// Whether at least one claim survived
    pub success: bool,

    /// Canonical claims, sorted ascending by claim number
    pub normalized_claims: Vec<Claim>,

    /// Per-claim validation failures
    pub errors: Vec<ClaimError>,

    /// Recoverable anomalies (nulled LEIs, defaulted confidences, ...)
    pub warnings: Vec<String>,

    /// Run counters
    pub stats: NormalizationStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_error_display() {
        let error = ClaimError {
            claim_index: 3,
            field: "entity_name".to_string(),
            issue: "missing".to_string(),
        };
        assert_eq!(error.to_string(), "claim 3: entity_name: missing");
    }
}
