//! Claim module - the candidate identity assertions under arbitration

use crate::lei::Lei;
use crate::metadata::ClaimMetadata;
use serde::{Deserialize, Serialize};

/// Claim number reserved for the website-derived baseline.
///
/// Claim 0 is always first, never excluded by the normalizer, and never
/// ranked by the engine; it only provides reference context.
pub const BASE_CLAIM_NUMBER: u32 = 0;

/// Where a claim came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Baseline derived from the website itself (always claim 0)
    WebsiteClaim,

    /// Extracted from raw content by a reasoning backend
    LlmExtracted,

    /// Candidate supplied by the GLEIF-style entity search
    GleifCandidate,
}

impl ClaimType {
    /// Get the claim type as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::WebsiteClaim => "website_claim",
            ClaimType::LlmExtracted => "llm_extracted",
            ClaimType::GleifCandidate => "gleif_candidate",
        }
    }

    /// Parse a claim type from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "website_claim" => Some(ClaimType::WebsiteClaim),
            "llm_extracted" => Some(ClaimType::LlmExtracted),
            "gleif_candidate" => Some(ClaimType::GleifCandidate),
            _ => None,
        }
    }
}

impl std::str::FromStr for ClaimType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid claim type: {}", s))
    }
}

/// A candidate assertion about the legal identity behind a domain.
///
/// Claim numbers are unique per arbitration request after normalization.
/// Claims are plain data; all validation lives in the normalizer so that a
/// `Claim` in hand is already canonical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Position in the claim set; 0 is the website baseline
    pub claim_number: u32,

    /// Provenance category
    pub claim_type: ClaimType,

    /// Asserted legal entity name
    pub entity_name: String,

    /// Validated LEI, when the source supplied one
    pub lei_code: Option<Lei>,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Free-text provenance tag
    pub source: String,

    /// Structured registry/enrichment data
    #[serde(default)]
    pub metadata: ClaimMetadata,
}

impl Claim {
    /// Create a claim with empty metadata
    pub fn new(
        claim_number: u32,
        claim_type: ClaimType,
        entity_name: impl Into<String>,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            claim_number,
            claim_type,
            entity_name: entity_name.into(),
            lei_code: None,
            confidence,
            source: source.into(),
            metadata: ClaimMetadata::default(),
        }
    }

    /// Attach a LEI
    pub fn with_lei(mut self, lei: Lei) -> Self {
        self.lei_code = Some(lei);
        self
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: ClaimMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether this is the website-derived baseline claim
    pub fn is_base_claim(&self) -> bool {
        self.claim_number == BASE_CLAIM_NUMBER
    }
}
