//! Arbitration output types: ranked entities, grades, the result envelope

use crate::lei::Lei;
use crate::metadata::ClaimMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model name recorded when the deterministic fallback produced the result.
pub const FALLBACK_MODEL: &str = "algorithmic-fallback";

/// Letter label summarizing ranking strength for acquisition use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    /// Score >= 0.9
    #[serde(rename = "A+")]
    APlus,

    /// Score >= 0.8
    #[serde(rename = "A")]
    A,

    /// Score >= 0.7
    #[serde(rename = "B+")]
    BPlus,

    /// Score >= 0.6
    #[serde(rename = "B")]
    B,

    /// Everything below
    #[serde(rename = "C")]
    C,
}

impl Grade {
    /// Map a combined score onto the grade ladder.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            Grade::APlus
        } else if score >= 0.8 {
            Grade::A
        } else if score >= 0.7 {
            Grade::BPlus
        } else if score >= 0.6 {
            Grade::B
        } else {
            Grade::C
        }
    }

    /// Get the grade as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
        }
    }

    /// Parse a grade from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A+" => Some(Grade::APlus),
            "A" => Some(Grade::A),
            "B+" => Some(Grade::BPlus),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            _ => None,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the ranked shortlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    /// Position, 1-based
    pub rank: u32,

    /// Entity name
    pub entity_name: String,

    /// LEI, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lei_code: Option<Lei>,

    /// Combined confidence, capped at 1.0
    pub confidence: f64,

    /// Why the entity landed at this rank
    pub reasoning: String,

    /// Acquisition grade
    pub acquisition_grade: Grade,

    /// Metadata carried over from the winning claim
    #[serde(default)]
    pub metadata: ClaimMetadata,
}

/// The outcome of one arbitration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationResult {
    /// Ordered shortlist, best first
    pub ranked_entities: Vec<RankedEntity>,

    /// Overall explanation of the ranking
    pub overall_reasoning: String,

    /// Raw model thinking, when the backend exposed it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_thinking: Option<String>,

    /// Source citations, when the backend supplied them
    #[serde(default)]
    pub citations: Vec<String>,

    /// End-to-end processing time, either ranking path
    pub processing_time_ms: u64,

    /// Backend model that produced the ranking, or `algorithmic-fallback`
    pub arbitrator_model: String,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: grade boundaries are monotonic in score
        #[test]
        fn test_grade_monotonic(a in 0.0f64..1.5, b in 0.0f64..1.5) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let order = |g: Grade| match g {
                Grade::C => 0,
                Grade::B => 1,
                Grade::BPlus => 2,
                Grade::A => 3,
                Grade::APlus => 4,
            };
            prop_assert!(order(Grade::from_score(lo)) <= order(Grade::from_score(hi)));
        }
    }
}
