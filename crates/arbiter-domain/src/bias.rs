//! User bias profiles - named weighting policies for the ranking engine

use serde::{Deserialize, Serialize};

/// A named weighting policy steering arbitration.
///
/// The five weights are independent dials and are deliberately never
/// validated to sum to 1; only the final combined fallback score is capped
/// at 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasProfile {
    /// Profile name, unique in the store
    pub name: String,

    /// Primary jurisdiction (full weight on match)
    pub jurisdiction_primary: String,

    /// Secondary jurisdictions (half weight on match)
    #[serde(default)]
    pub jurisdiction_secondary: Vec<String>,

    /// Whether parent entities should be surfaced over subsidiaries
    pub prefer_parent: bool,

    /// Weight of corporate-hierarchy position
    pub parent_weight: f64,

    /// Weight of jurisdiction match
    pub jurisdiction_weight: f64,

    /// Weight of an ACTIVE registry status
    pub entity_status_weight: f64,

    /// Weight of a preferred legal form
    pub legal_form_weight: f64,

    /// Weight of registry-record recency
    pub recency_weight: f64,

    /// Whether this is the store's default profile
    #[serde(default)]
    pub is_default: bool,
}

impl BiasProfile {
    /// Jurisdiction score for a candidate: 1.0 primary, 0.5 secondary, 0 otherwise.
    pub fn jurisdiction_score(&self, jurisdiction: &str) -> f64 {
        if jurisdiction.eq_ignore_ascii_case(&self.jurisdiction_primary) {
            1.0
        } else if self
            .jurisdiction_secondary
            .iter()
            .any(|j| j.eq_ignore_ascii_case(jurisdiction))
        {
            0.5
        } else {
            0.0
        }
    }

    /// Express a weight as a whole percentage for prompt text.
    pub fn as_percent(weight: f64) -> u32 {
        (weight * 100.0).round() as u32
    }
}

impl Default for BiasProfile {
    /// The seeded default: US-primary acquisition targeting.
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            jurisdiction_primary: "US".to_string(),
            jurisdiction_secondary: vec!["GB".to_string(), "CA".to_string(), "DE".to_string()],
            prefer_parent: true,
            parent_weight: 0.4,
            jurisdiction_weight: 0.3,
            entity_status_weight: 0.1,
            legal_form_weight: 0.05,
            recency_weight: 0.05,
            is_default: true,
        }
    }
}
