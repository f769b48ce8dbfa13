//! Candidate records returned by the entity-search collaborator

use crate::metadata::{Address, ClaimMetadata};
use crate::lei::Lei;
use serde::{Deserialize, Serialize};

/// One candidate record from the entity-search collaborator.
///
/// Mapped 1:1 onto a `gleif_candidate` claim by the generator; the search
/// collaborator itself is a black box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCandidate {
    /// Registered legal name
    pub legal_name: String,

    /// LEI of the candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lei: Option<Lei>,

    /// Jurisdiction code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,

    /// Registry entity status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_status: Option<String>,

    /// Legal form code or label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<String>,

    /// Headquarters address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<Address>,

    /// Legal (registered) address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_address: Option<Address>,

    /// Registration status with the issuing authority
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<String>,

    /// Last registry update date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<String>,

    /// The collaborator's own relevance score for the query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

impl EntityCandidate {
    /// Carry the candidate's registry fields into claim metadata.
    pub fn to_metadata(&self) -> ClaimMetadata {
        ClaimMetadata {
            legal_name: Some(self.legal_name.clone()),
            jurisdiction: self.jurisdiction.clone(),
            entity_status: self.entity_status.clone(),
            legal_form: self.legal_form.clone(),
            headquarters: self.headquarters.clone(),
            legal_address: self.legal_address.clone(),
            registration_status: self.registration_status.clone(),
            last_update_date: self.last_update_date.clone(),
            search_score: self.relevance_score,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_metadata_carries_registry_fields() {
        let candidate = EntityCandidate {
            legal_name: "Acme Corporation".to_string(),
            lei: Lei::parse("A1234567890123456789"),
            jurisdiction: Some("US".to_string()),
            entity_status: Some("ACTIVE".to_string()),
            legal_form: Some("INC".to_string()),
            headquarters: None,
            legal_address: None,
            registration_status: Some("ISSUED".to_string()),
            last_update_date: Some("2025-06-01".to_string()),
            relevance_score: Some(0.91),
        };
        let meta = candidate.to_metadata();
        assert_eq!(meta.legal_name.as_deref(), Some("Acme Corporation"));
        assert_eq!(meta.jurisdiction.as_deref(), Some("US"));
        assert_eq!(meta.search_score, Some(0.91));
        assert_eq!(meta.hierarchy_level, None);
    }
}
