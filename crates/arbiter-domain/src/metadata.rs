//! Structured claim metadata carried from registry records and enrichment

use crate::hierarchy::HierarchyLevel;
use crate::lei::Lei;
use serde::{Deserialize, Serialize};

/// A postal address as supplied by the registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// City name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// ISO country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Region/state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Postal code
    #[serde(alias = "postalCode", skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// First address line
    #[serde(alias = "addressLine", skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,
}

impl Address {
    /// Whether no component is populated
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.country.is_none()
            && self.region.is_none()
            && self.postal_code.is_none()
            && self.address_line.is_none()
    }
}

/// Optional structured block attached to a claim.
///
/// Registry-sourced fields are populated by the claim generator; the
/// `hierarchy_level`/`has_parent`/`ultimate_parent_lei` trio is written by
/// the arbitration engine's enrichment stage.
///
/// Ingestion accepts both snake_case and camelCase keys; serialization is
/// always snake_case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimMetadata {
    /// Registered legal name
    #[serde(alias = "legalName", skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,

    /// Jurisdiction code (e.g. "US", "DE")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,

    /// Registry entity status (e.g. "ACTIVE")
    #[serde(alias = "entityStatus", skip_serializing_if = "Option::is_none")]
    pub entity_status: Option<String>,

    /// Legal form code or label
    #[serde(alias = "legalForm", skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<String>,

    /// Headquarters address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<Address>,

    /// Legal (registered) address
    #[serde(alias = "legalAddress", skip_serializing_if = "Option::is_none")]
    pub legal_address: Option<Address>,

    /// Registration status with the issuing authority
    #[serde(alias = "registrationStatus", skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<String>,

    /// Last registry update, RFC 3339 or `YYYY-MM-DD`
    #[serde(alias = "lastUpdateDate", skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<String>,

    /// Relevance score reported by the entity search collaborator
    #[serde(alias = "searchScore", skip_serializing_if = "Option::is_none")]
    pub search_score: Option<f64>,

    /// Corporate-hierarchy position, written by enrichment
    #[serde(alias = "hierarchyLevel", skip_serializing_if = "Option::is_none")]
    pub hierarchy_level: Option<HierarchyLevel>,

    /// Whether a direct parent was found, written by enrichment
    #[serde(alias = "hasParent", skip_serializing_if = "Option::is_none")]
    pub has_parent: Option<bool>,

    /// Ultimate parent LEI, written by enrichment
    #[serde(alias = "ultimateParentLei", skip_serializing_if = "Option::is_none")]
    pub ultimate_parent_lei: Option<Lei>,
}
