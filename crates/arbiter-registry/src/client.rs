//! HTTP client for the GLEIF-style registry

use crate::RegistryError;
use arbiter_domain::traits::{EntitySearch, RelationshipRegistry};
use arbiter_domain::{Address, EntityCandidate, Lei, RelationshipRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default registry API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.gleif.org/api/v1";

/// Default timeout for registry requests (20 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default page size for candidate search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Client for the registry's search and relationship endpoints.
///
/// The registry is a black-box candidate supplier: this client only maps its
/// JSON:API payloads onto domain records, tolerating missing fields.
pub struct GleifClient {
    endpoint: String,
    client: reqwest::Client,
    search_limit: usize,
}

// Wire shapes, decoded tolerantly: any record missing its LEI is skipped.

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct RecordList<T> {
    #[serde(default)]
    data: Vec<T>,
}

#[derive(Deserialize)]
struct LeiRecord {
    attributes: Option<LeiRecordAttributes>,
    score: Option<f64>,
}

#[derive(Deserialize)]
struct LeiRecordAttributes {
    lei: Option<String>,
    entity: Option<EntityAttributes>,
    registration: Option<RegistrationAttributes>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityAttributes {
    legal_name: Option<LegalName>,
    legal_form: Option<LegalForm>,
    jurisdiction: Option<String>,
    status: Option<String>,
    legal_address: Option<WireAddress>,
    headquarters_address: Option<WireAddress>,
}

#[derive(Deserialize)]
struct LegalName {
    name: Option<String>,
}

#[derive(Deserialize)]
struct LegalForm {
    id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAddress {
    city: Option<String>,
    country: Option<String>,
    region: Option<String>,
    postal_code: Option<String>,
    #[serde(default)]
    address_lines: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationAttributes {
    status: Option<String>,
    last_update_date: Option<String>,
}

#[derive(Deserialize)]
struct RelationshipEnvelope {
    attributes: Option<RelationshipAttributes>,
}

#[derive(Deserialize)]
struct RelationshipAttributes {
    relationship: Option<WireRelationship>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRelationship {
    #[serde(rename = "type")]
    relationship_type: Option<String>,
    status: Option<String>,
    start_node: Option<WireNode>,
    end_node: Option<WireNode>,
}

#[derive(Deserialize)]
struct WireNode {
    id: Option<String>,
}

impl From<WireAddress> for Address {
    fn from(wire: WireAddress) -> Self {
        Address {
            city: wire.city,
            country: wire.country,
            region: wire.region,
            postal_code: wire.postal_code,
            address_line: wire.address_lines.into_iter().next(),
        }
    }
}

impl GleifClient {
    /// Create a client against the default endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client against a custom endpoint and timeout.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RegistryError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
            search_limit: DEFAULT_SEARCH_LIMIT,
        })
    }

    /// Set the maximum number of candidates returned per search
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, RegistryError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| RegistryError::Communication(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(format!("Failed to decode: {}", e)))
    }

    fn map_candidate(record: LeiRecord) -> Option<EntityCandidate> {
        let attributes = record.attributes?;
        let entity = attributes.entity?;
        let legal_name = entity.legal_name.and_then(|n| n.name)?;
        let registration = attributes.registration;

        Some(EntityCandidate {
            legal_name,
            lei: attributes.lei.as_deref().and_then(Lei::parse),
            jurisdiction: entity.jurisdiction,
            entity_status: entity.status,
            legal_form: entity.legal_form.and_then(|f| f.id),
            headquarters: entity.headquarters_address.map(Into::into),
            legal_address: entity.legal_address.map(Into::into),
            registration_status: registration.as_ref().and_then(|r| r.status.clone()),
            last_update_date: registration.and_then(|r| r.last_update_date),
            relevance_score: record.score,
        })
    }

    fn map_relationship(subject: &Lei, envelope: RelationshipEnvelope) -> Option<RelationshipRecord> {
        let relationship = envelope.attributes?.relationship?;
        let relationship_type = relationship.relationship_type?;

        // The related entity is whichever node is not the queried one.
        let start = relationship
            .start_node
            .and_then(|n| n.id)
            .as_deref()
            .and_then(Lei::parse);
        let end = relationship
            .end_node
            .and_then(|n| n.id)
            .as_deref()
            .and_then(Lei::parse);
        let related_lei = match (start, end) {
            (_, Some(end)) if end != *subject => end,
            (Some(start), _) if start != *subject => start,
            _ => return None,
        };

        Some(RelationshipRecord {
            related_lei,
            relationship_type,
            relationship_status: relationship.status,
        })
    }
}

#[async_trait]
impl EntitySearch for GleifClient {
    type Error = RegistryError;

    async fn search(
        &self,
        entity_name: &str,
        domain: &str,
    ) -> Result<Vec<EntityCandidate>, Self::Error> {
        let url = format!("{}/lei-records", self.endpoint);
        let query = [
            ("filter[fulltext]", entity_name.to_string()),
            ("page[size]", self.search_limit.to_string()),
        ];

        debug!(entity_name, domain, "Searching registry for candidates");

        let list: RecordList<LeiRecord> = self.get_json(&url, &query).await?;
        let total = list.data.len();
        let candidates: Vec<EntityCandidate> = list
            .data
            .into_iter()
            .filter_map(Self::map_candidate)
            .collect();

        if candidates.len() < total {
            warn!(
                skipped = total - candidates.len(),
                "Skipped malformed candidate records"
            );
        }

        Ok(candidates)
    }
}

#[async_trait]
impl RelationshipRegistry for GleifClient {
    type Error = RegistryError;

    async fn fetch_relationships(
        &self,
        lei: &Lei,
    ) -> Result<Vec<RelationshipRecord>, Self::Error> {
        let url = format!("{}/lei-records/{}/relationships", self.endpoint, lei);

        debug!(%lei, "Fetching relationship records");

        let list: RecordList<RelationshipEnvelope> = self.get_json(&url, &[]).await?;
        Ok(list
            .data
            .into_iter()
            .filter_map(|envelope| Self::map_relationship(lei, envelope))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_candidate_requires_legal_name() {
        let record: LeiRecord = serde_json::from_value(serde_json::json!({
            "attributes": { "lei": "5493001KJTIIGC8Y1R12", "entity": {} }
        }))
        .unwrap();
        assert!(GleifClient::map_candidate(record).is_none());
    }

    #[test]
    fn test_map_candidate_full_record() {
        let record: LeiRecord = serde_json::from_value(serde_json::json!({
            "attributes": {
                "lei": "5493001KJTIIGC8Y1R12",
                "entity": {
                    "legalName": { "name": "Acme Corporation" },
                    "legalForm": { "id": "XTIQ" },
                    "jurisdiction": "US",
                    "status": "ACTIVE",
                    "headquartersAddress": {
                        "city": "Wilmington",
                        "country": "US",
                        "addressLines": ["1209 Orange St"]
                    }
                },
                "registration": {
                    "status": "ISSUED",
                    "lastUpdateDate": "2025-05-01T00:00:00Z"
                }
            },
            "score": 0.87
        }))
        .unwrap();

        let candidate = GleifClient::map_candidate(record).unwrap();
        assert_eq!(candidate.legal_name, "Acme Corporation");
        assert_eq!(candidate.lei, Lei::parse("5493001KJTIIGC8Y1R12"));
        assert_eq!(candidate.entity_status.as_deref(), Some("ACTIVE"));
        assert_eq!(candidate.legal_form.as_deref(), Some("XTIQ"));
        assert_eq!(
            candidate.headquarters.unwrap().address_line.as_deref(),
            Some("1209 Orange St")
        );
        assert_eq!(candidate.relevance_score, Some(0.87));
    }

    #[test]
    fn test_map_relationship_picks_other_node() {
        let subject = Lei::parse("CHILD000000000000001").unwrap();
        let envelope: RelationshipEnvelope = serde_json::from_value(serde_json::json!({
            "attributes": {
                "relationship": {
                    "type": "IS_DIRECTLY_CONSOLIDATED_BY",
                    "status": "ACTIVE",
                    "startNode": { "id": "CHILD000000000000001" },
                    "endNode": { "id": "PARENT00000000000001" }
                }
            }
        }))
        .unwrap();

        let record = GleifClient::map_relationship(&subject, envelope).unwrap();
        assert_eq!(record.related_lei, Lei::parse("PARENT00000000000001").unwrap());
        assert_eq!(record.relationship_type, "IS_DIRECTLY_CONSOLIDATED_BY");
    }

    #[test]
    fn test_map_relationship_self_loop_is_dropped() {
        let subject = Lei::parse("ENTITY00000000000001").unwrap();
        let envelope: RelationshipEnvelope = serde_json::from_value(serde_json::json!({
            "attributes": {
                "relationship": {
                    "type": "IS_DIRECTLY_CONSOLIDATED_BY",
                    "startNode": { "id": "ENTITY00000000000001" },
                    "endNode": { "id": "ENTITY00000000000001" }
                }
            }
        }))
        .unwrap();

        assert!(GleifClient::map_relationship(&subject, envelope).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let client = GleifClient::with_endpoint("http://127.0.0.1:9", 1).unwrap();
        let result = client.search("Acme", "acme.com").await;
        assert!(matches!(result, Err(RegistryError::Communication(_))));
    }
}
