//! Arbiter Storage Layer
//!
//! SQLite persistence for arbitration requests, claims, results, bias
//! profiles, and the relationship cache.
//!
//! # Architecture
//!
//! `SqliteStore` implements both the `ArbitrationStore` trait and the
//! `RelationshipCache` trait, so the relationship resolver can run against
//! the persistent cache table or an in-memory cache interchangeably.
//!
//! # Thread Safety
//!
//! SQLite connections are not thread-safe; share a store behind a mutex,
//! as the pipeline does.

#![warn(missing_docs)]

use arbiter_domain::traits::{ArbitrationStore, RelationshipCache};
use arbiter_domain::{
    ArbitrationRequest, ArbitrationResult, BiasProfile, Claim, ClaimMetadata, ClaimType,
    EntityRelationships, Lei, RelationshipCacheEntry, RequestId, RequestStatus,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Refused status change on a terminal request
    #[error("Illegal status transition {from} -> {to}")]
    IllegalTransition {
        /// Current status
        from: &'static str,
        /// Requested status
        to: &'static str,
    },
}

/// SQLite-backed implementation of the persistence contracts
pub struct SqliteStore {
    conn: Connection,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl SqliteStore {
    /// Open (or create) a store at the given path.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing). The
    /// schema is applied and the default bias profile seeded on first open.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        store.seed_default_profile()?;
        Ok(store)
    }

    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Seed the built-in default profile unless one is already flagged.
    fn seed_default_profile(&mut self) -> Result<(), StoreError> {
        let has_default: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM bias_profiles WHERE is_default = 1 LIMIT 1",
                [],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if !has_default {
            self.upsert_profile(&BiasProfile::default())?;
        }
        Ok(())
    }

    fn request_id_to_bytes(id: RequestId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    fn bytes_to_request_id(bytes: &[u8]) -> Result<RequestId, StoreError> {
        if bytes.len() != 16 {
            return Err(StoreError::InvalidData(format!(
                "Expected 16 bytes for RequestId, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(bytes);
        Ok(RequestId::from_value(u128::from_be_bytes(arr)))
    }

    fn row_to_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArbitrationRequest> {
        let id_bytes: Vec<u8> = row.get(0)?;
        let id = Self::bytes_to_request_id(&id_bytes).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
        })?;
        let status_str: String = row.get(2)?;
        let status = RequestStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown status: {}", status_str).into(),
            )
        })?;

        Ok(ArbitrationRequest {
            id,
            domain: row.get(1)?,
            status,
            error_message: row.get(3)?,
            created_at: row.get::<_, i64>(4)? as u64,
            updated_at: row.get::<_, i64>(5)? as u64,
        })
    }
}

impl ArbitrationStore for SqliteStore {
    type Error = StoreError;

    fn create_request(&mut self, domain: &str) -> Result<RequestId, Self::Error> {
        let id = RequestId::new();
        let now = now_unix();
        self.conn.execute(
            "INSERT INTO requests (id, domain, status, error_message, created_at, updated_at)
             VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
            params![
                Self::request_id_to_bytes(id),
                domain,
                RequestStatus::Pending.as_str(),
                now as i64,
            ],
        )?;
        Ok(id)
    }

    fn update_request_status(
        &mut self,
        id: RequestId,
        status: RequestStatus,
        error_message: Option<&str>,
    ) -> Result<(), Self::Error> {
        let current = self
            .get_request(id)?
            .ok_or_else(|| StoreError::NotFound(format!("request {}", id)))?;

        // Terminal states are immutable.
        if !current.status.can_transition_to(status) {
            return Err(StoreError::IllegalTransition {
                from: current.status.as_str(),
                to: status.as_str(),
            });
        }

        self.conn.execute(
            "UPDATE requests SET status = ?2, error_message = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                Self::request_id_to_bytes(id),
                status.as_str(),
                error_message,
                now_unix() as i64,
            ],
        )?;
        Ok(())
    }

    fn get_request(&self, id: RequestId) -> Result<Option<ArbitrationRequest>, Self::Error> {
        let request = self
            .conn
            .query_row(
                "SELECT id, domain, status, error_message, created_at, updated_at
                 FROM requests WHERE id = ?1",
                params![Self::request_id_to_bytes(id)],
                Self::row_to_request,
            )
            .optional()?;
        Ok(request)
    }

    fn insert_claims(&mut self, id: RequestId, claims: &[Claim]) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        for claim in claims {
            tx.execute(
                "INSERT INTO claims
                 (request_id, claim_number, claim_type, entity_name, lei_code, confidence_score, source, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    Self::request_id_to_bytes(id),
                    claim.claim_number,
                    claim.claim_type.as_str(),
                    claim.entity_name,
                    claim.lei_code.as_ref().map(|l| l.as_str()),
                    claim.confidence,
                    claim.source,
                    serde_json::to_string(&claim.metadata)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_claims(&self, id: RequestId) -> Result<Vec<Claim>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT claim_number, claim_type, entity_name, lei_code, confidence_score, source, metadata
             FROM claims WHERE request_id = ?1 ORDER BY claim_number ASC",
        )?;

        let rows = stmt.query_map(params![Self::request_id_to_bytes(id)], |row| {
            let claim_type_str: String = row.get(1)?;
            let lei_code: Option<String> = row.get(3)?;
            let metadata_json: String = row.get(6)?;
            Ok((
                row.get::<_, u32>(0)?,
                claim_type_str,
                row.get::<_, String>(2)?,
                lei_code,
                row.get::<_, f64>(4)?,
                row.get::<_, String>(5)?,
                metadata_json,
            ))
        })?;

        let mut claims = Vec::new();
        for row in rows {
            let (number, type_str, entity_name, lei_code, confidence, source, metadata_json) =
                row?;
            let claim_type = ClaimType::parse(&type_str)
                .ok_or_else(|| StoreError::InvalidData(format!("claim type: {}", type_str)))?;
            let metadata: ClaimMetadata = serde_json::from_str(&metadata_json)?;
            claims.push(Claim {
                claim_number: number,
                claim_type,
                entity_name,
                lei_code: lei_code.as_deref().and_then(Lei::parse),
                confidence,
                source,
                metadata,
            });
        }
        Ok(claims)
    }

    fn insert_result(
        &mut self,
        id: RequestId,
        result: &ArbitrationResult,
    ) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO results
             (request_id, ranked_entities, overall_reasoning, detailed_thinking, citations, processing_time_ms, arbitrator_model)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                Self::request_id_to_bytes(id),
                serde_json::to_string(&result.ranked_entities)?,
                result.overall_reasoning,
                result.detailed_thinking,
                serde_json::to_string(&result.citations)?,
                result.processing_time_ms as i64,
                result.arbitrator_model,
            ],
        )?;
        Ok(())
    }

    fn get_result(&self, id: RequestId) -> Result<Option<ArbitrationResult>, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT ranked_entities, overall_reasoning, detailed_thinking, citations, processing_time_ms, arbitrator_model
                 FROM results WHERE request_id = ?1",
                params![Self::request_id_to_bytes(id)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((ranked, reasoning, thinking, citations, time_ms, model)) => {
                Ok(Some(ArbitrationResult {
                    ranked_entities: serde_json::from_str(&ranked)?,
                    overall_reasoning: reasoning,
                    detailed_thinking: thinking,
                    citations: serde_json::from_str(&citations)?,
                    processing_time_ms: time_ms as u64,
                    arbitrator_model: model,
                }))
            }
            None => Ok(None),
        }
    }

    fn upsert_profile(&mut self, profile: &BiasProfile) -> Result<(), Self::Error> {
        let tx = self.conn.transaction()?;
        if profile.is_default {
            // Only one profile carries the default flag.
            tx.execute("UPDATE bias_profiles SET is_default = 0", [])?;
        }
        tx.execute(
            "INSERT INTO bias_profiles
             (name, jurisdiction_primary, jurisdiction_secondary, prefer_parent,
              parent_weight, jurisdiction_weight, entity_status_weight, legal_form_weight, recency_weight, is_default)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(name) DO UPDATE SET
              jurisdiction_primary = excluded.jurisdiction_primary,
              jurisdiction_secondary = excluded.jurisdiction_secondary,
              prefer_parent = excluded.prefer_parent,
              parent_weight = excluded.parent_weight,
              jurisdiction_weight = excluded.jurisdiction_weight,
              entity_status_weight = excluded.entity_status_weight,
              legal_form_weight = excluded.legal_form_weight,
              recency_weight = excluded.recency_weight,
              is_default = excluded.is_default",
            params![
                profile.name,
                profile.jurisdiction_primary,
                serde_json::to_string(&profile.jurisdiction_secondary)?,
                profile.prefer_parent,
                profile.parent_weight,
                profile.jurisdiction_weight,
                profile.entity_status_weight,
                profile.legal_form_weight,
                profile.recency_weight,
                profile.is_default,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_profile(&self, name: &str) -> Result<Option<BiasProfile>, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT name, jurisdiction_primary, jurisdiction_secondary, prefer_parent,
                        parent_weight, jurisdiction_weight, entity_status_weight, legal_form_weight, recency_weight, is_default
                 FROM bias_profiles WHERE name = ?1",
                params![name],
                Self::row_to_profile,
            )
            .optional()?;

        match row {
            Some((profile, secondary_json)) => {
                let mut profile = profile;
                profile.jurisdiction_secondary = serde_json::from_str(&secondary_json)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    fn default_profile(&self) -> Result<BiasProfile, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT name, jurisdiction_primary, jurisdiction_secondary, prefer_parent,
                        parent_weight, jurisdiction_weight, entity_status_weight, legal_form_weight, recency_weight, is_default
                 FROM bias_profiles WHERE is_default = 1 LIMIT 1",
                [],
                Self::row_to_profile,
            )
            .optional()?;

        match row {
            Some((profile, secondary_json)) => {
                let mut profile = profile;
                profile.jurisdiction_secondary = serde_json::from_str(&secondary_json)?;
                Ok(profile)
            }
            None => Ok(BiasProfile::default()),
        }
    }

    fn list_profiles(&self) -> Result<Vec<BiasProfile>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT name, jurisdiction_primary, jurisdiction_secondary, prefer_parent,
                    parent_weight, jurisdiction_weight, entity_status_weight, legal_form_weight, recency_weight, is_default
             FROM bias_profiles ORDER BY name ASC",
        )?;

        let rows = stmt.query_map([], Self::row_to_profile)?;
        let mut profiles = Vec::new();
        for row in rows {
            let (mut profile, secondary_json) = row?;
            profile.jurisdiction_secondary = serde_json::from_str(&secondary_json)?;
            profiles.push(profile);
        }
        Ok(profiles)
    }
}

impl SqliteStore {
    /// Map a bias-profile row; the secondary-jurisdiction JSON is decoded
    /// by the caller (rusqlite closures cannot return serde errors cleanly).
    #[allow(clippy::type_complexity)]
    fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<(BiasProfile, String)> {
        Ok((
            BiasProfile {
                name: row.get(0)?,
                jurisdiction_primary: row.get(1)?,
                jurisdiction_secondary: Vec::new(),
                prefer_parent: row.get(3)?,
                parent_weight: row.get(4)?,
                jurisdiction_weight: row.get(5)?,
                entity_status_weight: row.get(6)?,
                legal_form_weight: row.get(7)?,
                recency_weight: row.get(8)?,
                is_default: row.get(9)?,
            },
            row.get(2)?,
        ))
    }
}

impl RelationshipCache for SqliteStore {
    type Error = StoreError;

    fn get(&self, lei: &Lei) -> Result<Option<RelationshipCacheEntry>, Self::Error> {
        let row = self
            .conn
            .query_row(
                "SELECT lei_code, parent_lei, ultimate_parent_lei, relationship_type, relationship_status, raw_payload, cached_at, expires_at
                 FROM relationship_cache WHERE lei_code = ?1",
                params![lei.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, i64>(6)?,
                        row.get::<_, i64>(7)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((
                lei_str,
                parent,
                ultimate,
                rel_type,
                rel_status,
                payload,
                cached_at,
                expires_at,
            )) => {
                let lei = Lei::parse(&lei_str)
                    .ok_or_else(|| StoreError::InvalidData(format!("cached LEI: {}", lei_str)))?;
                let relationships: EntityRelationships = serde_json::from_str(&payload)?;
                Ok(Some(RelationshipCacheEntry {
                    lei,
                    parent_lei: parent.as_deref().and_then(Lei::parse),
                    ultimate_parent_lei: ultimate.as_deref().and_then(Lei::parse),
                    relationship_type: rel_type,
                    relationship_status: rel_status,
                    relationships,
                    cached_at: cached_at as u64,
                    expires_at: expires_at as u64,
                }))
            }
            None => Ok(None),
        }
    }

    fn put(&mut self, entry: RelationshipCacheEntry) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO relationship_cache
             (lei_code, parent_lei, ultimate_parent_lei, relationship_type, relationship_status, raw_payload, cached_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(lei_code) DO UPDATE SET
              parent_lei = excluded.parent_lei,
              ultimate_parent_lei = excluded.ultimate_parent_lei,
              relationship_type = excluded.relationship_type,
              relationship_status = excluded.relationship_status,
              raw_payload = excluded.raw_payload,
              cached_at = excluded.cached_at,
              expires_at = excluded.expires_at",
            params![
                entry.lei.as_str(),
                entry.parent_lei.as_ref().map(|l| l.as_str()),
                entry.ultimate_parent_lei.as_ref().map(|l| l.as_str()),
                entry.relationship_type,
                entry.relationship_status,
                serde_json::to_string(&entry.relationships)?,
                entry.cached_at as i64,
                entry.expires_at as i64,
            ],
        )?;
        Ok(())
    }
}
