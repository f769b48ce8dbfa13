//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between decision logic and
//! infrastructure. Production implementations live in other crates; each
//! seam also has a test double (mock with call counter, always-fail stub).

use crate::{
    ArbitrationRequest, ArbitrationResult, BiasProfile, Claim, EntityCandidate, Lei,
    RelationshipCacheEntry, RelationshipRecord, RequestId, RequestStatus,
};
use async_trait::async_trait;

/// A pluggable reasoning backend for LLM-assisted ranking.
///
/// One blocking network round-trip per call; the engine wraps the call in a
/// bounded timeout and never retries it.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Error type for backend operations
    type Error: std::fmt::Display + Send;

    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// The model identifier recorded in results produced by this backend
    fn model_name(&self) -> &str;
}

/// The entity-search collaborator: name + domain hint in, candidates out.
#[async_trait]
pub trait EntitySearch: Send + Sync {
    /// Error type for search operations
    type Error: std::fmt::Display + Send;

    /// Search for candidate records matching an entity name
    async fn search(
        &self,
        entity_name: &str,
        domain: &str,
    ) -> Result<Vec<EntityCandidate>, Self::Error>;
}

/// The corporate-relationship registry: LEI in, relationship records out.
#[async_trait]
pub trait RelationshipRegistry: Send + Sync {
    /// Error type for registry operations
    type Error: std::fmt::Display + Send;

    /// Fetch all relationship records for an entity
    async fn fetch_relationships(&self, lei: &Lei)
        -> Result<Vec<RelationshipRecord>, Self::Error>;
}

/// Time-boxed storage for resolved relationships.
///
/// `put` is an upsert: a fresh entry for the same LEI overwrites the prior
/// one and resets its TTL. There is no locking discipline across callers;
/// concurrent writers for the same LEI are acceptable because last writer
/// wins.
pub trait RelationshipCache {
    /// Error type for cache operations
    type Error: std::fmt::Display;

    /// Read the entry for a LEI, expired or not
    fn get(&self, lei: &Lei) -> Result<Option<RelationshipCacheEntry>, Self::Error>;

    /// Upsert an entry, keyed by its LEI
    fn put(&mut self, entry: RelationshipCacheEntry) -> Result<(), Self::Error>;
}

/// Persistence for requests, claims, results, and bias profiles.
///
/// Implemented by the infrastructure layer (arbiter-store).
pub trait ArbitrationStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// Create a request row in `Pending`
    fn create_request(&mut self, domain: &str) -> Result<RequestId, Self::Error>;

    /// Transition a request's status; terminal states must be refused
    fn update_request_status(
        &mut self,
        id: RequestId,
        status: RequestStatus,
        error_message: Option<&str>,
    ) -> Result<(), Self::Error>;

    /// Fetch a request by id
    fn get_request(&self, id: RequestId) -> Result<Option<ArbitrationRequest>, Self::Error>;

    /// Persist the normalized claim set for a request
    fn insert_claims(&mut self, id: RequestId, claims: &[Claim]) -> Result<(), Self::Error>;

    /// Fetch the persisted claims for a request
    fn get_claims(&self, id: RequestId) -> Result<Vec<Claim>, Self::Error>;

    /// Persist the arbitration result for a request
    fn insert_result(
        &mut self,
        id: RequestId,
        result: &ArbitrationResult,
    ) -> Result<(), Self::Error>;

    /// Fetch the arbitration result for a request
    fn get_result(&self, id: RequestId) -> Result<Option<ArbitrationResult>, Self::Error>;

    /// Upsert a named bias profile
    fn upsert_profile(&mut self, profile: &BiasProfile) -> Result<(), Self::Error>;

    /// Fetch a bias profile by name
    fn get_profile(&self, name: &str) -> Result<Option<BiasProfile>, Self::Error>;

    /// Fetch the profile flagged default
    fn default_profile(&self) -> Result<BiasProfile, Self::Error>;

    /// List all profiles
    fn list_profiles(&self) -> Result<Vec<BiasProfile>, Self::Error>;
}
