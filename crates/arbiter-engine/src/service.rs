//! End-to-end request pipeline
//!
//! Owns one arbitration request at a time: create the request row, then
//! generate, normalize, persist claims, arbitrate, and persist the result,
//! keeping the request's lifecycle state honest along the way. Callers
//! observe progress by polling the store by request id; there is no
//! mid-request cancellation.

use crate::engine::ArbitrationEngine;
use crate::EngineError;
use arbiter_domain::traits::{
    ArbitrationStore, EntitySearch, ReasoningBackend, RelationshipCache, RelationshipRegistry,
};
use arbiter_domain::{
    ArbitrationRequest, ArbitrationResult, BiasProfile, RequestId, RequestStatus,
};
use arbiter_generator::{ClaimGenerator, DomainDump};
use arbiter_normalizer::ClaimNormalizer;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The per-request pipeline over explicitly wired services.
///
/// Claim generation, normalization, and ranking failures all degrade inside
/// their stages; the request only transitions to `Failed` on persistence
/// errors. Claims or partial rows written before such a failure are kept.
pub struct RequestPipeline<L, S, R, C, St>
where
    L: ReasoningBackend,
    S: EntitySearch,
    R: RelationshipRegistry,
    C: RelationshipCache,
    St: ArbitrationStore,
{
    generator: ClaimGenerator<L, S>,
    normalizer: ClaimNormalizer,
    engine: ArbitrationEngine<L, R, C>,
    store: Arc<Mutex<St>>,
}

impl<L, S, R, C, St> RequestPipeline<L, S, R, C, St>
where
    L: ReasoningBackend + 'static,
    S: EntitySearch,
    R: RelationshipRegistry + 'static,
    C: RelationshipCache + Send + 'static,
    St: ArbitrationStore,
{
    /// Wire a pipeline from its services
    pub fn new(
        generator: ClaimGenerator<L, S>,
        engine: ArbitrationEngine<L, R, C>,
        store: St,
    ) -> Self {
        Self {
            generator,
            normalizer: ClaimNormalizer::new(),
            engine,
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Shared handle to the underlying store
    pub fn store(&self) -> Arc<Mutex<St>> {
        Arc::clone(&self.store)
    }

    /// Run one arbitration request to a terminal state.
    pub async fn process(
        &self,
        dump: &DomainDump,
        profile_name: Option<&str>,
    ) -> Result<(RequestId, ArbitrationResult), EngineError> {
        let request_id = self.with_store(|s| s.create_request(&dump.domain))?;
        info!(%request_id, domain = %dump.domain, "Arbitration request created");

        match self.run_stages(request_id, dump, profile_name).await {
            Ok(result) => Ok((request_id, result)),
            Err(e) => {
                if let Err(mark) = self.with_store(|s| {
                    s.update_request_status(
                        request_id,
                        RequestStatus::Failed,
                        Some(&e.to_string()),
                    )
                }) {
                    warn!(%request_id, "Could not mark request failed: {}", mark);
                }
                Err(e)
            }
        }
    }

    /// Poll a request's lifecycle state
    pub fn status(&self, id: RequestId) -> Result<Option<ArbitrationRequest>, EngineError> {
        self.with_store(|s| s.get_request(id))
    }

    /// Fetch a request's persisted result
    pub fn result(&self, id: RequestId) -> Result<Option<ArbitrationResult>, EngineError> {
        self.with_store(|s| s.get_result(id))
    }

    async fn run_stages(
        &self,
        id: RequestId,
        dump: &DomainDump,
        profile_name: Option<&str>,
    ) -> Result<ArbitrationResult, EngineError> {
        self.with_store(|s| s.update_request_status(id, RequestStatus::Processing, None))?;

        let generated = self.generator.assemble_claims(dump).await;
        let raw: Vec<Value> = generated
            .iter()
            .map(|claim| serde_json::to_value(claim).unwrap_or(Value::Null))
            .collect();

        let outcome = self.normalizer.normalize_claims(&raw);
        for error in &outcome.errors {
            warn!(%id, "{}", error);
        }
        for warning in &outcome.warnings {
            debug!(%id, "{}", warning);
        }

        self.with_store(|s| s.insert_claims(id, &outcome.normalized_claims))?;

        let bias = self.resolve_bias(profile_name)?;
        let mut claims = outcome.normalized_claims;
        let result = self.engine.arbitrate(&mut claims, &bias).await;

        self.with_store(|s| s.insert_result(id, &result))?;
        self.with_store(|s| s.update_request_status(id, RequestStatus::Completed, None))?;

        Ok(result)
    }

    fn resolve_bias(&self, name: Option<&str>) -> Result<BiasProfile, EngineError> {
        match name {
            Some(name) => match self.with_store(|s| s.get_profile(name))? {
                Some(profile) => Ok(profile),
                None => {
                    warn!(profile = name, "Unknown bias profile, using default");
                    self.with_store(|s| s.default_profile())
                }
            },
            None => self.with_store(|s| s.default_profile()),
        }
    }

    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut St) -> Result<T, St::Error>,
    ) -> Result<T, EngineError> {
        let mut store = self
            .store
            .lock()
            .map_err(|_| EngineError::Store("store lock poisoned".to_string()))?;
        f(&mut store).map_err(|e| EngineError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use arbiter_domain::outcome::FALLBACK_MODEL;
    use arbiter_domain::{Claim, EntityCandidate, Lei, RelationshipRecord};
    use arbiter_generator::GeneratorConfig;
    use arbiter_llm::FailingBackend;
    use arbiter_registry::{MemoryRelationshipCache, RelationshipResolver};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    struct MockSearch(Vec<EntityCandidate>);

    #[async_trait]
    impl EntitySearch for MockSearch {
        type Error = String;

        async fn search(
            &self,
            _entity_name: &str,
            _domain: &str,
        ) -> Result<Vec<EntityCandidate>, Self::Error> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct MockRegistry;

    #[async_trait]
    impl RelationshipRegistry for MockRegistry {
        type Error = String;

        async fn fetch_relationships(
            &self,
            _lei: &Lei,
        ) -> Result<Vec<RelationshipRecord>, Self::Error> {
            Ok(Vec::new())
        }
    }

    /// In-memory ArbitrationStore double; `fail_on_result` simulates the
    /// one unrecoverable failure class.
    #[derive(Default)]
    struct MemoryStore {
        requests: HashMap<RequestId, ArbitrationRequest>,
        claims: HashMap<RequestId, Vec<Claim>>,
        results: HashMap<RequestId, ArbitrationResult>,
        profiles: HashMap<String, BiasProfile>,
        fail_on_result: bool,
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    impl ArbitrationStore for MemoryStore {
        type Error = String;

        fn create_request(&mut self, domain: &str) -> Result<RequestId, Self::Error> {
            let id = RequestId::new();
            self.requests.insert(
                id,
                ArbitrationRequest {
                    id,
                    domain: domain.to_string(),
                    status: RequestStatus::Pending,
                    error_message: None,
                    created_at: now(),
                    updated_at: now(),
                },
            );
            Ok(id)
        }

        fn update_request_status(
            &mut self,
            id: RequestId,
            status: RequestStatus,
            error_message: Option<&str>,
        ) -> Result<(), Self::Error> {
            let request = self.requests.get_mut(&id).ok_or("request not found")?;
            if !request.status.can_transition_to(status) {
                return Err(format!(
                    "illegal transition {:?} -> {:?}",
                    request.status, status
                ));
            }
            request.status = status;
            request.error_message = error_message.map(String::from);
            request.updated_at = now();
            Ok(())
        }

        fn get_request(&self, id: RequestId) -> Result<Option<ArbitrationRequest>, Self::Error> {
            Ok(self.requests.get(&id).cloned())
        }

        fn insert_claims(&mut self, id: RequestId, claims: &[Claim]) -> Result<(), Self::Error> {
            self.claims.insert(id, claims.to_vec());
            Ok(())
        }

        fn get_claims(&self, id: RequestId) -> Result<Vec<Claim>, Self::Error> {
            Ok(self.claims.get(&id).cloned().unwrap_or_default())
        }

        fn insert_result(
            &mut self,
            id: RequestId,
            result: &ArbitrationResult,
        ) -> Result<(), Self::Error> {
            if self.fail_on_result {
                return Err("disk full".to_string());
            }
            self.results.insert(id, result.clone());
            Ok(())
        }

        fn get_result(&self, id: RequestId) -> Result<Option<ArbitrationResult>, Self::Error> {
            Ok(self.results.get(&id).cloned())
        }

        fn upsert_profile(&mut self, profile: &BiasProfile) -> Result<(), Self::Error> {
            self.profiles.insert(profile.name.clone(), profile.clone());
            Ok(())
        }

        fn get_profile(&self, name: &str) -> Result<Option<BiasProfile>, Self::Error> {
            Ok(self.profiles.get(name).cloned())
        }

        fn default_profile(&self) -> Result<BiasProfile, Self::Error> {
            Ok(self
                .profiles
                .values()
                .find(|p| p.is_default)
                .cloned()
                .unwrap_or_default())
        }

        fn list_profiles(&self) -> Result<Vec<BiasProfile>, Self::Error> {
            Ok(self.profiles.values().cloned().collect())
        }
    }

    fn candidate() -> EntityCandidate {
        EntityCandidate {
            legal_name: "Acme Corporation".to_string(),
            lei: Lei::parse("A1234567890123456789"),
            jurisdiction: Some("US".to_string()),
            entity_status: Some("ACTIVE".to_string()),
            legal_form: None,
            headquarters: None,
            legal_address: None,
            registration_status: None,
            last_update_date: None,
            relevance_score: None,
        }
    }

    fn pipeline(
        store: MemoryStore,
    ) -> RequestPipeline<FailingBackend, MockSearch, MockRegistry, MemoryRelationshipCache, MemoryStore>
    {
        let generator = ClaimGenerator::new(
            FailingBackend::new(),
            MockSearch(vec![candidate()]),
            GeneratorConfig::default(),
        );
        let resolver = RelationshipResolver::new(MockRegistry, MemoryRelationshipCache::new());
        let engine = ArbitrationEngine::new(FailingBackend::new(), resolver, EngineConfig::default());
        RequestPipeline::new(generator, engine, store)
    }

    fn dump() -> DomainDump {
        DomainDump {
            domain: "acme.com".to_string(),
            primary_entity: Some("Acme Corporation".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_full_request_completes() {
        let p = pipeline(MemoryStore::default());

        let (id, result) = p.process(&dump(), None).await.unwrap();

        let request = p.status(id).unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
        assert_eq!(request.domain, "acme.com");

        // The failing backend forces the deterministic path.
        assert_eq!(result.arbitrator_model, FALLBACK_MODEL);
        assert_eq!(result.ranked_entities.len(), 1);
        assert_eq!(result.ranked_entities[0].entity_name, "Acme Corporation");

        let stored = p.result(id).unwrap().unwrap();
        assert_eq!(stored, result);
    }

    #[tokio::test]
    async fn test_claims_are_persisted() {
        let p = pipeline(MemoryStore::default());
        let (id, _) = p.process(&dump(), None).await.unwrap();

        let store = p.store();
        let claims = store.lock().unwrap().get_claims(id).unwrap();
        assert_eq!(claims.len(), 2);
        assert!(claims[0].is_base_claim());
        assert_eq!(claims[1].entity_name, "Acme Corporation");
    }

    #[tokio::test]
    async fn test_persistence_failure_marks_request_failed() {
        let store = MemoryStore {
            fail_on_result: true,
            ..Default::default()
        };
        let p = pipeline(store);

        let err = p.process(&dump(), None).await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));

        // The request row reached Failed with the message set; the claims
        // written before the failure are still there.
        let store = p.store();
        let store = store.lock().unwrap();
        let request = store
            .requests
            .values()
            .next()
            .expect("request row must exist");
        assert_eq!(request.status, RequestStatus::Failed);
        assert!(request.error_message.as_deref().unwrap().contains("disk full"));
        assert_eq!(store.claims.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_profile_falls_back_to_default() {
        let p = pipeline(MemoryStore::default());
        let (_, result) = p.process(&dump(), Some("nonexistent")).await.unwrap();
        assert!(result.overall_reasoning.contains("default"));
    }

    #[tokio::test]
    async fn test_named_profile_is_used() {
        let mut store = MemoryStore::default();
        store
            .upsert_profile(&BiasProfile {
                name: "eu-focus".to_string(),
                jurisdiction_primary: "DE".to_string(),
                is_default: false,
                ..BiasProfile::default()
            })
            .unwrap();
        let p = pipeline(store);

        let (_, result) = p.process(&dump(), Some("eu-focus")).await.unwrap();
        assert!(result.overall_reasoning.contains("eu-focus"));
    }
}
