//! Core arbitration engine

use crate::config::EngineConfig;
use crate::fallback::FallbackRanker;
use crate::parser::{parse_arbitration_response, ArbitrationEnvelope};
use crate::prompt::PromptBuilder;
use crate::EngineError;
use arbiter_domain::outcome::FALLBACK_MODEL;
use arbiter_domain::traits::{ReasoningBackend, RelationshipCache, RelationshipRegistry};
use arbiter_domain::{
    ArbitrationResult, BiasProfile, Claim, Grade, Lei, RankedEntity,
};
use arbiter_registry::RelationshipResolver;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Ranks enriched claims under a bias profile via a pluggable reasoning
/// backend, with a deterministic algorithmic fallback.
///
/// All ranking failures are absorbed: `arbitrate` always produces a result,
/// and `arbitrator_model` records which path produced it.
pub struct ArbitrationEngine<L, R, C>
where
    L: ReasoningBackend,
    R: RelationshipRegistry,
    C: RelationshipCache,
{
    backend: Arc<L>,
    resolver: Arc<RelationshipResolver<R, C>>,
    config: EngineConfig,
    ranker: FallbackRanker,
}

impl<L, R, C> ArbitrationEngine<L, R, C>
where
    L: ReasoningBackend + 'static,
    R: RelationshipRegistry + 'static,
    C: RelationshipCache + Send + 'static,
{
    /// Create an engine over a backend and a relationship resolver
    pub fn new(backend: L, resolver: RelationshipResolver<R, C>, config: EngineConfig) -> Self {
        let ranker = FallbackRanker::new(&config);
        Self {
            backend: Arc::new(backend),
            resolver: Arc::new(resolver),
            config,
            ranker,
        }
    }

    /// Arbitrate a normalized claim set.
    ///
    /// Enriches claims in place, then ranks: one backend attempt with a
    /// bounded timeout, falling through to the deterministic scorer on any
    /// error, timeout, unparsable reply, or empty ranking.
    pub async fn arbitrate(&self, claims: &mut [Claim], bias: &BiasProfile) -> ArbitrationResult {
        let start = Instant::now();

        self.enrich_claims(claims).await;

        let mut result = match self.rank_with_backend(claims, bias).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Primary ranking failed, using deterministic fallback: {}", e);
                self.fallback_result(claims, bias)
            }
        };

        result.processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            model = %result.arbitrator_model,
            ranked = result.ranked_entities.len(),
            elapsed_ms = result.processing_time_ms,
            "Arbitration complete"
        );
        result
    }

    /// Attach hierarchy data to every claim with a LEI.
    ///
    /// The per-claim resolutions are independent and each writes only its
    /// own claim's metadata, so they are issued concurrently; completion
    /// order does not matter.
    pub async fn enrich_claims(&self, claims: &mut [Claim]) {
        let mut set = JoinSet::new();

        for (idx, claim) in claims.iter().enumerate() {
            if claim.is_base_claim() {
                continue;
            }
            let Some(lei) = claim.lei_code.clone() else {
                continue;
            };
            let resolver = Arc::clone(&self.resolver);
            set.spawn(async move {
                let relationships = resolver.get_relationships(&lei).await;
                (idx, relationships)
            });
        }

        while let Some(joined) = set.join_next().await {
            let Ok((idx, Some(relationships))) = joined else {
                continue;
            };
            let meta = &mut claims[idx].metadata;
            meta.hierarchy_level = Some(relationships.hierarchy_level());
            meta.has_parent = Some(!relationships.parents.is_empty());
            meta.ultimate_parent_lei = relationships.ultimate_parent.clone();
            debug!(
                claim = claims[idx].claim_number,
                level = ?claims[idx].metadata.hierarchy_level,
                "Claim enriched"
            );
        }
    }

    async fn rank_with_backend(
        &self,
        claims: &[Claim],
        bias: &BiasProfile,
    ) -> Result<ArbitrationResult, EngineError> {
        let prompt = PromptBuilder::new(claims, bias)
            .with_claims_limit(self.config.prompt_claims_limit)
            .build();

        debug!(prompt_len = prompt.len(), "Calling reasoning backend");

        // Single attempt; a failure here lands in the deterministic fallback.
        let response = timeout(self.config.backend_timeout(), self.backend.generate(&prompt))
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Backend(e.to_string()))?;

        let envelope = parse_arbitration_response(&response)?;
        if envelope.ranked_entities.is_empty() {
            return Err(EngineError::EmptyRanking);
        }

        Ok(self.result_from_envelope(envelope, claims))
    }

    fn result_from_envelope(
        &self,
        envelope: ArbitrationEnvelope,
        claims: &[Claim],
    ) -> ArbitrationResult {
        let ranked_entities: Vec<RankedEntity> = envelope
            .ranked_entities
            .into_iter()
            .take(self.config.max_ranked)
            .enumerate()
            .map(|(i, wire)| {
                let lei = wire.lei_code.as_deref().and_then(Lei::parse);
                let matched = claims.iter().find(|c| {
                    !c.is_base_claim()
                        && ((lei.is_some() && c.lei_code == lei)
                            || c.entity_name == wire.entity_name)
                });
                let confidence = wire.confidence.unwrap_or(0.5).clamp(0.0, 1.0);
                let acquisition_grade = wire
                    .acquisition_grade
                    .as_deref()
                    .and_then(Grade::parse)
                    .unwrap_or_else(|| Grade::from_score(confidence));

                RankedEntity {
                    rank: wire.rank.unwrap_or((i + 1) as u32),
                    entity_name: wire.entity_name,
                    lei_code: lei.or_else(|| matched.and_then(|c| c.lei_code.clone())),
                    confidence,
                    reasoning: wire.reasoning.unwrap_or_default(),
                    acquisition_grade,
                    metadata: matched.map(|c| c.metadata.clone()).unwrap_or_default(),
                }
            })
            .collect();

        ArbitrationResult {
            ranked_entities,
            overall_reasoning: envelope.overall_reasoning,
            detailed_thinking: envelope.thinking,
            citations: envelope.citations,
            processing_time_ms: 0,
            arbitrator_model: self.backend.model_name().to_string(),
        }
    }

    fn fallback_result(&self, claims: &[Claim], bias: &BiasProfile) -> ArbitrationResult {
        let ranked_entities = self.ranker.rank(claims, bias, Utc::now());
        let candidates = claims.iter().filter(|c| !c.is_base_claim()).count();

        ArbitrationResult {
            overall_reasoning: format!(
                "Deterministic weighted ranking of {} candidate claims under profile '{}'",
                candidates, bias.name
            ),
            ranked_entities,
            detailed_thinking: None,
            citations: Vec::new(),
            processing_time_ms: 0,
            arbitrator_model: FALLBACK_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_domain::{ClaimMetadata, ClaimType, HierarchyLevel, RelationshipRecord};
    use arbiter_llm::{FailingBackend, MockBackend};
    use arbiter_registry::MemoryRelationshipCache;
    use async_trait::async_trait;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockRegistry {
        graph: HashMap<Lei, Vec<RelationshipRecord>>,
    }

    #[async_trait]
    impl RelationshipRegistry for MockRegistry {
        type Error = String;

        async fn fetch_relationships(
            &self,
            lei: &Lei,
        ) -> Result<Vec<RelationshipRecord>, Self::Error> {
            Ok(self.graph.get(lei).cloned().unwrap_or_default())
        }
    }

    fn lei(s: &str) -> Lei {
        Lei::parse(s).unwrap()
    }

    fn claims() -> Vec<Claim> {
        let base = Claim::new(0, ClaimType::WebsiteClaim, "Acme", 0.7, "website_extraction");
        let mut candidate =
            Claim::new(1, ClaimType::GleifCandidate, "Acme Corp", 0.6, "gleif_search");
        candidate.lei_code = Some(lei("A1234567890123456789"));
        candidate.metadata = ClaimMetadata {
            jurisdiction: Some("US".to_string()),
            entity_status: Some("ACTIVE".to_string()),
            ..Default::default()
        };
        vec![base, candidate]
    }

    fn engine_with<L: ReasoningBackend + 'static>(
        backend: L,
        registry: MockRegistry,
    ) -> ArbitrationEngine<L, MockRegistry, MemoryRelationshipCache> {
        let resolver = RelationshipResolver::new(registry, MemoryRelationshipCache::new());
        ArbitrationEngine::new(backend, resolver, EngineConfig::default())
    }

    const BACKEND_REPLY: &str = r#"{
        "rankedEntities": [
            {
                "rank": 1,
                "entityName": "Acme Corp",
                "leiCode": "A1234567890123456789",
                "confidence": 0.91,
                "reasoning": "Name match and active status",
                "acquisitionGrade": "A+"
            }
        ],
        "overallReasoning": "Single clear candidate."
    }"#;

    #[tokio::test]
    async fn test_primary_path_uses_backend_ranking() {
        let engine = engine_with(MockBackend::new(BACKEND_REPLY), MockRegistry::default());
        let mut claims = claims();

        let result = engine.arbitrate(&mut claims, &BiasProfile::default()).await;

        assert_eq!(result.arbitrator_model, "mock");
        assert_eq!(result.ranked_entities.len(), 1);
        assert_eq!(result.ranked_entities[0].entity_name, "Acme Corp");
        assert_eq!(result.ranked_entities[0].acquisition_grade, Grade::APlus);
        assert_eq!(result.overall_reasoning, "Single clear candidate.");
        // Metadata carried over from the matched claim.
        assert_eq!(
            result.ranked_entities[0].metadata.jurisdiction.as_deref(),
            Some("US")
        );
    }

    #[tokio::test]
    async fn test_fenced_backend_reply_is_accepted() {
        let fenced = format!("```json\n{}\n```", BACKEND_REPLY);
        let engine = engine_with(MockBackend::new(fenced), MockRegistry::default());
        let mut claims = claims();

        let result = engine.arbitrate(&mut claims, &BiasProfile::default()).await;
        assert_eq!(result.arbitrator_model, "mock");
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back() {
        let engine = engine_with(FailingBackend::new(), MockRegistry::default());
        let mut claims = claims();

        let result = engine.arbitrate(&mut claims, &BiasProfile::default()).await;

        assert_eq!(result.arbitrator_model, FALLBACK_MODEL);
        assert_eq!(result.ranked_entities.len(), 1);
        // 0.6 + 0.3 (primary jurisdiction) + 0.1 (active) = 1.0, grade A+.
        assert!((result.ranked_entities[0].confidence - 1.0).abs() < 1e-9);
        assert_eq!(result.ranked_entities[0].acquisition_grade, Grade::APlus);
    }

    #[tokio::test]
    async fn test_unparsable_backend_reply_falls_back() {
        let engine = engine_with(
            MockBackend::new("I would rank Acme Corp first."),
            MockRegistry::default(),
        );
        let mut claims = claims();

        let result = engine.arbitrate(&mut claims, &BiasProfile::default()).await;
        assert_eq!(result.arbitrator_model, FALLBACK_MODEL);
    }

    #[tokio::test]
    async fn test_empty_backend_ranking_falls_back() {
        let engine = engine_with(
            MockBackend::new(r#"{"rankedEntities": [], "overallReasoning": "none"}"#),
            MockRegistry::default(),
        );
        let mut claims = claims();

        let result = engine.arbitrate(&mut claims, &BiasProfile::default()).await;
        assert_eq!(result.arbitrator_model, FALLBACK_MODEL);
    }

    #[tokio::test]
    async fn test_fallback_never_ranks_claim_zero() {
        let engine = engine_with(FailingBackend::new(), MockRegistry::default());
        let mut claims = claims();

        let result = engine.arbitrate(&mut claims, &BiasProfile::default()).await;
        assert!(result
            .ranked_entities
            .iter()
            .all(|r| r.entity_name != "Acme"));
    }

    #[tokio::test]
    async fn test_enrichment_attaches_hierarchy() {
        let candidate_lei = lei("A1234567890123456789");
        let parent = lei("PARENT00000000000001");
        let ultimate = lei("ULTIMATE000000000001");
        let mut registry = MockRegistry::default();
        registry.graph.insert(
            candidate_lei.clone(),
            vec![
                RelationshipRecord {
                    related_lei: parent.clone(),
                    relationship_type: "IS_DIRECTLY_CONSOLIDATED_BY".to_string(),
                    relationship_status: Some("ACTIVE".to_string()),
                },
                RelationshipRecord {
                    related_lei: ultimate.clone(),
                    relationship_type: "IS_ULTIMATELY_CONSOLIDATED_BY".to_string(),
                    relationship_status: Some("ACTIVE".to_string()),
                },
            ],
        );

        let engine = engine_with(FailingBackend::new(), registry);
        let mut claims = claims();
        engine.enrich_claims(&mut claims).await;

        let meta = &claims[1].metadata;
        assert_eq!(meta.hierarchy_level, Some(HierarchyLevel::Subsidiary));
        assert_eq!(meta.has_parent, Some(true));
        assert_eq!(meta.ultimate_parent_lei, Some(ultimate));
        // Claim 0 is never enriched.
        assert_eq!(claims[0].metadata.hierarchy_level, None);
    }

    #[tokio::test]
    async fn test_processing_time_reported_on_both_paths() {
        let primary = engine_with(MockBackend::new(BACKEND_REPLY), MockRegistry::default());
        let result = primary
            .arbitrate(&mut claims(), &BiasProfile::default())
            .await;
        assert_eq!(result.arbitrator_model, "mock");

        let fallback = engine_with(FailingBackend::new(), MockRegistry::default());
        let result = fallback
            .arbitrate(&mut claims(), &BiasProfile::default())
            .await;
        assert_eq!(result.arbitrator_model, FALLBACK_MODEL);
    }

    #[tokio::test]
    async fn test_backend_shortlist_capped() {
        let mut entities = Vec::new();
        for i in 1..=8 {
            entities.push(format!(
                r#"{{"rank": {}, "entityName": "Entity {}", "confidence": 0.5}}"#,
                i, i
            ));
        }
        let reply = format!(
            r#"{{"rankedEntities": [{}], "overallReasoning": "many"}}"#,
            entities.join(",")
        );
        let engine = engine_with(MockBackend::new(reply), MockRegistry::default());

        let result = engine
            .arbitrate(&mut claims(), &BiasProfile::default())
            .await;
        assert_eq!(result.ranked_entities.len(), 5);
    }
}
