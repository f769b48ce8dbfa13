//! Claim-set assembly for one domain

use crate::config::GeneratorConfig;
use crate::confidence::calculate_gleif_confidence;
use crate::heuristics::{clean_entity_name, domain_base_name, pick_entity};
use crate::prompt::{build_name_extraction_prompt, parse_name_response};
use crate::types::DomainDump;
use crate::GeneratorError;
use arbiter_domain::traits::{EntitySearch, ReasoningBackend};
use arbiter_domain::{Claim, ClaimType, BASE_CLAIM_NUMBER};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Confidence of the synthetic claim emitted when generation fails entirely.
const ERROR_FALLBACK_CONFIDENCE: f64 = 0.1;

/// Assembles the claim set for one domain: the website baseline plus the
/// entity-search candidates.
pub struct ClaimGenerator<L, S>
where
    L: ReasoningBackend,
    S: EntitySearch,
{
    backend: Arc<L>,
    search: Arc<S>,
    config: GeneratorConfig,
}

impl<L, S> ClaimGenerator<L, S>
where
    L: ReasoningBackend,
    S: EntitySearch,
{
    /// Create a new generator
    pub fn new(backend: L, search: S, config: GeneratorConfig) -> Self {
        Self {
            backend: Arc::new(backend),
            search: Arc::new(search),
            config,
        }
    }

    /// Assemble the full claim set for a dump.
    ///
    /// Always returns at least one claim: a totally unusable dump degrades
    /// to the single synthetic error-fallback claim so downstream
    /// arbitration can still run.
    pub async fn assemble_claims(&self, dump: &DomainDump) -> Vec<Claim> {
        let base = match self.generate_base_claim(dump).await {
            Ok(claim) => claim,
            Err(e) => {
                error!(domain = %dump.domain, "Claim generation failed: {}", e);
                return vec![Self::error_fallback_claim(&dump.domain)];
            }
        };

        info!(
            domain = %dump.domain,
            entity = %base.entity_name,
            source = %base.source,
            "Base claim generated"
        );

        let mut claims = vec![base.clone()];
        claims.extend(
            self.generate_gleif_claims(&base.entity_name, &dump.domain)
                .await,
        );
        claims
    }

    /// Build claim 0 through the priority chain.
    ///
    /// Each tier carries a fixed confidence: pre-extracted primary entity
    /// (0.9), base entity name (0.8), company-name field (0.7), LLM-assisted
    /// extraction from raw content (0.5), and finally the domain name with
    /// its TLD stripped (0.5).
    pub async fn generate_base_claim(&self, dump: &DomainDump) -> Result<Claim, GeneratorError> {
        if let Some(name) = dump.primary_entity.as_deref().and_then(clean_entity_name) {
            return Ok(Self::base_claim(name, 0.9, "primary_extraction"));
        }

        if let Some(name) = dump
            .base_entity
            .as_deref()
            .and_then(clean_entity_name)
            .or_else(|| pick_entity(&dump.entities))
        {
            return Ok(Self::base_claim(name, 0.8, "entity_extraction"));
        }

        if let Some(name) = dump.company_name.as_deref().and_then(clean_entity_name) {
            return Ok(Self::base_claim(name, 0.7, "company_name_field"));
        }

        if let Some(name) = self.extract_name_with_llm(dump).await {
            return Ok(Self::base_claim(name, 0.5, "llm_extraction"));
        }

        match domain_base_name(&dump.domain) {
            Some(name) => Ok(Self::base_claim(name, 0.5, "domain_fallback")),
            None => Err(GeneratorError::NoBaseEntity(dump.domain.clone())),
        }
    }

    /// Map entity-search candidates to claims numbered `1..N` in the order
    /// returned. Search failures and empty results both yield no claims.
    pub async fn generate_gleif_claims(&self, entity_name: &str, domain: &str) -> Vec<Claim> {
        let candidates = match self.search.search(entity_name, domain).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(entity_name, domain, "Entity search failed: {}", e);
                return Vec::new();
            }
        };

        if candidates.is_empty() {
            debug!(entity_name, "Entity search returned no candidates");
        }

        let now = Utc::now();
        candidates
            .into_iter()
            .enumerate()
            .map(|(i, candidate)| {
                let confidence = calculate_gleif_confidence(&candidate, entity_name, now);
                let mut claim = Claim::new(
                    (i + 1) as u32,
                    ClaimType::GleifCandidate,
                    candidate.legal_name.clone(),
                    confidence,
                    "gleif_search",
                );
                claim.lei_code = candidate.lei.clone();
                claim.metadata = candidate.to_metadata();
                claim
            })
            .collect()
    }

    async fn extract_name_with_llm(&self, dump: &DomainDump) -> Option<String> {
        let content = dump.raw_text.as_deref()?.trim();
        if content.is_empty() {
            return None;
        }

        let snippet: String = content.chars().take(self.config.content_snippet_chars).collect();
        let prompt = build_name_extraction_prompt(&dump.domain, &snippet);
        let backend = Arc::clone(&self.backend);

        let response = match timeout(self.config.llm_timeout(), backend.generate(&prompt)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(domain = %dump.domain, "LLM name extraction failed: {}", e);
                return None;
            }
            Err(_) => {
                warn!(domain = %dump.domain, "LLM name extraction timed out");
                return None;
            }
        };

        parse_name_response(&response)
    }

    fn base_claim(entity_name: String, confidence: f64, source: &str) -> Claim {
        Claim::new(
            BASE_CLAIM_NUMBER,
            ClaimType::WebsiteClaim,
            entity_name,
            confidence,
            source,
        )
    }

    fn error_fallback_claim(domain: &str) -> Claim {
        let entity_name =
            domain_base_name(domain).unwrap_or_else(|| "Unknown Entity".to_string());
        Claim::new(
            BASE_CLAIM_NUMBER,
            ClaimType::WebsiteClaim,
            entity_name,
            ERROR_FALLBACK_CONFIDENCE,
            "error_fallback",
        )
    }
}
