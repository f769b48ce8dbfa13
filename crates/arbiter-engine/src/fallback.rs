//! Deterministic fallback ranking

use crate::config::EngineConfig;
use arbiter_domain::dates::within_months;
use arbiter_domain::{BiasProfile, Claim, Grade, HierarchyLevel, RankedEntity};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Deterministic claim scorer used when the reasoning backend is
/// unavailable or unparsable.
///
/// For each eligible claim (claim 0 is reference-only and never ranked):
///
/// ```text
/// score = confidence
///       + parent_weight        * hierarchy factor (1.0 ultimate parent, 0.7 parent)
///       + jurisdiction_weight  * jurisdiction factor (1.0 primary, 0.5 secondary)
///       + entity_status_weight * 1.0 if ACTIVE
///       + legal_form_weight    * 1.0 if a preferred corporate form
///       + recency_weight       * recency factor (1.0 within 12mo, 0.5 within 36mo)
/// ```
///
/// Claims sort descending by score; the top entries become the shortlist
/// with `confidence = min(score, 1.0)`. Identical claims and bias always
/// produce identical order and scores.
pub struct FallbackRanker {
    preferred_legal_forms: HashSet<String>,
    max_ranked: usize,
}

impl FallbackRanker {
    /// Create a ranker from engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            preferred_legal_forms: config
                .preferred_legal_forms
                .iter()
                .map(|form| form.to_uppercase())
                .collect(),
            max_ranked: config.max_ranked,
        }
    }

    /// Rank the eligible claims under a bias profile.
    pub fn rank(
        &self,
        claims: &[Claim],
        bias: &BiasProfile,
        now: DateTime<Utc>,
    ) -> Vec<RankedEntity> {
        let mut scored: Vec<(f64, &Claim)> = claims
            .iter()
            .filter(|claim| !claim.is_base_claim())
            .map(|claim| (self.score(claim, bias, now), claim))
            .collect();

        // Stable sort: ties keep input (claim-number) order, so repeated
        // runs over the same claims produce the same shortlist.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        scored
            .into_iter()
            .take(self.max_ranked)
            .enumerate()
            .map(|(i, (score, claim))| RankedEntity {
                rank: (i + 1) as u32,
                entity_name: claim.entity_name.clone(),
                lei_code: claim.lei_code.clone(),
                confidence: score.min(1.0),
                reasoning: self.assemble_reasoning(claim, bias, now),
                acquisition_grade: Grade::from_score(score),
                metadata: claim.metadata.clone(),
            })
            .collect()
    }

    /// The weighted score for one claim.
    pub fn score(&self, claim: &Claim, bias: &BiasProfile, now: DateTime<Utc>) -> f64 {
        let meta = &claim.metadata;
        let mut score = claim.confidence;

        score += bias.parent_weight
            * match meta.hierarchy_level {
                Some(HierarchyLevel::UltimateParent) => 1.0,
                Some(HierarchyLevel::Parent) => 0.7,
                _ => 0.0,
            };

        score += bias.jurisdiction_weight
            * meta
                .jurisdiction
                .as_deref()
                .map_or(0.0, |j| bias.jurisdiction_score(j));

        if meta.entity_status.as_deref() == Some("ACTIVE") {
            score += bias.entity_status_weight;
        }

        if meta
            .legal_form
            .as_deref()
            .is_some_and(|form| self.preferred_legal_forms.contains(&form.to_uppercase()))
        {
            score += bias.legal_form_weight;
        }

        score += bias.recency_weight
            * meta.last_update_date.as_deref().map_or(0.0, |date| {
                if within_months(date, 12, now) {
                    1.0
                } else if within_months(date, 36, now) {
                    0.5
                } else {
                    0.0
                }
            });

        score
    }

    /// Assemble per-entity reasoning from the criteria that matched.
    fn assemble_reasoning(&self, claim: &Claim, bias: &BiasProfile, _now: DateTime<Utc>) -> String {
        let meta = &claim.metadata;
        let mut parts: Vec<String> = Vec::new();

        if let Some(level @ (HierarchyLevel::UltimateParent | HierarchyLevel::Parent)) =
            meta.hierarchy_level
        {
            parts.push(level.label().to_string());
        }

        if let Some(jurisdiction) = meta.jurisdiction.as_deref() {
            if jurisdiction.eq_ignore_ascii_case(&bias.jurisdiction_primary) {
                parts.push(format!("primary jurisdiction ({})", jurisdiction));
            } else if bias.jurisdiction_score(jurisdiction) > 0.0 {
                parts.push(format!("secondary jurisdiction ({})", jurisdiction));
            }
        }

        if meta.entity_status.as_deref() == Some("ACTIVE") {
            parts.push("active registry status".to_string());
        }

        if let Some(hq) = &meta.headquarters {
            match (&hq.city, &hq.country) {
                (Some(city), Some(country)) => {
                    parts.push(format!("headquartered in {}, {}", city, country));
                }
                (Some(city), None) => parts.push(format!("headquartered in {}", city)),
                (None, Some(country)) => parts.push(format!("headquartered in {}", country)),
                (None, None) => {}
            }
        }

        if parts.is_empty() {
            "Ranked on baseline confidence".to_string()
        } else {
            parts.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_domain::{Address, ClaimMetadata, ClaimType, Lei};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn ranker() -> FallbackRanker {
        FallbackRanker::new(&EngineConfig::default())
    }

    fn base_claim() -> Claim {
        Claim::new(0, ClaimType::WebsiteClaim, "Acme", 0.7, "website_extraction")
    }

    fn spec_scenario_claims() -> Vec<Claim> {
        let mut candidate =
            Claim::new(1, ClaimType::GleifCandidate, "Acme Corp", 0.6, "gleif_search");
        candidate.lei_code = Lei::parse("A1234567890123456789");
        candidate.metadata = ClaimMetadata {
            jurisdiction: Some("US".to_string()),
            entity_status: Some("ACTIVE".to_string()),
            ..Default::default()
        };
        vec![base_claim(), candidate]
    }

    #[test]
    fn test_spec_scenario_scores_one_and_grades_a_plus() {
        // 0.6 + 0 (no hierarchy) + 0.3 (primary jurisdiction) + 0.1 (active)
        let ranked = ranker().rank(&spec_scenario_claims(), &BiasProfile::default(), now());

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].entity_name, "Acme Corp");
        assert!((ranked[0].confidence - 1.0).abs() < 1e-9);
        assert_eq!(ranked[0].acquisition_grade, Grade::APlus);
    }

    #[test]
    fn test_claim_zero_is_never_ranked() {
        let ranked = ranker().rank(&spec_scenario_claims(), &BiasProfile::default(), now());
        assert!(ranked.iter().all(|r| r.entity_name != "Acme"));

        // Even alone, claim 0 yields an empty shortlist.
        let only_base = vec![base_claim()];
        assert!(ranker()
            .rank(&only_base, &BiasProfile::default(), now())
            .is_empty());
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let claims = spec_scenario_claims();
        let bias = BiasProfile::default();
        let first = ranker().rank(&claims, &bias, now());
        let second = ranker().rank(&claims, &bias, now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_hierarchy_factors() {
        let bias = BiasProfile::default();
        let mut claim = Claim::new(1, ClaimType::GleifCandidate, "X", 0.5, "gleif_search");

        claim.metadata.hierarchy_level = Some(HierarchyLevel::UltimateParent);
        let ultimate = ranker().score(&claim, &bias, now());

        claim.metadata.hierarchy_level = Some(HierarchyLevel::Parent);
        let parent = ranker().score(&claim, &bias, now());

        claim.metadata.hierarchy_level = Some(HierarchyLevel::Subsidiary);
        let subsidiary = ranker().score(&claim, &bias, now());

        assert!((ultimate - 0.9).abs() < 1e-9);
        assert!((parent - (0.5 + 0.4 * 0.7)).abs() < 1e-9);
        assert!((subsidiary - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_secondary_jurisdiction_scores_half() {
        let bias = BiasProfile::default();
        let mut claim = Claim::new(1, ClaimType::GleifCandidate, "X", 0.5, "gleif_search");
        claim.metadata.jurisdiction = Some("GB".to_string());

        let score = ranker().score(&claim, &bias, now());
        assert!((score - (0.5 + 0.3 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_legal_form_criterion() {
        let bias = BiasProfile::default();
        let mut claim = Claim::new(1, ClaimType::GleifCandidate, "X", 0.5, "gleif_search");

        claim.metadata.legal_form = Some("GmbH".to_string());
        let preferred = ranker().score(&claim, &bias, now());
        assert!((preferred - 0.55).abs() < 1e-9);

        claim.metadata.legal_form = Some("UNKNOWN_FORM".to_string());
        let other = ranker().score(&claim, &bias, now());
        assert!((other - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_recency_tiers() {
        let bias = BiasProfile::default();
        let mut claim = Claim::new(1, ClaimType::GleifCandidate, "X", 0.5, "gleif_search");

        claim.metadata.last_update_date = Some("2025-05-01".to_string());
        let fresh = ranker().score(&claim, &bias, now());
        assert!((fresh - 0.55).abs() < 1e-9);

        claim.metadata.last_update_date = Some("2023-05-01".to_string());
        let aging = ranker().score(&claim, &bias, now());
        assert!((aging - 0.525).abs() < 1e-9);

        claim.metadata.last_update_date = Some("2019-05-01".to_string());
        let stale = ranker().score(&claim, &bias, now());
        assert!((stale - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_shortlist_caps_at_five() {
        let mut claims = vec![base_claim()];
        for i in 1..=8 {
            claims.push(Claim::new(
                i,
                ClaimType::GleifCandidate,
                format!("Entity {}", i),
                0.5,
                "gleif_search",
            ));
        }

        let ranked = ranker().rank(&claims, &BiasProfile::default(), now());
        assert_eq!(ranked.len(), 5);
        assert_eq!(
            ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn test_sort_is_descending_by_score() {
        let mut strong = Claim::new(2, ClaimType::GleifCandidate, "Strong", 0.6, "gleif_search");
        strong.metadata.jurisdiction = Some("US".to_string());
        let weak = Claim::new(1, ClaimType::GleifCandidate, "Weak", 0.4, "gleif_search");

        let ranked = ranker().rank(
            &[base_claim(), weak, strong],
            &BiasProfile::default(),
            now(),
        );
        assert_eq!(ranked[0].entity_name, "Strong");
        assert_eq!(ranked[1].entity_name, "Weak");
    }

    #[test]
    fn test_reasoning_names_matched_criteria() {
        let mut claim = Claim::new(1, ClaimType::GleifCandidate, "X", 0.5, "gleif_search");
        claim.metadata = ClaimMetadata {
            jurisdiction: Some("US".to_string()),
            entity_status: Some("ACTIVE".to_string()),
            hierarchy_level: Some(HierarchyLevel::UltimateParent),
            headquarters: Some(Address {
                city: Some("Wilmington".to_string()),
                country: Some("US".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let ranked = ranker().rank(&[claim], &BiasProfile::default(), now());
        let reasoning = &ranked[0].reasoning;
        assert!(reasoning.contains("ultimate parent entity"));
        assert!(reasoning.contains("primary jurisdiction (US)"));
        assert!(reasoning.contains("active registry status"));
        assert!(reasoning.contains("headquartered in Wilmington, US"));
    }

    #[test]
    fn test_reasoning_without_matches_is_baseline() {
        let claim = Claim::new(1, ClaimType::GleifCandidate, "X", 0.5, "gleif_search");
        let ranked = ranker().rank(&[claim], &BiasProfile::default(), now());
        assert_eq!(ranked[0].reasoning, "Ranked on baseline confidence");
    }
}
