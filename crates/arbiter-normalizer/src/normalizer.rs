//! Claim normalization logic

use crate::outcome::{ClaimError, NormalizationOutcome, NormalizationStats};
use arbiter_domain::{Claim, ClaimMetadata, ClaimType, Lei};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Entity name substituted when claim 0 has no usable name.
pub const UNKNOWN_ENTITY_PLACEHOLDER: &str = "Unknown Entity (Website Extraction Failed)";

/// Source tag forced onto claim 0.
pub const WEBSITE_SOURCE: &str = "website_extraction";

/// Confidence assumed when none is supplied or parseable.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

// Ordered alias lists: explicit field first, legacy casings after.
const CLAIM_NUMBER_ALIASES: &[&str] = &["claim_number", "claimNumber"];
const ENTITY_NAME_ALIASES: &[&str] = &["entity_name", "entityName"];
const LEI_ALIASES: &[&str] = &["lei_code", "leiCode", "LEICode"];
const CONFIDENCE_ALIASES: &[&str] = &["confidence", "confidence_score", "confidenceScore"];
const CLAIM_TYPE_ALIASES: &[&str] = &["claim_type", "claimType"];

/// Normalizes raw claim records into the strict internal schema.
///
/// Stateless; construct once at the composition root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimNormalizer;

/// Mutable bookkeeping for one normalization run
struct Run {
    errors: Vec<ClaimError>,
    warnings: Vec<String>,
    transformations: usize,
    rejected: usize,
    duplicates: usize,
}

impl Run {
    fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            transformations: 0,
            rejected: 0,
            duplicates: 0,
        }
    }

    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn reject(&mut self, claim_index: usize, field: &str, issue: impl Into<String>) {
        self.errors.push(ClaimError {
            claim_index,
            field: field.to_string(),
            issue: issue.into(),
        });
        self.rejected += 1;
    }
}

fn lookup<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|key| obj.get(*key))
        .filter(|v| !v.is_null())
}

impl ClaimNormalizer {
    /// Create a normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize a raw claim batch.
    ///
    /// Never fails as a whole: invalid non-zero claims are excluded with a
    /// typed error each, recoverable anomalies become warnings, and claim 0
    /// always survives.
    pub fn normalize_claims(&self, raw_claims: &[Value]) -> NormalizationOutcome {
        let mut run = Run::new();
        let mut claims = Vec::new();

        for (index, value) in raw_claims.iter().enumerate() {
            if let Some(claim) = self.normalize_one(index, value, &mut run) {
                claims.push(claim);
            }
        }

        let claims = Self::dedup_by_lei(claims, &mut run);
        let claims = Self::dedup_by_name(claims, &mut run);
        let mut claims = Self::ensure_unique_numbers(claims, &mut run);

        claims.sort_by_key(|c| c.claim_number);

        debug!(
            total = raw_claims.len(),
            valid = claims.len(),
            rejected = run.rejected,
            duplicates = run.duplicates,
            "Normalization complete"
        );

        let stats = NormalizationStats {
            total_claims: raw_claims.len(),
            valid_claims: claims.len(),
            rejected_claims: run.rejected,
            duplicates_removed: run.duplicates,
            transformations_applied: run.transformations,
        };

        NormalizationOutcome {
            success: !claims.is_empty(),
            normalized_claims: claims,
            errors: run.errors,
            warnings: run.warnings,
            stats,
        }
    }

    fn normalize_one(&self, index: usize, value: &Value, run: &mut Run) -> Option<Claim> {
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                run.reject(index, "claim", "record is not a JSON object");
                return None;
            }
        };

        let claim_number = self.resolve_claim_number(index, obj, run);
        let is_base = claim_number == 0;

        let metadata = self.resolve_metadata(index, obj, run);

        let entity_name = match self.resolve_entity_name(obj, &metadata) {
            Some(name) => name,
            None if is_base => {
                run.warn(format!(
                    "claim {}: no entity name, using placeholder",
                    index
                ));
                run.transformations += 1;
                UNKNOWN_ENTITY_PLACEHOLDER.to_string()
            }
            None => {
                run.reject(index, "entity_name", "missing or empty");
                return None;
            }
        };

        let lei_code = self.resolve_lei(index, is_base, obj, run)?;
        let confidence = self.resolve_confidence(index, is_base, obj, run)?;

        let source = if is_base {
            WEBSITE_SOURCE.to_string()
        } else {
            obj.get("source")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let claim_type = self.resolve_claim_type(is_base, obj, &source);

        Some(Claim {
            claim_number,
            claim_type,
            entity_name,
            lei_code,
            confidence,
            source,
            metadata,
        })
    }

    fn resolve_claim_number(&self, index: usize, obj: &Map<String, Value>, run: &mut Run) -> u32 {
        let resolved = match lookup(obj, CLAIM_NUMBER_ALIASES) {
            Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Some(Value::String(s)) => {
                let parsed = s.trim().parse::<u32>().ok();
                if parsed.is_some() {
                    run.transformations += 1;
                }
                parsed
            }
            _ => None,
        };

        match resolved {
            Some(number) => number,
            None => {
                run.warn(format!(
                    "claim {}: missing or unusable claim number, using batch position",
                    index
                ));
                run.transformations += 1;
                index as u32
            }
        }
    }

    fn resolve_metadata(
        &self,
        index: usize,
        obj: &Map<String, Value>,
        run: &mut Run,
    ) -> ClaimMetadata {
        match obj.get("metadata") {
            Some(value) if value.is_object() => {
                match serde_json::from_value::<ClaimMetadata>(value.clone()) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        run.warn(format!("claim {}: unreadable metadata ({})", index, e));
                        ClaimMetadata::default()
                    }
                }
            }
            _ => ClaimMetadata::default(),
        }
    }

    /// Explicit field wins; nested `metadata.legalName` is the fallback.
    fn resolve_entity_name(
        &self,
        obj: &Map<String, Value>,
        metadata: &ClaimMetadata,
    ) -> Option<String> {
        if let Some(name) = lookup(obj, ENTITY_NAME_ALIASES)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return Some(name.to_string());
        }

        metadata
            .legal_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// `None` in the outer Option means the claim was rejected.
    #[allow(clippy::option_option)]
    fn resolve_lei(
        &self,
        index: usize,
        is_base: bool,
        obj: &Map<String, Value>,
        run: &mut Run,
    ) -> Option<Option<Lei>> {
        match lookup(obj, LEI_ALIASES) {
            None => Some(None),
            Some(Value::String(raw)) => match Lei::parse(raw) {
                Some(lei) => Some(Some(lei)),
                None => {
                    run.warn(format!("claim {}: invalid LEI {:?} nulled", index, raw));
                    run.transformations += 1;
                    Some(None)
                }
            },
            Some(other) if is_base => {
                run.warn(format!("claim {}: non-string LEI {} ignored", index, other));
                Some(None)
            }
            Some(_) => {
                run.reject(index, "lei_code", "expected a string");
                None
            }
        }
    }

    /// `None` in the outer Option means the claim was rejected.
    fn resolve_confidence(
        &self,
        index: usize,
        is_base: bool,
        obj: &Map<String, Value>,
        run: &mut Run,
    ) -> Option<f64> {
        match lookup(obj, CONFIDENCE_ALIASES) {
            None => {
                run.warn(format!(
                    "claim {}: missing confidence, defaulting to {}",
                    index, DEFAULT_CONFIDENCE
                ));
                run.transformations += 1;
                Some(DEFAULT_CONFIDENCE)
            }
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if v.is_finite() => Some(self.normalize_confidence_value(index, v, run)),
                _ if is_base => {
                    run.warn(format!(
                        "claim {}: non-finite confidence, defaulting to {}",
                        index, DEFAULT_CONFIDENCE
                    ));
                    run.transformations += 1;
                    Some(DEFAULT_CONFIDENCE)
                }
                _ => {
                    run.reject(index, "confidence", "not a finite number");
                    None
                }
            },
            Some(Value::String(raw)) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    run.transformations += 1;
                    Some(self.normalize_confidence_value(index, v, run))
                }
                _ => {
                    run.warn(format!(
                        "claim {}: unparsable confidence {:?}, defaulting to {}",
                        index, raw, DEFAULT_CONFIDENCE
                    ));
                    run.transformations += 1;
                    Some(DEFAULT_CONFIDENCE)
                }
            },
            Some(_) if is_base => {
                run.warn(format!(
                    "claim {}: non-numeric confidence, defaulting to {}",
                    index, DEFAULT_CONFIDENCE
                ));
                run.transformations += 1;
                Some(DEFAULT_CONFIDENCE)
            }
            Some(_) => {
                run.reject(index, "confidence", "not numeric");
                None
            }
        }
    }

    /// Values above 1 are percentages; everything lands in [0, 1].
    fn normalize_confidence_value(&self, index: usize, value: f64, run: &mut Run) -> f64 {
        let mut v = value;
        if v > 1.0 {
            v /= 100.0;
            run.warn(format!(
                "claim {}: confidence {} treated as percentage",
                index, value
            ));
            run.transformations += 1;
        }
        if !(0.0..=1.0).contains(&v) {
            let clamped = v.clamp(0.0, 1.0);
            run.warn(format!(
                "claim {}: confidence {} clamped to {}",
                index, v, clamped
            ));
            run.transformations += 1;
            v = clamped;
        }
        v
    }

    fn resolve_claim_type(
        &self,
        is_base: bool,
        obj: &Map<String, Value>,
        source: &str,
    ) -> ClaimType {
        // Claim 0 is the website baseline no matter what the record says.
        if is_base {
            return ClaimType::WebsiteClaim;
        }

        if let Some(explicit) = lookup(obj, CLAIM_TYPE_ALIASES)
            .and_then(Value::as_str)
            .and_then(ClaimType::parse)
        {
            return explicit;
        }

        let source = source.to_lowercase();
        if source.contains("gleif") {
            ClaimType::GleifCandidate
        } else if source.contains("llm") || source.contains("extraction") {
            ClaimType::LlmExtracted
        } else {
            ClaimType::GleifCandidate
        }
    }

    /// Claims sharing a non-null LEI keep only the highest-confidence one
    /// (first wins on ties). Claim 0 is exempt in both directions.
    fn dedup_by_lei(claims: Vec<Claim>, run: &mut Run) -> Vec<Claim> {
        let mut best: HashMap<Lei, usize> = HashMap::new();
        for (i, claim) in claims.iter().enumerate() {
            if claim.is_base_claim() {
                continue;
            }
            if let Some(lei) = &claim.lei_code {
                match best.get(lei) {
                    Some(&kept) if claims[kept].confidence >= claim.confidence => {}
                    _ => {
                        best.insert(lei.clone(), i);
                    }
                }
            }
        }

        let before = claims.len();
        let kept: Vec<Claim> = claims
            .into_iter()
            .enumerate()
            .filter(|(i, claim)| {
                claim.is_base_claim()
                    || match &claim.lei_code {
                        Some(lei) => best.get(lei) == Some(i),
                        None => true,
                    }
            })
            .map(|(_, claim)| claim)
            .collect();

        run.duplicates += before - kept.len();
        kept
    }

    /// Claims without a LEI collapse on exact entity-name match, first
    /// occurrence kept. No fuzzy matching.
    fn dedup_by_name(claims: Vec<Claim>, run: &mut Run) -> Vec<Claim> {
        let mut seen: HashSet<String> = HashSet::new();
        let before = claims.len();
        let kept: Vec<Claim> = claims
            .into_iter()
            .filter(|claim| {
                claim.is_base_claim()
                    || claim.lei_code.is_some()
                    || seen.insert(claim.entity_name.clone())
            })
            .collect();

        run.duplicates += before - kept.len();
        kept
    }

    /// Claim numbers must be unique after normalization; later duplicates
    /// are renumbered past the current maximum.
    fn ensure_unique_numbers(mut claims: Vec<Claim>, run: &mut Run) -> Vec<Claim> {
        let mut next = claims.iter().map(|c| c.claim_number).max().unwrap_or(0) + 1;
        let mut seen = HashSet::new();
        for claim in &mut claims {
            if !seen.insert(claim.claim_number) {
                run.warn(format!(
                    "duplicate claim number {} renumbered to {}",
                    claim.claim_number, next
                ));
                run.transformations += 1;
                claim.claim_number = next;
                seen.insert(next);
                next += 1;
            }
        }
        claims
    }
}
