//! Parse reasoning-backend output into a strict ranking envelope

use crate::EngineError;
use serde::Deserialize;

/// The response envelope the backend is asked to produce.
///
/// Decoded strictly by shape, tolerantly by presence: every field has a
/// sensible empty default so a minimal-but-valid reply still parses. An
/// empty `ranked_entities` is the caller's signal to fall back.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrationEnvelope {
    /// Ranked candidates, best first
    #[serde(default)]
    pub ranked_entities: Vec<RankedEntityWire>,

    /// Overall ranking rationale
    #[serde(default)]
    pub overall_reasoning: String,

    /// Optional detailed analysis
    #[serde(default)]
    pub thinking: Option<String>,

    /// Optional source citations
    #[serde(default)]
    pub citations: Vec<String>,
}

/// One ranked entity as the backend reports it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntityWire {
    /// 1-based rank; position is used when absent
    #[serde(default)]
    pub rank: Option<u32>,

    /// Entity name
    pub entity_name: String,

    /// LEI string; invalid shapes are dropped downstream
    #[serde(default)]
    pub lei_code: Option<String>,

    /// Confidence in [0, 1]
    #[serde(default)]
    pub confidence: Option<f64>,

    /// Per-entity rationale
    #[serde(default)]
    pub reasoning: Option<String>,

    /// Letter grade; derived from confidence when absent or unparsable
    #[serde(default)]
    pub acquisition_grade: Option<String>,
}

/// Parse a backend response, accepting a fenced ```json block or raw JSON.
pub fn parse_arbitration_response(response: &str) -> Result<ArbitrationEnvelope, EngineError> {
    let json_str = extract_json(response)?;
    serde_json::from_str(&json_str)
        .map_err(|e| EngineError::InvalidFormat(format!("JSON parse error: {}", e)))
}

/// Extract JSON from a response, handling markdown code fences.
fn extract_json(response: &str) -> Result<String, EngineError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(EngineError::InvalidFormat("Empty code block".to_string()));
        }
        // Skip the opening fence (``` or ```json) and the closing fence.
        let json_lines = &lines[1..lines.len().saturating_sub(1)];
        Ok(json_lines.join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}
