//! Arbitration prompt construction

use arbiter_domain::{BiasProfile, Claim};

/// Builds the structured ranking prompt for the reasoning backend.
///
/// Embeds the website baseline (claim 0), the enriched candidate claims,
/// and the five weighted criteria expressed as percentages of the bias
/// profile.
pub struct PromptBuilder<'a> {
    claims: &'a [Claim],
    bias: &'a BiasProfile,
    claims_limit: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a builder over a normalized claim set
    pub fn new(claims: &'a [Claim], bias: &'a BiasProfile) -> Self {
        Self {
            claims,
            bias,
            claims_limit: 20,
        }
    }

    /// Cap the number of candidate claims embedded in the prompt
    pub fn with_claims_limit(mut self, limit: usize) -> Self {
        self.claims_limit = limit;
        self
    }

    /// Build the complete arbitration prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(ARBITRATION_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 1. The website baseline, reference context only
        if let Some(base) = self.claims.iter().find(|c| c.is_base_claim()) {
            prompt.push_str("Website baseline (reference only, do NOT rank it):\n");
            prompt.push_str(&format!(
                "- \"{}\" (confidence {:.2}, source: {})\n\n",
                base.entity_name, base.confidence, base.source
            ));
        }

        // 2. The candidates
        prompt.push_str("Candidate entities:\n");
        for claim in self
            .claims
            .iter()
            .filter(|c| !c.is_base_claim())
            .take(self.claims_limit)
        {
            prompt.push_str(&self.describe_claim(claim));
        }
        prompt.push('\n');

        // 3. The weighting policy
        prompt.push_str(&self.describe_bias());
        prompt.push('\n');

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }

    fn describe_claim(&self, claim: &Claim) -> String {
        let meta = &claim.metadata;
        let mut line = format!(
            "- Claim {}: \"{}\" (confidence {:.2})",
            claim.claim_number, claim.entity_name, claim.confidence
        );
        if let Some(lei) = &claim.lei_code {
            line.push_str(&format!(", LEI {}", lei));
        }
        if let Some(jurisdiction) = &meta.jurisdiction {
            line.push_str(&format!(", jurisdiction {}", jurisdiction));
        }
        if let Some(status) = &meta.entity_status {
            line.push_str(&format!(", status {}", status));
        }
        if let Some(form) = &meta.legal_form {
            line.push_str(&format!(", legal form {}", form));
        }
        if let Some(level) = meta.hierarchy_level {
            line.push_str(&format!(", hierarchy: {}", level.label()));
        }
        if let Some(updated) = &meta.last_update_date {
            line.push_str(&format!(", last updated {}", updated));
        }
        line.push('\n');
        line
    }

    fn describe_bias(&self) -> String {
        let bias = self.bias;
        let mut section = String::from("Ranking criteria and weights:\n");
        section.push_str(&format!(
            "- Corporate hierarchy position: {}%{}\n",
            BiasProfile::as_percent(bias.parent_weight),
            if bias.prefer_parent {
                " (prefer parent entities over subsidiaries)"
            } else {
                ""
            }
        ));
        section.push_str(&format!(
            "- Jurisdiction: {}% (primary: {}; secondary: {})\n",
            BiasProfile::as_percent(bias.jurisdiction_weight),
            bias.jurisdiction_primary,
            if bias.jurisdiction_secondary.is_empty() {
                "none".to_string()
            } else {
                bias.jurisdiction_secondary.join(", ")
            }
        ));
        section.push_str(&format!(
            "- Entity status (ACTIVE preferred): {}%\n",
            BiasProfile::as_percent(bias.entity_status_weight)
        ));
        section.push_str(&format!(
            "- Legal form (corporate forms preferred): {}%\n",
            BiasProfile::as_percent(bias.legal_form_weight)
        ));
        section.push_str(&format!(
            "- Registry recency: {}%\n",
            BiasProfile::as_percent(bias.recency_weight)
        ));
        section
    }
}

const ARBITRATION_INSTRUCTIONS: &str = r#"You are arbitrating competing claims about which legal entity operates a website. Rank the candidate entities below as acquisition targets, using the weighted criteria provided. The website baseline tells you what the site itself implies; use it as context for name matching but never include it in the ranking."#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (JSON only, no additional text):
{
  "rankedEntities": [
    {
      "rank": 1,
      "entityName": "...",
      "leiCode": "... or null",
      "confidence": 0.0-1.0,
      "reasoning": "why this entity ranks here",
      "acquisitionGrade": "A+|A|B+|B|C"
    }
  ],
  "overallReasoning": "summary of the ranking rationale",
  "thinking": "optional detailed analysis",
  "citations": []
}"#;
