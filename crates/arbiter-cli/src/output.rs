//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use arbiter_domain::{ArbitrationRequest, ArbitrationResult, BiasProfile, Grade};
use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format an arbitration result.
    pub fn format_result(&self, result: &ArbitrationResult) -> Result<String> {
        match self.format {
            CliFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            CliFormat::Table => self.format_result_table(result),
        }
    }

    fn format_result_table(&self, result: &ArbitrationResult) -> Result<String> {
        if result.ranked_entities.is_empty() {
            return Ok(self.paint("No entities ranked.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Rank", "Entity", "LEI", "Confidence", "Grade", "Reasoning"]);

        for entity in &result.ranked_entities {
            builder.push_record([
                entity.rank.to_string(),
                entity.entity_name.clone(),
                entity
                    .lei_code
                    .as_ref()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                format!("{:.2}", entity.confidence),
                self.paint_grade(entity.acquisition_grade),
                entity.reasoning.clone(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut output = table.to_string();
        output.push_str(&format!(
            "\n\n{}\n({} in {} ms)\n",
            result.overall_reasoning, result.arbitrator_model, result.processing_time_ms
        ));
        Ok(output)
    }

    /// Format a request status line.
    pub fn format_request(&self, request: &ArbitrationRequest) -> Result<String> {
        match self.format {
            CliFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "id": request.id.to_string(),
                "domain": request.domain,
                "status": request.status.as_str(),
                "error_message": request.error_message,
            }))?),
            CliFormat::Table => {
                let status = match request.status.as_str() {
                    "completed" => self.paint("completed", "green"),
                    "failed" => self.paint("failed", "red"),
                    other => self.paint(other, "yellow"),
                };
                let mut line = format!("{}  {}  {}", request.id, request.domain, status);
                if let Some(message) = &request.error_message {
                    line.push_str(&format!("  ({})", message));
                }
                Ok(line)
            }
        }
    }

    /// Format a profile listing.
    pub fn format_profiles(&self, profiles: &[BiasProfile]) -> Result<String> {
        match self.format {
            CliFormat::Json => Ok(serde_json::to_string_pretty(profiles)?),
            CliFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record([
                    "Name", "Primary", "Secondary", "Parent", "Jurisdiction", "Status", "Form",
                    "Recency", "Default",
                ]);
                for profile in profiles {
                    builder.push_record([
                        profile.name.clone(),
                        profile.jurisdiction_primary.clone(),
                        profile.jurisdiction_secondary.join(","),
                        format!("{:.2}", profile.parent_weight),
                        format!("{:.2}", profile.jurisdiction_weight),
                        format!("{:.2}", profile.entity_status_weight),
                        format!("{:.2}", profile.legal_form_weight),
                        format!("{:.2}", profile.recency_weight),
                        if profile.is_default { "*" } else { "" }.to_string(),
                    ]);
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.paint(&format!("✗ {}", message), "red")
    }

    fn paint_grade(&self, grade: Grade) -> String {
        let text = grade.as_str();
        if !self.color_enabled {
            return text.to_string();
        }
        match grade {
            Grade::APlus | Grade::A => text.green().to_string(),
            Grade::BPlus | Grade::B => text.yellow().to_string(),
            Grade::C => text.red().to_string(),
        }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }
        match color {
            "green" => text.green().to_string(),
            "red" => text.red().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_domain::RankedEntity;

    fn sample_result() -> ArbitrationResult {
        ArbitrationResult {
            ranked_entities: vec![RankedEntity {
                rank: 1,
                entity_name: "Acme Corp".to_string(),
                lei_code: None,
                confidence: 0.95,
                reasoning: "primary jurisdiction (US)".to_string(),
                acquisition_grade: Grade::APlus,
                metadata: Default::default(),
            }],
            overall_reasoning: "One candidate.".to_string(),
            detailed_thinking: None,
            citations: vec![],
            processing_time_ms: 42,
            arbitrator_model: "algorithmic-fallback".to_string(),
        }
    }

    #[test]
    fn test_table_output_contains_entity() {
        let formatter = Formatter::new(CliFormat::Table, false);
        let output = formatter.format_result(&sample_result()).unwrap();
        assert!(output.contains("Acme Corp"));
        assert!(output.contains("A+"));
        assert!(output.contains("algorithmic-fallback"));
    }

    #[test]
    fn test_json_output_is_valid() {
        let formatter = Formatter::new(CliFormat::Json, false);
        let output = formatter.format_result(&sample_result()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["ranked_entities"][0]["entity_name"], "Acme Corp");
    }
}
