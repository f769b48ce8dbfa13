//! Input types for claim generation

use serde::{Deserialize, Serialize};

/// The processed dump for one domain, as handed over by the upstream
/// extraction stages.
///
/// Which fields are populated depends on how much the extraction stages
/// could recover; the generator's priority chain copes with any subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainDump {
    /// The domain under arbitration
    pub domain: String,

    /// Pre-extracted primary entity name, highest trust
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_entity: Option<String>,

    /// Pre-extracted base entity name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_entity: Option<String>,

    /// Generic company-name field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// All entity name candidates the extraction surfaced
    #[serde(default)]
    pub entities: Vec<String>,

    /// Raw page content for LLM-assisted fallback extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl DomainDump {
    /// A dump carrying only the domain
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }
}
