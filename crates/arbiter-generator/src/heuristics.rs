//! Entity-name heuristics applied before any network or LLM call

/// Corporate suffixes used to prefer company-like names among extracted
/// candidates.
pub const CORPORATE_SUFFIXES: &[&str] = &[
    "Inc",
    "Corp",
    "LLC",
    "Ltd",
    "GmbH",
    "AG",
    "SA",
    "SAS",
    "SpA",
    "BV",
    "NV",
    "Pty",
    "PLC",
    "SE",
    "Limited",
    "Corporation",
    "Company",
    "Incorporated",
];

/// Clean a candidate entity name.
///
/// Cuts at the first title separator, collapses whitespace, drops trailing
/// punctuation, and rejects strings too short or too long to be a name.
pub fn clean_entity_name(raw: &str) -> Option<String> {
    let head = raw
        .split(['|', '–', '—', '-', ':'])
        .next()
        .unwrap_or_default();

    let collapsed = head.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim_end_matches(['.', ',', ';', '!', '?']).trim();

    if trimmed.len() < 3 || trimmed.len() > 100 {
        return None;
    }
    Some(trimmed.to_string())
}

/// Whether a name ends in a recognized corporate suffix.
pub fn has_corporate_suffix(name: &str) -> bool {
    let lower = name.to_lowercase();
    let lower = lower.trim_end_matches('.');
    CORPORATE_SUFFIXES.iter().any(|suffix| {
        let suffix = suffix.to_lowercase();
        lower == suffix || lower.ends_with(&format!(" {}", suffix))
    })
}

/// Pick the best entity from a candidate list: the first corporate-suffixed
/// name, otherwise the first cleanable one.
pub fn pick_entity(candidates: &[String]) -> Option<String> {
    let cleaned: Vec<String> = candidates
        .iter()
        .filter_map(|raw| clean_entity_name(raw))
        .collect();

    cleaned
        .iter()
        .find(|name| has_corporate_suffix(name))
        .or_else(|| cleaned.first())
        .cloned()
}

/// Derive a last-resort entity name from the domain: strip any `www.`
/// prefix and the TLD, keep the first label. Never fails on a non-empty
/// domain.
pub fn domain_base_name(domain: &str) -> Option<String> {
    let host = domain
        .trim()
        .trim_start_matches("www.")
        .trim_end_matches('.');
    let label = host.split('.').next().unwrap_or_default();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cuts_at_separator() {
        assert_eq!(
            clean_entity_name("Acme Corp | Industrial Solutions").as_deref(),
            Some("Acme Corp")
        );
        assert_eq!(
            clean_entity_name("Globex: Home").as_deref(),
            Some("Globex")
        );
    }

    #[test]
    fn test_clean_collapses_whitespace_and_punctuation() {
        assert_eq!(
            clean_entity_name("  Acme   Corp.,  ").as_deref(),
            Some("Acme Corp")
        );
    }

    #[test]
    fn test_clean_rejects_degenerate_names() {
        assert_eq!(clean_entity_name("ab"), None);
        assert_eq!(clean_entity_name(&"x".repeat(150)), None);
    }

    #[test]
    fn test_corporate_suffix_detection() {
        assert!(has_corporate_suffix("Acme Corp"));
        assert!(has_corporate_suffix("Acme Inc."));
        assert!(has_corporate_suffix("Siemens AG"));
        assert!(!has_corporate_suffix("Acme"));
        assert!(!has_corporate_suffix("Agriculture"));
    }

    #[test]
    fn test_pick_entity_prefers_suffixed() {
        let candidates = vec![
            "Welcome Page".to_string(),
            "Acme Corp".to_string(),
            "Something Else".to_string(),
        ];
        assert_eq!(pick_entity(&candidates).as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_pick_entity_falls_back_to_first() {
        let candidates = vec!["Initech".to_string(), "Globex".to_string()];
        assert_eq!(pick_entity(&candidates).as_deref(), Some("Initech"));
    }

    #[test]
    fn test_pick_entity_empty() {
        assert_eq!(pick_entity(&[]), None);
    }

    #[test]
    fn test_domain_base_name() {
        assert_eq!(domain_base_name("acme.com").as_deref(), Some("acme"));
        assert_eq!(domain_base_name("www.acme.co.uk").as_deref(), Some("acme"));
        assert_eq!(domain_base_name(""), None);
    }
}
