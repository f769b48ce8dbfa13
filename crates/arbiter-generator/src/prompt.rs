//! Prompt for the LLM-assisted fallback name extraction

use crate::heuristics::clean_entity_name;

const EXTRACTION_INSTRUCTIONS: &str = r#"Identify the legal company name that operates the website described below.

Rules:
- Answer with the company name only, on a single line
- Prefer the registered legal name (with suffix like Inc, GmbH, Ltd) when visible
- Ignore product names, slogans, and navigation text
- If no company name can be determined, answer exactly: UNKNOWN"#;

/// Build the fallback extraction prompt for a domain's raw content.
pub fn build_name_extraction_prompt(domain: &str, content: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str(EXTRACTION_INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Domain: {}\n\n", domain));
    prompt.push_str("Website content:\n---\n");
    prompt.push_str(content);
    prompt.push_str("\n---\n");
    prompt
}

/// Parse the backend's reply into a usable entity name.
///
/// Takes the first non-empty line, strips quoting, and applies the same
/// cleanup as any other extracted candidate. `UNKNOWN` and degenerate
/// answers yield `None`.
pub fn parse_name_response(response: &str) -> Option<String> {
    let line = response
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())?;

    let unquoted = line.trim_matches(['"', '\'', '`']);
    if unquoted.eq_ignore_ascii_case("unknown") {
        return None;
    }

    clean_entity_name(unquoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_domain_and_content() {
        let prompt = build_name_extraction_prompt("acme.com", "Welcome to Acme Corp");
        assert!(prompt.contains("Domain: acme.com"));
        assert!(prompt.contains("Welcome to Acme Corp"));
        assert!(prompt.contains("company name only"));
    }

    #[test]
    fn test_parse_plain_answer() {
        assert_eq!(parse_name_response("Acme Corp\n").as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_parse_quoted_answer() {
        assert_eq!(parse_name_response("\"Acme Corp\"").as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_parse_skips_leading_blank_lines() {
        assert_eq!(
            parse_name_response("\n\n  Globex GmbH  ").as_deref(),
            Some("Globex GmbH")
        );
    }

    #[test]
    fn test_parse_unknown_is_none() {
        assert_eq!(parse_name_response("UNKNOWN"), None);
        assert_eq!(parse_name_response("unknown"), None);
    }

    #[test]
    fn test_parse_empty_is_none() {
        assert_eq!(parse_name_response(""), None);
        assert_eq!(parse_name_response("   \n  "), None);
    }
}
