//! Candidate confidence scoring

use arbiter_domain::dates::within_months;
use arbiter_domain::EntityCandidate;
use chrono::{DateTime, Utc};

/// Score a search candidate against the term it was found for.
///
/// Starts at 0.5 and adds:
/// - 0.3 for an exact case-insensitive legal-name match, or 0.2 for a
///   case-insensitive substring match
/// - 0.1 for an `ACTIVE` entity status
/// - 0.05 for a registry update within the last 12 months
/// - 0.05 for a search relevance score above 0.8
///
/// The result is capped at 1.0.
pub fn calculate_gleif_confidence(
    candidate: &EntityCandidate,
    search_term: &str,
    now: DateTime<Utc>,
) -> f64 {
    let mut score: f64 = 0.5;

    let legal_name = candidate.legal_name.to_lowercase();
    let term = search_term.to_lowercase();
    if legal_name == term {
        score += 0.3;
    } else if legal_name.contains(&term) {
        score += 0.2;
    }

    if candidate.entity_status.as_deref() == Some("ACTIVE") {
        score += 0.1;
    }

    if candidate
        .last_update_date
        .as_deref()
        .is_some_and(|date| within_months(date, 12, now))
    {
        score += 0.05;
    }

    if candidate.relevance_score.is_some_and(|s| s > 0.8) {
        score += 0.05;
    }

    score.min(1.0)
}
