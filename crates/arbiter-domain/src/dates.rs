//! Registry date handling
//!
//! Registry records carry update dates as RFC 3339 timestamps on some
//! endpoints and bare `YYYY-MM-DD` dates on others; both are accepted.
//! Unparsable dates count as "not recent" rather than erroring.

use chrono::{DateTime, Months, NaiveDate, TimeZone, Utc};

/// Parse a registry update date in either accepted form.
pub fn parse_update_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Whether `raw` parses to a date no older than `months` before `now`.
pub fn within_months(raw: &str, months: u32, now: DateTime<Utc>) -> bool {
    let Some(date) = parse_update_date(raw) else {
        return false;
    };
    match now.checked_sub_months(Months::new(months)) {
        Some(cutoff) => date >= cutoff,
        None => true,
    }
}
