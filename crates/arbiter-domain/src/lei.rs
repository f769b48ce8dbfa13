//! Legal Entity Identifier value type

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated Legal Entity Identifier.
///
/// LEIs are 20-character uppercase alphanumeric codes issued by the global
/// registry. Construction canonicalizes (trim + uppercase) before checking
/// the shape, so `" 5493001kjtiigc8y1r12 "` parses to the same value as
/// `"5493001KJTIIGC8Y1R12"`.
///
/// Only the shape is validated; the ISO 17442 checksum is deliberately not
/// verified here.
///
/// # Examples
///
/// ```
/// use arbiter_domain::Lei;
///
/// let lei = Lei::parse("5493001KJTIIGC8Y1R12").unwrap();
/// assert_eq!(lei.as_str(), "5493001KJTIIGC8Y1R12");
///
/// assert!(Lei::parse("not-a-lei").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Lei(String);

impl Lei {
    /// Parse a LEI, canonicalizing case and surrounding whitespace.
    ///
    /// Returns `None` when the trimmed, uppercased input does not match the
    /// 20-character alphanumeric shape.
    pub fn parse(raw: &str) -> Option<Self> {
        let canonical = raw.trim().to_uppercase();
        if canonical.len() == 20
            && canonical
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            Some(Self(canonical))
        } else {
            None
        }
    }

    /// The canonical 20-character string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Lei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Lei {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("Invalid LEI: {}", value))
    }
}

impl From<Lei> for String {
    fn from(lei: Lei) -> Self {
        lei.0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every successfully parsed LEI has the canonical shape
        #[test]
        fn test_parsed_lei_shape(raw in ".{0,40}") {
            if let Some(lei) = Lei::parse(&raw) {
                prop_assert_eq!(lei.as_str().len(), 20);
                prop_assert!(lei
                    .as_str()
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            }
        }

        /// Property: parsing is idempotent on canonical output
        #[test]
        fn test_parse_idempotent(raw in "[a-zA-Z0-9]{20}") {
            let first = Lei::parse(&raw).unwrap();
            let second = Lei::parse(first.as_str()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
