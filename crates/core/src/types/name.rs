//! Person name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PersonName`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum NameError {
    /// A name part is shorter than the minimum length.
    #[error("{part} must be at least {min} characters")]
    TooShort {
        /// Which part failed ("first name" or "last name").
        part: &'static str,
        /// Minimum allowed length.
        min: usize,
    },
    /// A name part is longer than the maximum length.
    #[error("{part} must be at most {max} characters")]
    TooLong {
        /// Which part failed.
        part: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

/// A person's display name, split into first and last parts.
///
/// Both parts must be 2-100 characters after trimming; the service stores
/// them separately so the UI can derive initials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PersonName {
    first: String,
    last: String,
}

impl PersonName {
    /// Minimum length of each name part.
    pub const MIN_PART_LENGTH: usize = 2;
    /// Maximum length of each name part.
    pub const MAX_PART_LENGTH: usize = 100;

    /// Parse a `PersonName` from first and last parts.
    ///
    /// Leading and trailing whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] if either part is shorter than 2 or longer
    /// than 100 characters after trimming.
    pub fn parse(first: &str, last: &str) -> Result<Self, NameError> {
        let first = validate_part(first, "first name")?;
        let last = validate_part(last, "last name")?;
        Ok(Self { first, last })
    }

    /// The first name.
    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The last name.
    #[must_use]
    pub fn last(&self) -> &str {
        &self.last
    }

    /// Initials derived from the first character of each part.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first
            .chars()
            .take(1)
            .chain(self.last.chars().take(1))
            .collect()
    }
}

fn validate_part(part: &str, label: &'static str) -> Result<String, NameError> {
    let trimmed = part.trim();
    if trimmed.chars().count() < PersonName::MIN_PART_LENGTH {
        return Err(NameError::TooShort {
            part: label,
            min: PersonName::MIN_PART_LENGTH,
        });
    }
    if trimmed.chars().count() > PersonName::MAX_PART_LENGTH {
        return Err(NameError::TooLong {
            part: label,
            max: PersonName::MAX_PART_LENGTH,
        });
    }
    Ok(trimmed.to_owned())
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let name = PersonName::parse("Ada", "Lovelace").unwrap();
        assert_eq!(name.first(), "Ada");
        assert_eq!(name.last(), "Lovelace");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let name = PersonName::parse("  Ada ", " Lovelace  ").unwrap();
        assert_eq!(name.to_string(), "Ada Lovelace");
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            PersonName::parse("A", "Lovelace"),
            Err(NameError::TooShort {
                part: "first name",
                ..
            })
        ));
        assert!(matches!(
            PersonName::parse("Ada", " "),
            Err(NameError::TooShort {
                part: "last name",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "a".repeat(101);
        assert!(matches!(
            PersonName::parse(&long, "Lovelace"),
            Err(NameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_initials() {
        let name = PersonName::parse("Ada", "Lovelace").unwrap();
        assert_eq!(name.initials(), "AL");
    }
}
