//! User domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grocer_core::{Email, UserId};

/// A registered user.
///
/// Users are immutable once created; profile editing is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID (matches the auth service's user id).
    pub id: UserId,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// User's email address.
    pub email: Email,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

impl User {
    /// Display name, e.g. "Ada Lovelace".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Initials derived from the first character of each name part.
    #[must_use]
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: UserId::generate(),
            created_at: Utc::now(),
            email: Email::parse("ada@example.com").unwrap(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(sample().display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_initials() {
        assert_eq!(sample().initials(), "AL");
    }

    #[test]
    fn test_deserialize_row() {
        let json = r#"{
            "id": "7b0f8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f",
            "created_at": "2023-04-01T12:00:00Z",
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.email.as_str(), "ada@example.com");
    }
}
