//! Invite domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grocer_core::{HouseholdId, InviteId, InviteStatus, UserId};

use super::Household;

/// A request for a user to join a household.
///
/// Created `pending`; transitions exactly once to `accepted` or `declined`
/// (see [`InviteStatus::can_become`]), then terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    /// Unique invite ID.
    pub id: InviteId,
    /// When the invite was created.
    pub created_at: DateTime<Utc>,
    /// The household the user is invited to.
    pub household_id: HouseholdId,
    /// The invited user.
    pub user_id: UserId,
    /// Lifecycle status.
    pub status: InviteStatus,
    /// Embedded household record, present when the query asked for it.
    #[serde(default)]
    pub household: Option<Household>,
}

impl Invite {
    /// Whether this invite can still be accepted or declined.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.status.is_pending()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_household() {
        let json = r#"{
            "id": "7b0f8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f",
            "created_at": "2023-04-01T12:00:00Z",
            "household_id": "9f0c8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f",
            "user_id": "5d0c8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f",
            "status": "pending"
        }"#;
        let invite: Invite = serde_json::from_str(json).unwrap();
        assert!(invite.is_open());
        assert!(invite.household.is_none());
    }

    #[test]
    fn test_terminal_invite_is_not_open() {
        let json = r#"{
            "id": "7b0f8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f",
            "created_at": "2023-04-01T12:00:00Z",
            "household_id": "9f0c8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f",
            "user_id": "5d0c8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f",
            "status": "declined"
        }"#;
        let invite: Invite = serde_json::from_str(json).unwrap();
        assert!(!invite.is_open());
    }
}
