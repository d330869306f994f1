//! Household domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grocer_core::{HouseholdId, UserId};

use super::User;

/// Errors raised by [`Household::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HouseholdError {
    /// The owner does not appear in the member list.
    #[error("owner {0} is not a member of household {1}")]
    OwnerNotMember(UserId, HouseholdId),
    /// The household has no members at all.
    #[error("household {0} has no members")]
    Empty(HouseholdId),
}

/// A group of users sharing lists, items, and meals.
///
/// Invariant: exactly one owner, and the owner is always a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    /// Unique household ID.
    pub id: HouseholdId,
    /// When the household was created.
    pub created_at: DateTime<Utc>,
    /// Display name.
    pub name: String,
    /// The single owner. Ownership transfer is out of scope.
    pub owner_id: UserId,
    /// Members, in server order. Always contains the owner.
    #[serde(default)]
    pub users: Vec<User>,
}

impl Household {
    /// Check the ownership invariant.
    ///
    /// The service enforces this on write; `validate` exists so locally
    /// constructed or refreshed copies can be checked in tests and debug
    /// assertions.
    ///
    /// # Errors
    ///
    /// Returns [`HouseholdError`] if the member list is empty or does not
    /// contain the owner.
    pub fn validate(&self) -> Result<(), HouseholdError> {
        if self.users.is_empty() {
            return Err(HouseholdError::Empty(self.id));
        }
        if !self.users.iter().any(|u| u.id == self.owner_id) {
            return Err(HouseholdError::OwnerNotMember(self.owner_id, self.id));
        }
        Ok(())
    }

    /// Whether the given user is a member.
    #[must_use]
    pub fn has_member(&self, user_id: UserId) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }

    /// The owner's user record, if present in the member list.
    #[must_use]
    pub fn owner(&self) -> Option<&User> {
        self.users.iter().find(|u| u.id == self.owner_id)
    }
}
