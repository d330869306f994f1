//! Shopping list domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use grocer_core::{HouseholdId, ItemId, ListItemId};

/// A household-scoped catalog entry ("Grocery Items" in the app).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item ID.
    pub id: ItemId,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// Owning household.
    pub household_id: HouseholdId,
    /// Display name, e.g. "Oat milk".
    pub name: String,
}

/// Errors raised by [`ListItem::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListItemError {
    /// `complete` and `completed_at` disagree.
    #[error("list item {0} is marked complete={1} but completed_at is {2}")]
    CompletionMismatch(ListItemId, bool, &'static str),
}

/// An entry on a household's shopping list, referencing a catalog [`Item`].
///
/// Invariant: `complete` is true iff `completed_at` is set. Use
/// [`ListItem::mark_complete`] and [`ListItem::mark_incomplete`] so both
/// fields move together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Unique list entry ID.
    pub id: ListItemId,
    /// When the entry was added to the list.
    pub created_at: DateTime<Utc>,
    /// Owning household.
    pub household_id: HouseholdId,
    /// The catalog item this entry refers to.
    pub item_id: ItemId,
    /// Whether the entry has been checked off.
    pub complete: bool,
    /// When the entry was checked off; `None` while incomplete.
    pub completed_at: Option<DateTime<Utc>>,
}

impl ListItem {
    /// Check off the entry at the given time.
    ///
    /// Idempotent: re-marking a complete entry keeps the original
    /// completion time.
    pub fn mark_complete(&mut self, now: DateTime<Utc>) {
        if !self.complete {
            self.complete = true;
            self.completed_at = Some(now);
        }
    }

    /// Un-check the entry.
    pub fn mark_incomplete(&mut self) {
        self.complete = false;
        self.completed_at = None;
    }

    /// Check the completion invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ListItemError::CompletionMismatch`] when `complete` and
    /// `completed_at` disagree.
    pub fn validate(&self) -> Result<(), ListItemError> {
        match (self.complete, self.completed_at) {
            (true, None) => Err(ListItemError::CompletionMismatch(self.id, true, "unset")),
            (false, Some(_)) => Err(ListItemError::CompletionMismatch(self.id, false, "set")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn entry() -> ListItem {
        ListItem {
            id: ListItemId::generate(),
            created_at: Utc::now(),
            household_id: HouseholdId::generate(),
            item_id: ItemId::generate(),
            complete: false,
            completed_at: None,
        }
    }

    #[test]
    fn test_mark_complete_sets_timestamp() {
        let mut e = entry();
        let now = Utc::now();
        e.mark_complete(now);
        assert!(e.complete);
        assert_eq!(e.completed_at, Some(now));
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_mark_complete_is_idempotent() {
        let mut e = entry();
        let first = Utc::now();
        e.mark_complete(first);
        e.mark_complete(first + chrono::Duration::hours(1));
        assert_eq!(e.completed_at, Some(first));
    }

    #[test]
    fn test_mark_incomplete_clears_timestamp() {
        let mut e = entry();
        e.mark_complete(Utc::now());
        e.mark_incomplete();
        assert!(!e.complete);
        assert_eq!(e.completed_at, None);
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatch() {
        let mut e = entry();
        e.complete = true;
        assert!(e.validate().is_err());

        let mut e = entry();
        e.completed_at = Some(Utc::now());
        assert!(e.validate().is_err());
    }
}
