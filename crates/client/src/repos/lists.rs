//! Shopping list repository.

use chrono::{DateTime, Utc};
use serde::Serialize;

use grocer_core::{HouseholdId, ItemId, ListItemId};

use crate::models::ListItem;
use crate::remote::{RemoteError, RestClient};

const TABLE: &str = "list_item";

#[derive(Serialize)]
struct NewListItem {
    household_id: HouseholdId,
    item_id: ItemId,
    complete: bool,
}

#[derive(Serialize)]
struct CompletionPatch {
    complete: bool,
    completed_at: Option<DateTime<Utc>>,
}

/// Repository for a household's shopping list.
#[derive(Clone)]
pub struct ListRepository {
    rest: RestClient,
}

impl ListRepository {
    /// Create a new list repository.
    #[must_use]
    pub const fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Fetch the household's list in the order entries were added.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the query fails.
    pub async fn fetch_for_household(
        &self,
        household: HouseholdId,
    ) -> Result<Vec<ListItem>, RemoteError> {
        self.rest
            .select(TABLE, &[
                ("household_id", format!("eq.{household}")),
                ("order", "created_at.asc".to_owned()),
            ])
            .await
    }

    /// Put a catalog item on the list, initially incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the insert fails.
    pub async fn add(
        &self,
        household: HouseholdId,
        item: ItemId,
    ) -> Result<ListItem, RemoteError> {
        self.rest
            .insert(TABLE, &NewListItem {
                household_id: household,
                item_id: item,
                complete: false,
            })
            .await
    }

    /// Check an entry off (or back on).
    ///
    /// Writes `complete` and `completed_at` together so the stored row
    /// keeps the invariant that they agree.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::NotFound`] if the entry does not exist,
    /// other [`RemoteError`] variants on request failure.
    pub async fn set_complete(
        &self,
        entry: ListItemId,
        complete: bool,
    ) -> Result<ListItem, RemoteError> {
        let patch = CompletionPatch {
            complete,
            completed_at: complete.then(Utc::now),
        };

        let mut rows: Vec<ListItem> = self
            .rest
            .update(TABLE, &[("id", format!("eq.{entry}"))], &patch)
            .await?;

        rows.pop()
            .ok_or_else(|| RemoteError::NotFound(format!("list item {entry}")))
    }
}
