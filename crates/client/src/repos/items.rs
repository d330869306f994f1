//! Catalog item repository.

use serde::Serialize;

use grocer_core::HouseholdId;

use crate::models::Item;
use crate::remote::{RemoteError, RestClient};

const TABLE: &str = "item";

#[derive(Serialize)]
struct NewItem<'a> {
    household_id: HouseholdId,
    name: &'a str,
}

/// Repository for a household's grocery item catalog.
#[derive(Clone)]
pub struct ItemRepository {
    rest: RestClient,
}

impl ItemRepository {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Fetch the household's catalog in name order.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the query fails.
    pub async fn fetch_for_household(
        &self,
        household: HouseholdId,
    ) -> Result<Vec<Item>, RemoteError> {
        self.rest
            .select(TABLE, &[
                ("household_id", format!("eq.{household}")),
                ("order", "name.asc".to_owned()),
            ])
            .await
    }

    /// Add a catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the insert fails.
    pub async fn create(&self, household: HouseholdId, name: &str) -> Result<Item, RemoteError> {
        self.rest
            .insert(TABLE, &NewItem {
                household_id: household,
                name,
            })
            .await
    }
}
