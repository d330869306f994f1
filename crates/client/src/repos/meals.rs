//! Saved meal repository.

use serde::Serialize;

use grocer_core::HouseholdId;

use crate::models::Meal;
use crate::remote::{RemoteError, RestClient};

const TABLE: &str = "meal";

#[derive(Serialize)]
struct NewMeal<'a> {
    household_id: HouseholdId,
    name: &'a str,
    description: &'a str,
}

/// Repository for a household's saved meals.
#[derive(Clone)]
pub struct MealRepository {
    rest: RestClient,
}

impl MealRepository {
    /// Create a new meal repository.
    #[must_use]
    pub const fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Fetch the household's saved meals in name order.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the query fails.
    pub async fn fetch_for_household(
        &self,
        household: HouseholdId,
    ) -> Result<Vec<Meal>, RemoteError> {
        self.rest
            .select(TABLE, &[
                ("household_id", format!("eq.{household}")),
                ("order", "name.asc".to_owned()),
            ])
            .await
    }

    /// Save a meal.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the insert fails.
    pub async fn create(
        &self,
        household: HouseholdId,
        name: &str,
        description: &str,
    ) -> Result<Meal, RemoteError> {
        self.rest
            .insert(TABLE, &NewMeal {
                household_id: household,
                name,
                description,
            })
            .await
    }
}
