//! Meal domain type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grocer_core::{HouseholdId, MealId};

/// A saved meal belonging to a household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    /// Unique meal ID.
    pub id: MealId,
    /// When the meal was created.
    pub created_at: DateTime<Utc>,
    /// Owning household.
    pub household_id: HouseholdId,
    /// Display name, e.g. "Taco night".
    pub name: String,
    /// Free-text description or recipe notes.
    pub description: String,
}
