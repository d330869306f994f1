//! Household repository.

use serde::Serialize;

use grocer_core::UserId;

use crate::models::Household;
use crate::remote::{
    ChangeCallback, ChangeFilter, RealtimeClient, RemoteError, RestClient, Subscription,
};

use super::HouseholdSource;

const TABLE: &str = "household";

/// Columns for household queries: the row plus its members, embedded
/// through the membership join table.
const SELECT_WITH_MEMBERS: &str = "*,users:profile(*)";

#[derive(Serialize)]
struct NewHousehold<'a> {
    name: &'a str,
    owner_id: UserId,
}

/// Repository for household rows.
#[derive(Clone)]
pub struct HouseholdRepository {
    rest: RestClient,
    realtime: RealtimeClient,
}

impl HouseholdRepository {
    /// Create a new household repository.
    #[must_use]
    pub const fn new(rest: RestClient, realtime: RealtimeClient) -> Self {
        Self { rest, realtime }
    }

    /// Create a household owned by `owner`.
    ///
    /// The service adds the owner to the member list on insert, keeping
    /// the owner-is-member invariant.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the insert fails.
    pub async fn create(&self, name: &str, owner: UserId) -> Result<Household, RemoteError> {
        self.rest
            .insert(TABLE, &NewHousehold {
                name,
                owner_id: owner,
            })
            .await
    }
}

impl HouseholdSource for HouseholdRepository {
    /// Fetch the households `user` belongs to, members embedded, in
    /// creation order.
    async fn fetch_for_user(&self, user: UserId) -> Result<Vec<Household>, RemoteError> {
        self.rest
            .select(TABLE, &[
                ("select", SELECT_WITH_MEMBERS.to_owned()),
                ("users.id", format!("eq.{user}")),
                ("order", "created_at.asc".to_owned()),
            ])
            .await
    }

    fn subscribe(&self, user: UserId, on_change: ChangeCallback) -> Subscription {
        self.realtime
            .subscribe(ChangeFilter::table(TABLE).eq("member_id", user), on_change)
    }
}
