//! Invite repository.

use serde::Serialize;

use grocer_core::{HouseholdId, InviteId, InviteStatus, UserId};

use crate::models::Invite;
use crate::remote::{RemoteError, RestClient};

const TABLE: &str = "invite";

#[derive(Serialize)]
struct NewInvite {
    household_id: HouseholdId,
    user_id: UserId,
    status: InviteStatus,
}

#[derive(Serialize)]
struct StatusPatch {
    status: InviteStatus,
}

/// Repository for invite rows.
#[derive(Clone)]
pub struct InviteRepository {
    rest: RestClient,
}

impl InviteRepository {
    /// Create a new invite repository.
    #[must_use]
    pub const fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Invite `user` to `household`. The invite starts `pending`.
    ///
    /// No dedup against already-invited users happens here; that is the
    /// caller's call to make.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the insert fails.
    pub async fn create(
        &self,
        household: HouseholdId,
        user: UserId,
    ) -> Result<Invite, RemoteError> {
        self.rest
            .insert(TABLE, &NewInvite {
                household_id: household,
                user_id: user,
                status: InviteStatus::Pending,
            })
            .await
    }

    /// Fetch the invites addressed to `user`, household embedded, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the query fails.
    pub async fn fetch_for_user(&self, user: UserId) -> Result<Vec<Invite>, RemoteError> {
        self.rest
            .select(TABLE, &[
                ("select", "*,household(*)".to_owned()),
                ("user_id", format!("eq.{user}")),
                ("order", "created_at.desc".to_owned()),
            ])
            .await
    }

    /// Accept or decline a pending invite.
    ///
    /// The update is conditional on `status = pending`, so an invite
    /// transitions at most once; racing responders lose with a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] if the invite was already
    /// accepted or declined (or does not exist), other [`RemoteError`]
    /// variants on request failure.
    pub async fn respond(&self, invite: InviteId, accept: bool) -> Result<Invite, RemoteError> {
        let status = if accept {
            InviteStatus::Accepted
        } else {
            InviteStatus::Declined
        };
        debug_assert!(InviteStatus::Pending.can_become(status));

        let mut rows: Vec<Invite> = self
            .rest
            .update(
                TABLE,
                &[
                    ("id", format!("eq.{invite}")),
                    ("status", format!("eq.{}", InviteStatus::Pending)),
                ],
                &StatusPatch { status },
            )
            .await?;

        rows.pop()
            .ok_or_else(|| RemoteError::Conflict(format!("invite {invite} is not pending")))
    }
}
