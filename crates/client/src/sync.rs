//! Household synchronization engine.
//!
//! Maintains the cached household view for the authenticated user:
//! fetches on activation, refetches on every change notification, and
//! exposes the result through the store's household slice.
//!
//! # Semantics
//!
//! - Activation with no user clears the household list (selection is left
//!   untouched) and opens no subscription.
//! - Activation with a user runs an initial fetch - which auto-selects
//!   the first household exactly once, if nothing is selected yet - and
//!   subscribes to change notifications. Each notification triggers a
//!   refetch that replaces the list without re-running the selection rule.
//! - Re-activating (identity change) closes the previous subscription
//!   before opening a new one.
//! - Fetch failures never clear state: the previous data stays visible
//!   and the failure is recorded in `last_error`.
//!
//! # Ordering
//!
//! No ordering is enforced between overlapping fetches: results apply in
//! completion order, so a slow fetch that started earlier can overwrite a
//! fast refetch that started later (last-resolved-wins). Deactivation
//! closes the subscription but does not cancel in-flight fetches; their
//! results still apply.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use grocer_core::{HouseholdId, UserId};

use crate::models::Household;
use crate::remote::{ChangeCallback, Subscription};
use crate::repos::HouseholdSource;
use crate::store::{HouseholdSlice, Slice, Store};

/// Drives the household slice of the store from a [`HouseholdSource`].
///
/// Owns at most one open subscription at a time, released exactly once on
/// deactivation, re-activation, or drop. Must be used within a Tokio
/// runtime.
pub struct HouseholdSync<S: HouseholdSource> {
    source: Arc<S>,
    store: Store,
    subscription: Mutex<Option<Subscription>>,
}

impl<S: HouseholdSource> HouseholdSync<S> {
    /// Create an engine over `source`, writing into `store`.
    #[must_use]
    pub fn new(source: Arc<S>, store: Store) -> Self {
        Self {
            source,
            store,
            subscription: Mutex::new(None),
        }
    }

    /// Bind the engine to the authenticated identity.
    ///
    /// Closes any previous subscription first, so calling this again when
    /// the identity changes re-synchronizes instead of staying bound to
    /// the identity observed first.
    pub fn activate(&self, user: Option<UserId>) {
        self.close_subscription();

        let Some(user) = user else {
            // Selection is deliberately left in place: the next login may
            // see the same households.
            self.store.household.update(|s| {
                s.households.clear();
                s.is_loading = false;
            });
            tracing::debug!("activated without a user, household list cleared");
            return;
        };

        self.store.household.update(|s| s.is_loading = true);
        spawn_fetch(&self.source, &self.store.household, user, true);

        let source = Arc::clone(&self.source);
        let slice = self.store.household.clone();
        let on_change: ChangeCallback = Arc::new(move || {
            spawn_fetch(&source, &slice, user, false);
        });

        let subscription = self.source.subscribe(user, on_change);
        *self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscription);

        tracing::debug!(%user, "household sync activated");
    }

    /// Release the subscription. In-flight fetches are not cancelled and
    /// may still apply their results.
    pub fn deactivate(&self) {
        self.close_subscription();
    }

    /// Select the active household.
    ///
    /// Pure local mutation: no server round-trip, and no validation that
    /// `id` is one of the cached households.
    pub fn set_current_household(&self, id: HouseholdId) {
        self.store
            .household
            .update(|s| s.current_household_id = Some(id));
    }

    /// Snapshot the household slice.
    #[must_use]
    pub fn state(&self) -> HouseholdSlice {
        self.store.household.get()
    }

    /// Subscribe to household slice changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<HouseholdSlice> {
        self.store.household.watch()
    }

    /// The selected household, resolved against the cached list.
    #[must_use]
    pub fn current_household(&self) -> Option<Household> {
        self.store.household.get().current_household().cloned()
    }

    fn close_subscription(&self) {
        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = previous {
            subscription.close();
        }
    }
}

impl<S: HouseholdSource> Drop for HouseholdSync<S> {
    fn drop(&mut self) {
        self.close_subscription();
    }
}

/// Spawn a fetch-and-replace for `user`.
///
/// `initial` enables the one-time default-selection rule: if nothing is
/// selected and the result is non-empty, select the first household
/// (server order). Refetches never touch the selection, even when the
/// selected household has disappeared from the new list.
fn spawn_fetch<S: HouseholdSource>(
    source: &Arc<S>,
    slice: &Slice<HouseholdSlice>,
    user: UserId,
    initial: bool,
) {
    let source = Arc::clone(source);
    let slice = slice.clone();
    tokio::spawn(async move {
        match source.fetch_for_user(user).await {
            Ok(households) => {
                slice.update(|s| {
                    s.households = households;
                    if initial && s.current_household_id.is_none() {
                        s.current_household_id = s.households.first().map(|h| h.id);
                    }
                    s.is_loading = false;
                    s.last_error = None;
                });
            }
            Err(err) => {
                // Keep the stale-but-consistent data; just record the
                // failure for callers that want to surface it.
                tracing::warn!(%user, error = %err, initial, "household fetch failed");
                slice.update(|s| {
                    s.is_loading = false;
                    s.last_error = Some(err.to_string());
                });
            }
        }
    });
}
