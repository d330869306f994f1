//! Per-entity query layers over the remote clients.
//!
//! Each repository translates domain operations into REST calls. They hold
//! no state beyond clients and caches; the hosted service is the source of
//! truth and every read may be stale the moment it returns.

pub mod households;
pub mod invites;
pub mod items;
pub mod lists;
pub mod meals;
pub mod users;

pub use households::HouseholdRepository;
pub use invites::InviteRepository;
pub use items::ItemRepository;
pub use lists::ListRepository;
pub use meals::MealRepository;
pub use users::{ProfileInsert, UserRepository};

use grocer_core::UserId;

use crate::models::Household;
use crate::remote::{ChangeCallback, RemoteError, Subscription};

/// Source of household state for the synchronization engine.
///
/// Implemented by [`HouseholdRepository`] for the hosted service and by
/// [`crate::remote::MemoryRemote`] for tests and local development.
pub trait HouseholdSource: Send + Sync + 'static {
    /// Fetch the households the user belongs to, in server order
    /// (creation order).
    ///
    /// A failure means "no change", never "no households".
    fn fetch_for_user(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<Household>, RemoteError>> + Send;

    /// Subscribe to changes touching the user's households. Invokes
    /// `on_change` at-least-once per server-side insert/update/delete;
    /// invocations may coalesce several changes.
    fn subscribe(&self, user: UserId, on_change: ChangeCallback) -> Subscription;
}
