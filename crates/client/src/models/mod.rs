//! Domain types.
//!
//! These mirror the rows the hosted service stores. The service is the
//! source of truth; instances held here are transient cached copies.

pub mod household;
pub mod invite;
pub mod list;
pub mod meal;
pub mod user;

pub use household::Household;
pub use invite::Invite;
pub use list::{Item, ListItem};
pub use meal::Meal;
pub use user::User;
