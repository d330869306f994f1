//! User profile repository.
//!
//! Search results are cached with `moka` (5-minute TTL) since the invite
//! form re-issues the same prefixes as the user types.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;

use grocer_core::{Email, UserId};

use crate::models::User;
use crate::remote::{RemoteError, RestClient};

const TABLE: &str = "profile";
const SEARCH_LIMIT: usize = 10;
const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Profile row inserted right after signup.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileInsert {
    /// Matches the auth service's user id.
    pub id: UserId,
    /// Email the account was registered with.
    pub email: Email,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

/// Repository for user profile rows.
#[derive(Clone)]
pub struct UserRepository {
    rest: RestClient,
    search_cache: Cache<String, Arc<Vec<User>>>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        let search_cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { rest, search_cache }
    }

    /// Search users whose email starts with `query` (case-insensitive),
    /// at most [`SEARCH_LIMIT`] results in email order.
    ///
    /// An empty or whitespace-only query returns no results without a
    /// round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the query fails. Failures are not
    /// cached.
    pub async fn search_by_email(&self, query: &str) -> Result<Vec<User>, RemoteError> {
        let normalized = query.trim().to_lowercase();
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(hit) = self.search_cache.get(&normalized).await {
            tracing::debug!(query = %normalized, "user search cache hit");
            return Ok((*hit).clone());
        }

        let users: Vec<User> = self
            .rest
            .select(TABLE, &[
                ("email", format!("ilike.{normalized}%")),
                ("order", "email.asc".to_owned()),
                ("limit", SEARCH_LIMIT.to_string()),
            ])
            .await?;

        self.search_cache
            .insert(normalized, Arc::new(users.clone()))
            .await;
        Ok(users)
    }

    /// Insert the profile row for a freshly signed-up user.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] if a profile already exists for
    /// the user, other [`RemoteError`] variants on request failure.
    pub async fn insert_profile(&self, profile: &ProfileInsert) -> Result<User, RemoteError> {
        self.rest.insert(TABLE, profile).await
    }
}
