//! Clients for the hosted data service.
//!
//! # Architecture
//!
//! The hosted service is the source of truth - NO local persistence, direct
//! API calls over HTTPS:
//!
//! - [`RestClient`] - row-level CRUD (`{base}/rest/v1/{table}` with
//!   `column=eq.value` filters and `select=` embedding)
//! - [`AuthClient`] - signup against `{base}/auth/v1`
//! - [`RealtimeClient`] - change-notification stream; payload-free
//!   at-least-once signals per matching row change
//! - [`memory::MemoryRemote`] - in-process backend for tests and local
//!   development
//!
//! # Example
//!
//! ```rust,ignore
//! use grocer_client::remote::{ChangeFilter, RealtimeClient, RestClient};
//!
//! let rest = RestClient::new(&config)?;
//! let households: Vec<Household> = rest
//!     .select("household", &[("owner_id", format!("eq.{user_id}"))])
//!     .await?;
//!
//! let realtime = RealtimeClient::new(&config)?;
//! let sub = realtime.subscribe(
//!     ChangeFilter::table("household").eq("member_id", user_id),
//!     std::sync::Arc::new(|| println!("something changed")),
//! );
//! sub.close();
//! ```

pub mod auth;
pub mod memory;
pub mod realtime;
pub mod rest;

pub use auth::{AuthClient, AuthSession, AuthUser, Session};
pub use memory::MemoryRemote;
pub use realtime::RealtimeClient;
pub use rest::RestClient;

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

/// Errors that can occur when talking to the hosted data service.
///
/// Callers treating a fetch as a refresh must treat any of these as
/// "no change", never as "empty result".
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport failed (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Body snippet for diagnostics.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Authentication operation rejected by the service.
    #[error("auth error: {0}")]
    Auth(String),

    /// Rate limited by the service.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write rejected because the row is no longer in the expected state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Endpoint URL could not be constructed.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Callback invoked when a subscribed row changes.
///
/// Carries no payload - it is a pure "something changed" signal. The
/// service may coalesce several row changes into one invocation.
pub type ChangeCallback = std::sync::Arc<dyn Fn() + Send + Sync>;

/// Filter criteria for a change-notification subscription.
///
/// Keyed by table plus an optional `column=eq.value` predicate, matching
/// the REST filter syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    /// Table to watch.
    pub table: String,
    /// Optional row predicate, e.g. `member_id=eq.<uuid>`.
    pub filter: Option<String>,
}

impl ChangeFilter {
    /// Watch every change to a table.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            filter: None,
        }
    }

    /// Narrow the subscription to rows where `column` equals `value`.
    #[must_use]
    pub fn eq(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.filter = Some(format!("{column}=eq.{value}"));
        self
    }
}

type CloseFn = Box<dyn FnOnce() + Send>;

/// Handle for an open change-notification subscription.
///
/// Closing stops future notifications but does not cancel fetches already
/// in flight. `close` is idempotent; dropping the handle also closes it.
pub struct Subscription {
    closed: AtomicBool,
    on_close: Mutex<Option<CloseFn>>,
}

impl Subscription {
    /// Wrap a teardown action. The action runs at most once, on the first
    /// `close` (or drop).
    #[must_use]
    pub fn new(on_close: impl FnOnce() + Send + 'static) -> Self {
        Self {
            closed: AtomicBool::new(false),
            on_close: Mutex::new(Some(Box::new(on_close))),
        }
    }

    /// Close the subscription. Calling this more than once has no
    /// additional effect.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let teardown = self
            .on_close
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(teardown) = teardown {
            teardown();
        }
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_close_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        let sub = Subscription::new(move || {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        sub.close();
        sub.close();
        sub.close();

        assert!(sub.is_closed());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_closes_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        {
            let sub = Subscription::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            });
            sub.close();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_change_filter_eq() {
        let filter = ChangeFilter::table("household").eq("member_id", "abc");
        assert_eq!(filter.table, "household");
        assert_eq!(filter.filter.as_deref(), Some("member_id=eq.abc"));
    }

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::Status {
            status: 500,
            body: "oops".to_owned(),
        };
        assert_eq!(err.to_string(), "service returned 500: oops");

        let err = RemoteError::RateLimited(30);
        assert_eq!(err.to_string(), "rate limited, retry after 30 seconds");
    }
}
