//! In-process backend for tests and local development.
//!
//! Implements the same seams as the hosted service - household fetch plus
//! payload-free change notifications - over a broadcast channel, so the
//! synchronization engine can be exercised without a network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use grocer_core::UserId;

use crate::models::Household;
use crate::repos::HouseholdSource;

use super::{ChangeCallback, RemoteError, Subscription};

const CHANNEL_CAPACITY: usize = 64;

/// An in-memory stand-in for the hosted service.
///
/// Cheap to clone; all clones share the same rows and notification
/// channel. Writes notify subscribers the same way the real service does:
/// a bare signal, no payload.
#[derive(Clone)]
pub struct MemoryRemote {
    inner: Arc<MemoryRemoteInner>,
}

struct MemoryRemoteInner {
    households: Mutex<HashMap<UserId, Vec<Household>>>,
    changes: broadcast::Sender<UserId>,
}

impl MemoryRemote {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(MemoryRemoteInner {
                households: Mutex::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Replace the households visible to `user` and notify subscribers.
    pub fn put_households(&self, user: UserId, households: Vec<Household>) {
        self.inner
            .households
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user, households);
        self.notify(user);
    }

    /// Emit a change notification for `user` without touching rows.
    pub fn notify(&self, user: UserId) {
        // Send only fails when nobody is subscribed, which is fine.
        let _ = self.inner.changes.send(user);
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl HouseholdSource for MemoryRemote {
    async fn fetch_for_user(&self, user: UserId) -> Result<Vec<Household>, RemoteError> {
        Ok(self
            .inner
            .households
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe(&self, user: UserId, on_change: ChangeCallback) -> Subscription {
        let mut rx = self.inner.changes.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(changed) if changed == user => on_change(),
                    Ok(_) => {}
                    // Lagging drops intermediate signals, which the
                    // at-least-once contract allows; resubscription is
                    // implicit in the receiver.
                    Err(broadcast::error::RecvError::Lagged(_)) => on_change(),
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription::new(move || handle.abort())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_fetch_unknown_user_is_empty() {
        let remote = MemoryRemote::new();
        let rows = remote.fetch_for_user(UserId::generate()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_notifications_are_scoped_to_user() {
        let remote = MemoryRemote::new();
        let watched = UserId::generate();
        let other = UserId::generate();

        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        let sub = remote.subscribe(
            watched,
            Arc::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        );

        remote.notify(other);
        remote.notify(watched);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        sub.close();
    }

    #[tokio::test]
    async fn test_closed_subscription_stops_notifying() {
        let remote = MemoryRemote::new();
        let user = UserId::generate();

        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);
        let sub = remote.subscribe(
            user,
            Arc::new(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            }),
        );

        remote.notify(user);
        tokio::time::sleep(Duration::from_millis(50)).await;
        sub.close();

        remote.notify(user);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
