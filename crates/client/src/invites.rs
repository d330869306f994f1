//! Invite draft flow with debounced user search.
//!
//! The invite form searches users by email prefix as the caller types,
//! accumulates selections in a draft, and submits the draft as a batch.
//! Search dispatch is debounced so a burst of keystrokes issues one query,
//! and results from superseded queries are dropped instead of flashing
//! outdated matches.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use grocer_core::UserId;

use crate::models::User;
use crate::remote::RemoteError;
use crate::store::Slice;

/// Quiescence window before a typed query is dispatched.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

type SearchFn<T> =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<Vec<T>, RemoteError>> + Send + Sync>;

/// A draft invitation: users selected but not yet submitted.
#[derive(Debug, Clone, Default)]
pub struct InviteDraft {
    pending: Vec<User>,
}

impl InviteDraft {
    /// Create an empty draft.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Add a user to the draft.
    ///
    /// Duplicates are not filtered here; callers that want one invite per
    /// user check [`Self::contains`] first.
    pub fn add(&mut self, user: User) {
        self.pending.push(user);
    }

    /// Remove every selection of `user` from the draft.
    pub fn remove(&mut self, user: UserId) {
        self.pending.retain(|u| u.id != user);
    }

    /// Whether `user` is already in the draft.
    #[must_use]
    pub fn contains(&self, user: UserId) -> bool {
        self.pending.iter().any(|u| u.id == user)
    }

    /// The users currently selected, in selection order.
    #[must_use]
    pub fn pending(&self) -> &[User] {
        &self.pending
    }

    /// Whether the draft has no selections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Submit the draft through `f` and clear it on success.
    ///
    /// An empty draft submits nothing and succeeds. On failure the
    /// selections are retained so the caller can retry.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `f`.
    pub async fn submit<F, Fut>(&mut self, f: F) -> Result<(), RemoteError>
    where
        F: FnOnce(Vec<User>) -> Fut,
        Fut: Future<Output = Result<(), RemoteError>>,
    {
        if self.pending.is_empty() {
            return Ok(());
        }

        f(self.pending.clone()).await?;
        self.pending.clear();
        Ok(())
    }
}

/// Debounced incremental search over a caller-supplied async function.
///
/// Feed keystrokes in with [`set_query`](Self::set_query); once input has
/// been quiescent for the debounce window, the latest query is dispatched.
/// Results land in an observable slice. A query issued while an earlier
/// one is still in flight supersedes it: the earlier result is dropped on
/// arrival rather than overwriting newer matches.
pub struct DebouncedSearch<T: Clone + Send + Sync + 'static> {
    input: mpsc::UnboundedSender<String>,
    results: Slice<Vec<T>>,
    generation: Arc<AtomicU64>,
    worker: JoinHandle<()>,
}

impl<T: Clone + Send + Sync + 'static> DebouncedSearch<T> {
    /// Create a search with the default debounce window.
    #[must_use]
    pub fn new(
        search: impl Fn(String) -> BoxFuture<'static, Result<Vec<T>, RemoteError>>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self::with_debounce(search, DEFAULT_DEBOUNCE)
    }

    /// Create a search with an explicit debounce window.
    #[must_use]
    pub fn with_debounce(
        search: impl Fn(String) -> BoxFuture<'static, Result<Vec<T>, RemoteError>>
        + Send
        + Sync
        + 'static,
        debounce: Duration,
    ) -> Self {
        let (input, rx) = mpsc::unbounded_channel();
        let results = Slice::new(Vec::new());
        let generation = Arc::new(AtomicU64::new(0));

        let worker = tokio::spawn(run_worker(
            rx,
            Arc::new(search) as SearchFn<T>,
            results.clone(),
            Arc::clone(&generation),
            debounce,
        ));

        Self {
            input,
            results,
            generation,
            worker,
        }
    }

    /// Record a new query. Dispatch happens after the debounce window
    /// passes with no further input.
    pub fn set_query(&self, query: impl Into<String>) {
        // Send only fails after the worker is gone, which only happens on
        // drop.
        let _ = self.input.send(query.into());
    }

    /// Snapshot the current results.
    #[must_use]
    pub fn results(&self) -> Vec<T> {
        self.results.get()
    }

    /// Subscribe to result changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Vec<T>> {
        self.results.watch()
    }

    /// Empty the results and invalidate any in-flight query.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.results.update(Vec::clear);
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for DebouncedSearch<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker<T: Clone + Send + Sync + 'static>(
    mut rx: mpsc::UnboundedReceiver<String>,
    search: SearchFn<T>,
    results: Slice<Vec<T>>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
) {
    while let Some(received) = rx.recv().await {
        let mut query = received;

        // Absorb further input until the channel stays quiet for the
        // debounce window; only the latest query survives.
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(next)) => query = next,
                Ok(None) | Err(_) => break,
            }
        }

        let current = generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&generation);
        let results = results.clone();
        let fut = search(query.clone());

        // Searches run detached so a slow response never blocks newer
        // input from being absorbed above.
        tokio::spawn(async move {
            match fut.await {
                Ok(items) => {
                    if generation.load(Ordering::SeqCst) == current {
                        results.update(|r| *r = items);
                    } else {
                        tracing::debug!(query = %query, "dropping superseded search result");
                    }
                }
                Err(error) => {
                    tracing::warn!(query = %query, %error, "user search failed");
                }
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use futures::FutureExt;

    use grocer_core::Email;

    use super::*;

    fn user(email: &str) -> User {
        User {
            id: UserId::generate(),
            created_at: Utc::now(),
            email: Email::parse(email).unwrap(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
        }
    }

    #[test]
    fn test_draft_add_remove() {
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");

        let mut draft = InviteDraft::new();
        draft.add(alice.clone());
        draft.add(bob.clone());
        assert_eq!(draft.pending().len(), 2);
        assert!(draft.contains(alice.id));

        draft.remove(alice.id);
        assert_eq!(draft.pending().len(), 1);
        assert!(!draft.contains(alice.id));
        assert_eq!(draft.pending()[0].id, bob.id);
    }

    #[test]
    fn test_draft_allows_duplicates() {
        let alice = user("alice@example.com");
        let mut draft = InviteDraft::new();
        draft.add(alice.clone());
        draft.add(alice.clone());
        assert_eq!(draft.pending().len(), 2);

        // remove drops every copy
        draft.remove(alice.id);
        assert!(draft.is_empty());
    }

    #[tokio::test]
    async fn test_draft_submit_clears_on_success() {
        let alice = user("alice@example.com");
        let mut draft = InviteDraft::new();
        draft.add(alice.clone());

        let submitted = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&submitted);
        draft
            .submit(move |users| async move {
                sink.lock().unwrap().extend(users);
                Ok(())
            })
            .await
            .unwrap();

        assert!(draft.is_empty());
        assert_eq!(submitted.lock().unwrap().len(), 1);
        assert_eq!(submitted.lock().unwrap()[0].id, alice.id);
    }

    #[tokio::test]
    async fn test_draft_submit_retains_on_failure() {
        let mut draft = InviteDraft::new();
        draft.add(user("alice@example.com"));

        let result = draft
            .submit(|_| async { Err(RemoteError::Auth("denied".to_owned())) })
            .await;

        assert!(result.is_err());
        assert_eq!(draft.pending().len(), 1);
    }

    #[tokio::test]
    async fn test_draft_submit_empty_is_noop() {
        let mut draft = InviteDraft::new();
        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);
        draft
            .submit(move |_| async move {
                *flag.lock().unwrap() = true;
                Ok(())
            })
            .await
            .unwrap();
        assert!(!*called.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_coalesces_rapid_input() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&calls);
        let search = DebouncedSearch::new(move |query: String| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(query.clone());
                Ok(vec![query])
            }
            .boxed()
        });

        let mut rx = search.watch();
        search.set_query("a");
        search.set_query("al");
        search.set_query("ali");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), vec!["ali".to_owned()]);
        assert_eq!(*calls.lock().unwrap(), vec!["ali".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_drops_superseded_result() {
        let search = DebouncedSearch::new(|query: String| {
            async move {
                if query == "slow" {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
                Ok(vec![query])
            }
            .boxed()
        });

        search.set_query("slow");
        // Let the slow query dispatch before the next one arrives.
        tokio::time::sleep(Duration::from_millis(400)).await;

        search.set_query("fast");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(search.results(), vec!["fast".to_owned()]);

        // The slow query resolves now but has been superseded.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(search.results(), vec!["fast".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_clear_empties_results() {
        let search = DebouncedSearch::new(|query: String| async move { Ok(vec![query]) }.boxed());

        let mut rx = search.watch();
        search.set_query("al");
        rx.changed().await.unwrap();
        assert!(!search.results().is_empty());

        search.clear();
        assert!(search.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_clear_invalidates_in_flight() {
        let search = DebouncedSearch::new(|query: String| {
            async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(vec![query])
            }
            .boxed()
        });

        search.set_query("al");
        tokio::time::sleep(Duration::from_millis(400)).await;
        search.clear();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(search.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_errors_keep_previous_results() {
        let search = DebouncedSearch::new(|query: String| {
            async move {
                if query == "boom" {
                    Err(RemoteError::Auth("nope".to_owned()))
                } else {
                    Ok(vec![query])
                }
            }
            .boxed()
        });

        let mut rx = search.watch();
        search.set_query("al");
        rx.changed().await.unwrap();

        search.set_query("boom");
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(search.results(), vec!["al".to_owned()]);
    }
}
