//! Shared observable state.
//!
//! The app keeps its client-visible state in one [`Store`] made of typed
//! slices. A [`Slice`] is a value behind a watch channel: any task can
//! read it, apply an update, or subscribe to fine-grained change
//! notifications, independent of any particular UI binding.

use std::sync::Arc;

use tokio::sync::watch;

use grocer_core::HouseholdId;

use crate::models::Household;

/// A typed slice of shared state.
///
/// Cheap to clone; all clones observe and mutate the same value. Updates
/// notify every subscriber obtained via [`Slice::watch`].
#[derive(Debug)]
pub struct Slice<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Slice<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> Slice<T> {
    /// Create a slice holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Snapshot the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Apply `f` to the value and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Subscribe to changes. The receiver yields the current value first.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Default> Default for Slice<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Household slice of the store.
///
/// `last_error` records the most recent fetch failure without discarding
/// the previous (stale but consistent) data; callers may surface or
/// ignore it.
#[derive(Debug, Clone, Default)]
pub struct HouseholdSlice {
    /// Cached households, in server order.
    pub households: Vec<Household>,
    /// The household the UI is acting on. Client-only state with no
    /// server counterpart; may dangle if the household disappears from a
    /// refreshed list.
    pub current_household_id: Option<HouseholdId>,
    /// Whether the initial fetch for the active identity is outstanding.
    pub is_loading: bool,
    /// Most recent fetch failure, if any.
    pub last_error: Option<String>,
}

impl HouseholdSlice {
    /// Resolve the selected household against the cached list.
    ///
    /// Returns `None` when nothing is selected or when the selection
    /// dangles (was removed server-side after being selected).
    #[must_use]
    pub fn current_household(&self) -> Option<&Household> {
        let id = self.current_household_id?;
        self.households.iter().find(|h| h.id == id)
    }
}

/// The process-wide store: one slice per domain area.
#[derive(Debug, Clone, Default)]
pub struct Store {
    /// Household list, selection, and load state.
    pub household: Slice<HouseholdSlice>,
}

impl Store {
    /// Create a store with empty slices.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_notifies_watchers() {
        let slice = Slice::new(0u32);
        let mut rx = slice.watch();
        assert!(!rx.has_changed().unwrap());

        slice.update(|v| *v = 7);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 7);
    }

    #[test]
    fn test_clones_share_state() {
        let slice = Slice::new(String::new());
        let clone = slice.clone();
        clone.update(|v| v.push_str("shared"));
        assert_eq!(slice.get(), "shared");
    }

    #[test]
    fn test_current_household_dangling_is_none() {
        let mut slice = HouseholdSlice::default();
        slice.current_household_id = Some(grocer_core::HouseholdId::generate());
        assert!(slice.current_household().is_none());
    }
}
