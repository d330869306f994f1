//! Behavior test for the invite form flow: debounced search, selection,
//! batch submit.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;

use grocer_client::invites::{DebouncedSearch, InviteDraft};
use grocer_client::models::User;
use grocer_client::remote::RemoteError;
use grocer_core::{Email, UserId};

/// Route search logs through the test harness; first caller wins, the
/// rest are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn user(email: &str) -> User {
    User {
        id: UserId::generate(),
        created_at: Utc::now(),
        email: Email::parse(email).unwrap(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
    }
}

fn directory() -> Vec<User> {
    vec![
        user("alice@example.com"),
        user("albert@example.com"),
        user("bob@example.com"),
    ]
}

fn prefix_search(directory: Vec<User>) -> DebouncedSearch<User> {
    DebouncedSearch::new(move |query: String| {
        let matches: Vec<User> = directory
            .iter()
            .filter(|u| u.email.as_str().starts_with(&query))
            .cloned()
            .collect();
        async move { Ok::<_, RemoteError>(matches) }.boxed()
    })
}

#[tokio::test(start_paused = true)]
async fn test_search_select_submit() {
    init_tracing();
    let search = prefix_search(directory());
    let mut results = search.watch();

    // Typing "a", "al" in quick succession issues one query for "al".
    search.set_query("a");
    search.set_query("al");
    results.changed().await.unwrap();

    let found = search.results();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|u| u.email.as_str().starts_with("al")));

    // Select one match and submit the draft.
    let chosen = found[0].clone();
    let mut draft = InviteDraft::new();
    draft.add(chosen.clone());

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
    let submitted = submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].id, chosen.id);
}

#[tokio::test(start_paused = true)]
async fn test_narrowing_query_replaces_results() {
    init_tracing();
    let search = prefix_search(directory());
    let mut results = search.watch();

    search.set_query("al");
    results.changed().await.unwrap();
    assert_eq!(search.results().len(), 2);

    search.set_query("alice");
    results.changed().await.unwrap();
    let found = search.results();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email.as_str(), "alice@example.com");
}

#[tokio::test(start_paused = true)]
async fn test_clearing_after_submit_resets_search() {
    init_tracing();
    let search = prefix_search(directory());
    let mut results = search.watch();

    search.set_query("bob");
    results.changed().await.unwrap();
    assert_eq!(search.results().len(), 1);

    search.clear();
    assert!(search.results().is_empty());

    // A fresh query still works after clearing.
    search.set_query("al");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(search.results().len(), 2);
}
