//! Change-notification stream client.
//!
//! The hosted service exposes a streaming HTTP endpoint at
//! `{base}/realtime/v1/stream` that emits one line per matching row
//! change (insert, update, or delete). Lines carry no payload the client
//! relies on; each one is treated as a bare "something changed" signal.
//!
//! Delivery is at-least-once and unordered relative to the operation that
//! caused it, and the service may coalesce several changes into one line.
//! The reader reconnects with exponential backoff until the subscription
//! is closed.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use url::Url;

use crate::config::GrocerConfig;

use super::{ChangeCallback, ChangeFilter, RemoteError, Subscription};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Client for the change-notification stream.
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<RealtimeClientInner>,
}

struct RealtimeClientInner {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl RealtimeClient {
    /// Create a new realtime client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Url`] if the stream endpoint cannot be
    /// derived from the configured base URL, or [`RemoteError::Http`] if
    /// the HTTP client cannot be built.
    pub fn new(config: &GrocerConfig) -> Result<Self, RemoteError> {
        let endpoint = config.api_url.join("realtime/v1/stream")?;
        // Connect timeout only: the stream itself is long-lived and a
        // total request timeout would sever healthy connections.
        let client = reqwest::Client::builder()
            .connect_timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(RealtimeClientInner {
                client,
                endpoint,
                api_key: config.anon_key.clone(),
            }),
        })
    }

    /// Open a subscription for rows matching `filter`, invoking
    /// `on_change` once per received event line.
    ///
    /// The returned [`Subscription`] must be closed (or dropped) to stop
    /// the reader task. Must be called within a Tokio runtime.
    #[must_use]
    pub fn subscribe(&self, filter: ChangeFilter, on_change: ChangeCallback) -> Subscription {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            run_stream(&inner, &filter, &on_change).await;
        });
        Subscription::new(move || handle.abort())
    }
}

async fn run_stream(
    inner: &RealtimeClientInner,
    filter: &ChangeFilter,
    on_change: &ChangeCallback,
) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match read_events(inner, filter, on_change).await {
            Ok(events) if events > 0 => {
                // The stream delivered something before dropping; start
                // the backoff ladder over.
                backoff = INITIAL_BACKOFF;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(
                    table = %filter.table,
                    error = %err,
                    "change stream failed, reconnecting"
                );
            }
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Read one stream connection to completion, returning how many event
/// lines were delivered.
async fn read_events(
    inner: &RealtimeClientInner,
    filter: &ChangeFilter,
    on_change: &ChangeCallback,
) -> Result<usize, RemoteError> {
    let mut request = inner
        .client
        .get(inner.endpoint.clone())
        .header("apikey", &inner.api_key)
        .query(&[("table", filter.table.as_str())]);
    if let Some(predicate) = &filter.filter {
        request = request.query(&[("filter", predicate.as_str())]);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body: super::rest::snippet(&body),
        });
    }

    tracing::debug!(table = %filter.table, "change stream connected");

    let mut events = 0usize;
    let mut buffer = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        buffer.extend_from_slice(&chunk);

        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            // Blank lines are keepalives; lines starting with ':' are
            // stream comments.
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            tracing::debug!(table = %filter.table, "change notification");
            events += 1;
            on_change();
        }
    }

    Ok(events)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_caps() {
        let mut backoff = INITIAL_BACKOFF;
        for _ in 0..10 {
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
        assert_eq!(backoff, MAX_BACKOFF);
    }
}
