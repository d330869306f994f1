//! REST client for row-level CRUD.
//!
//! The hosted service exposes every table under `{base}/rest/v1/{table}`
//! with query-string filters (`column=eq.value`), `select=` embedding for
//! related rows, and `Prefer: return=representation` on writes.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::GrocerConfig;

use super::RemoteError;

/// How much response body to keep in error messages and logs.
const BODY_SNIPPET_LEN: usize = 500;

/// Client for the hosted service's REST surface.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl RestClient {
    /// Create a new REST client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Url`] if the REST endpoint cannot be derived
    /// from the configured base URL, or [`RemoteError::Http`] if the HTTP
    /// client cannot be built.
    pub fn new(config: &GrocerConfig) -> Result<Self, RemoteError> {
        let endpoint = config.api_url.join("rest/v1/")?;
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(RestClientInner {
                client,
                endpoint,
                api_key: config.anon_key.clone(),
            }),
        })
    }

    /// Select rows from `table`.
    ///
    /// `query` is passed through as query-string pairs, e.g.
    /// `[("owner_id", "eq.<uuid>".into()), ("order", "created_at.asc".into())]`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] on transport failure, non-success status,
    /// rate limiting, or if the response body is not the expected shape.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, table)?
            .query(query)
            .send()
            .await?;

        self.read_rows(table, response).await
    }

    /// Insert a single row into `table`, returning the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Conflict`] if the service rejects the write
    /// with a conflict status, other [`RemoteError`] variants as for
    /// [`select`](Self::select).
    pub async fn insert<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, RemoteError> {
        let response = self
            .request(reqwest::Method::POST, table)?
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let mut rows: Vec<T> = self.read_rows(table, response).await?;
        rows.pop()
            .ok_or_else(|| RemoteError::NotFound(format!("insert into {table} returned no row")))
    }

    /// Update rows in `table` matching `query`, returning the updated rows.
    ///
    /// An empty result means no row matched the filter - callers enforcing
    /// state transitions should treat that as a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] as for [`select`](Self::select).
    pub async fn update<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        patch: &B,
    ) -> Result<Vec<T>, RemoteError> {
        let response = self
            .request(reqwest::Method::PATCH, table)?
            .query(query)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;

        self.read_rows(table, response).await
    }

    fn request(
        &self,
        method: reqwest::Method,
        table: &str,
    ) -> Result<reqwest::RequestBuilder, RemoteError> {
        let url = self.inner.endpoint.join(table)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .header("apikey", &self.inner.api_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.inner.api_key),
            ))
    }

    async fn read_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        response: reqwest::Response,
    ) -> Result<Vec<T>, RemoteError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(RemoteError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if status == reqwest::StatusCode::CONFLICT {
            return Err(RemoteError::Conflict(snippet(&body)));
        }

        if !status.is_success() {
            tracing::error!(
                table,
                status = %status,
                body = %snippet(&body),
                "REST request failed"
            );
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        match serde_json::from_str(&body) {
            Ok(rows) => Ok(rows),
            Err(e) => {
                tracing::error!(
                    table,
                    error = %e,
                    body = %snippet(&body),
                    "failed to parse REST response"
                );
                Err(RemoteError::Parse(e))
            }
        }
    }
}

pub(crate) fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}
