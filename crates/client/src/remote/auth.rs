//! Auth client for the hosted service.
//!
//! Only signup is needed by this crate; login and token refresh stay in
//! the host application.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use grocer_core::{Email, UserId};

use crate::config::GrocerConfig;

use super::RemoteError;
use super::rest::snippet;

/// Client for `{base}/auth/v1`.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

/// The authenticated user as the auth service reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    /// The service-assigned user id; profile rows reference it.
    pub id: UserId,
    /// Email the account was registered with.
    pub email: String,
}

/// An issued session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token used to mint a new session when this one expires.
    pub refresh_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: u64,
}

/// Result of a successful signup.
///
/// `session` is `None` when the service requires email confirmation
/// before issuing tokens.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The created user.
    pub user: AuthUser,
    /// Session tokens, if the account is immediately active.
    pub session: Option<Session>,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct SignUpResponse {
    user: Option<AuthUser>,
    session: Option<Session>,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    #[serde(alias = "error_description", alias = "msg")]
    message: Option<String>,
}

impl AuthClient {
    /// Create a new auth client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Url`] if the auth endpoint cannot be derived
    /// from the configured base URL, or [`RemoteError::Http`] if the HTTP
    /// client cannot be built.
    pub fn new(config: &GrocerConfig) -> Result<Self, RemoteError> {
        let endpoint = config.api_url.join("auth/v1/")?;
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(AuthClientInner {
                client,
                endpoint,
                api_key: config.anon_key.clone(),
            }),
        })
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Auth`] when the service rejects the signup
    /// (duplicate email, weak password per server policy) or when the
    /// response carries no user; other [`RemoteError`] variants on
    /// transport or parse failure.
    pub async fn sign_up(&self, email: &Email, password: &str) -> Result<AuthSession, RemoteError> {
        let url = self.inner.endpoint.join("signup")?;
        let response = self
            .inner
            .client
            .post(url)
            .header("apikey", &self.inner.api_key)
            .json(&SignUpBody {
                email: email.as_str(),
                password,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| snippet(&body));
            tracing::error!(status = %status, error = %message, "signup rejected");
            return Err(RemoteError::Auth(message));
        }

        let parsed: SignUpResponse = serde_json::from_str(&body)?;
        let user = parsed
            .user
            .ok_or_else(|| RemoteError::Auth("signup returned no user".to_owned()))?;

        Ok(AuthSession {
            user,
            session: parsed.session,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_signup_with_session() {
        let body = r#"{
            "user": {"id": "7b0f8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f", "email": "a@b.c"},
            "session": {"access_token": "t", "refresh_token": "r", "expires_in": 3600}
        }"#;
        let parsed: SignUpResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.user.is_some());
        assert_eq!(parsed.session.unwrap().expires_in, 3600);
    }

    #[test]
    fn test_parse_signup_pending_confirmation() {
        // No session until the email is confirmed.
        let body = r#"{
            "user": {"id": "7b0f8e9e-2b6e-4f5c-9d4e-1a2b3c4d5e6f", "email": "a@b.c"},
            "session": null
        }"#;
        let parsed: SignUpResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.user.is_some());
        assert!(parsed.session.is_none());
    }

    #[test]
    fn test_parse_error_body_aliases() {
        let parsed: AuthErrorBody =
            serde_json::from_str(r#"{"msg": "User already registered"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("User already registered"));

        let parsed: AuthErrorBody =
            serde_json::from_str(r#"{"error_description": "weak password"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("weak password"));
    }
}
