//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GROCER_API_URL` - Base URL of the hosted data service
//! - `GROCER_ANON_KEY` - Public API key (safe to ship in clients)
//!
//! ## Optional
//! - `GROCER_SERVICE_ROLE_KEY` - Privileged key for server-side tooling
//!   (min entropy enforced, never logged)
//! - `GROCER_HTTP_TIMEOUT_SECS` - Request timeout (default: 10)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Grocer client configuration.
///
/// Implements `Debug` manually to redact the service-role key.
#[derive(Clone)]
pub struct GrocerConfig {
    /// Base URL of the hosted data service.
    pub api_url: Url,
    /// Public API key sent with every request (safe to expose in clients).
    pub anon_key: String,
    /// Privileged key for server-side tooling; bypasses row security.
    pub service_role_key: Option<SecretString>,
    /// Per-request timeout.
    pub http_timeout: Duration,
}

impl std::fmt::Debug for GrocerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrocerConfig")
            .field("api_url", &self.api_url.as_str())
            .field("anon_key", &self.anon_key)
            .field(
                "service_role_key",
                &self.service_role_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl GrocerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the service-role key fails validation (placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_required_env("GROCER_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("GROCER_API_URL".to_owned(), e.to_string()))?;
        let anon_key = get_required_env("GROCER_ANON_KEY")?;

        let service_role_key = match get_optional_env("GROCER_SERVICE_ROLE_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "GROCER_SERVICE_ROLE_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        let http_timeout_secs = get_env_or_default("GROCER_HTTP_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GROCER_HTTP_TIMEOUT_SECS".to_owned(), e.to_string())
            })?;

        Ok(Self {
            api_url,
            anon_key,
            service_role_key,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Build a configuration directly; used by tests and embedding hosts
    /// that manage their own settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not a valid URL.
    pub fn new(api_url: &str, anon_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: api_url
                .parse()
                .map_err(|e: url::ParseError| {
                    ConfigError::InvalidEnvVar("api_url".to_owned(), e.to_string())
                })?,
            anon_key: anon_key.into(),
            service_role_key: None,
            http_timeout: Duration::from_secs(10),
        })
    }

    /// Expose the service-role key, if configured.
    #[must_use]
    pub fn service_role_key(&self) -> Option<&str> {
        self.service_role_key.as_ref().map(ExposeSecret::expose_secret)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real service keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the service."
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-service-key-here", "TEST_VAR");
        assert!(matches!(
            result,
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(
            result,
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(GrocerConfig::new("not a url", "key").is_err());
    }

    #[test]
    fn test_debug_redacts_service_key() {
        let mut config = GrocerConfig::new("https://example.supabase.co", "anon-key").unwrap();
        config.service_role_key = Some(SecretString::from("very-private-value"));

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("anon-key"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("very-private-value"));
    }
}
