//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPWISE_API_BASE_URL` - Base URL of the remote account/order API
//!
//! ## Optional
//! - `SHOPWISE_CATALOG_BASE_URL` - Product catalog API (default: <https://fakestoreapi.com>)
//! - `SHOPWISE_STATE_DIR` - Directory for durable client state (default: `.shopwise`)
//! - `SHOPWISE_EXPIRY_REDIRECT_SECS` - Session-expired notice duration (default: 5)
//! - `SHOPWISE_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate, 0.0-1.0 (default: 1.0)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_BASE_URL: &str = "https://fakestoreapi.com";
const DEFAULT_STATE_DIR: &str = ".shopwise";
const DEFAULT_EXPIRY_REDIRECT_SECS: &str = "5";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shopwise client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote account/order API base URL
    pub api_base_url: Url,
    /// Remote product catalog base URL
    pub catalog_base_url: Url,
    /// Directory holding durable client state
    pub state_dir: PathBuf,
    /// How long the session-expired notice stays up before redirecting
    pub expiry_redirect_delay: Duration,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment name reported with events
    pub environment: Option<String>,
    /// Fraction of errors to send
    pub sample_rate: f32,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_http_url(
            "SHOPWISE_API_BASE_URL",
            &get_required_env("SHOPWISE_API_BASE_URL")?,
        )?;
        let catalog_base_url = parse_http_url(
            "SHOPWISE_CATALOG_BASE_URL",
            &get_env_or_default("SHOPWISE_CATALOG_BASE_URL", DEFAULT_CATALOG_BASE_URL),
        )?;
        let state_dir = PathBuf::from(get_env_or_default("SHOPWISE_STATE_DIR", DEFAULT_STATE_DIR));
        let expiry_redirect_delay = parse_seconds(
            "SHOPWISE_EXPIRY_REDIRECT_SECS",
            &get_env_or_default("SHOPWISE_EXPIRY_REDIRECT_SECS", DEFAULT_EXPIRY_REDIRECT_SECS),
        )?;
        let http_timeout = parse_seconds(
            "SHOPWISE_HTTP_TIMEOUT_SECS",
            &get_env_or_default("SHOPWISE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
        )?;
        let sentry = SentryConfig::from_env()?;

        Ok(Self {
            api_base_url,
            catalog_base_url,
            state_dir,
            expiry_redirect_delay,
            http_timeout,
            sentry,
        })
    }

    /// Configuration pointing at a single base URL, with defaults elsewhere.
    #[must_use]
    pub fn with_api_base_url(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            catalog_base_url: Url::parse(DEFAULT_CATALOG_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default catalog URL is valid")),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            expiry_redirect_delay: Duration::from_secs(5),
            http_timeout: Duration::from_secs(30),
            sentry: SentryConfig::default(),
        }
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let sample_rate = get_env_or_default("SENTRY_SAMPLE_RATE", "1.0")
            .parse::<f32>()
            .map_err(|e| ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), e.to_string()))?;
        if !(0.0..=1.0).contains(&sample_rate) {
            return Err(ConfigError::InvalidEnvVar(
                "SENTRY_SAMPLE_RATE".to_string(),
                format!("must be between 0.0 and 1.0 (got {sample_rate})"),
            ));
        }

        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an absolute http(s) URL.
fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_seconds(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http_url_accepts_https() {
        let url = parse_http_url("TEST_URL", "https://api.example.com/v1").unwrap();
        assert_eq!(url.host_str(), Some("api.example.com"));
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        let err = parse_http_url("TEST_URL", "ftp://api.example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "TEST_URL"));
    }

    #[test]
    fn test_parse_http_url_rejects_garbage() {
        assert!(parse_http_url("TEST_URL", "not a url").is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("T", " 5 ").unwrap(), Duration::from_secs(5));
        assert!(parse_seconds("T", "-1").is_err());
        assert!(parse_seconds("T", "five").is_err());
    }

    #[test]
    fn test_with_api_base_url_defaults() {
        let config = ClientConfig::with_api_base_url(Url::parse("http://localhost:5000").unwrap());
        assert_eq!(config.expiry_redirect_delay, Duration::from_secs(5));
        assert_eq!(config.catalog_base_url.as_str(), "https://fakestoreapi.com/");
        assert!(config.sentry.dsn.is_none());
    }
}
