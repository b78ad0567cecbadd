//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_URL` - Backend API base URL (e.g., `http://localhost:8000/api/v1`)
//!
//! ## Optional
//! - `SHOPFRONT_APP_NAME` - Display name (default: Shopfront)
//! - `SHOPFRONT_DATA_DIR` - Directory for local state (default: .shopfront)
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: HTTP client default)
//! - `SHOPFRONT_CACHE_TTL_SECS` - Query cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_APP_NAME: &str = "Shopfront";
const DEFAULT_DATA_DIR: &str = ".shopfront";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API base URL, always ending in `/`
    pub api_url: Url,
    /// Display name shown in the CLI and passed to the payment widget
    pub app_name: String,
    /// Directory holding the token and guest cart files
    pub data_dir: PathBuf,
    /// Optional per-request timeout
    pub http_timeout: Option<Duration>,
    /// Query cache time-to-live
    pub cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
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

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Source(lookup);

        let api_url = parse_base_url("SHOPFRONT_API_URL", &env.required("SHOPFRONT_API_URL")?)?;
        let app_name = env.or_default("SHOPFRONT_APP_NAME", DEFAULT_APP_NAME);
        let data_dir = PathBuf::from(env.or_default("SHOPFRONT_DATA_DIR", DEFAULT_DATA_DIR));
        let http_timeout = env
            .optional("SHOPFRONT_HTTP_TIMEOUT_SECS")
            .map(|raw| parse_secs("SHOPFRONT_HTTP_TIMEOUT_SECS", &raw))
            .transpose()?;
        let cache_ttl = env.optional("SHOPFRONT_CACHE_TTL_SECS").map_or(
            Ok(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            |raw| parse_secs("SHOPFRONT_CACHE_TTL_SECS", &raw),
        )?;
        let sentry_dsn = env.optional("SENTRY_DSN");

        Ok(Self {
            api_url,
            app_name,
            data_dir,
            http_timeout,
            cache_ttl,
            sentry_dsn,
        })
    }

    /// Configuration pointing at `api_url` with every other setting at its
    /// default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Self::from_source(|key| (key == "SHOPFRONT_API_URL").then(|| api_url.to_string()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Source<F>(F);

impl<F> Source<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Parse the API base URL, ensuring it ends with `/` so relative joins keep
/// the `/api/v1` prefix.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SHOPFRONT_API_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SHOPFRONT_API_URL", "http://localhost:8000/api/v1")]).unwrap();
        assert_eq!(config.app_name, "Shopfront");
        assert_eq!(config.data_dir, PathBuf::from(".shopfront"));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.http_timeout.is_none());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("SHOPFRONT_API_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("SHOPFRONT_API_URL", "ftp://example.com/")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[
                ("SHOPFRONT_API_URL", "http://localhost:8000/api/v1"),
                ("SHOPFRONT_HTTP_TIMEOUT_SECS", "soon"),
            ]),
            Err(ConfigError::InvalidEnvVar(ref k, _)) if k == "SHOPFRONT_HTTP_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SHOPFRONT_API_URL", "https://api.example.in/api/v1/"),
            ("SHOPFRONT_APP_NAME", "Naturals"),
            ("SHOPFRONT_HTTP_TIMEOUT_SECS", "15"),
            ("SHOPFRONT_CACHE_TTL_SECS", "60"),
            ("SENTRY_DSN", "https://key@sentry.example.com/1"),
        ])
        .unwrap();
        assert_eq!(config.app_name, "Naturals");
        assert_eq!(config.http_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert!(config.sentry_dsn.is_some());
    }
}
