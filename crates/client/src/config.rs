//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `FERRIK_API_URL` - API base address (default: [`DEFAULT_API_URL`])
//! - `FERRIK_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 15)
//! - `FERRIK_CACHE_TTL_SECS` - Menu/restaurant cache TTL in seconds (default: 300, 0 disables)
//! - `FERRIK_TELEGRAM_INIT_DATA` - Telegram WebApp init data sent with every request

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Base address used when `FERRIK_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://ferrik-bot-zvev.onrender.com/api/v1";

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API client configuration.
///
/// Implements `Debug` manually to redact the Telegram init data.
#[derive(Clone)]
pub struct ClientConfig {
    /// API base address, e.g. `https://host/api/v1`
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Time to live for cached menu and restaurant responses; zero disables caching
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
    /// Telegram WebApp init data proving the user's identity
    pub telegram_init_data: Option<SecretString>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_capacity", &self.cache_capacity)
            .field(
                "telegram_init_data",
                &self.telegram_init_data.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for `base_url` with default timeouts and caching.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            telegram_init_data: None,
        }
    }

    /// Configuration for the hosted Ferrik API with every default applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if [`DEFAULT_API_URL`] does not parse.
    pub fn hosted() -> Result<Self, ConfigError> {
        parse_base_url(DEFAULT_API_URL).map(Self::new)
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("FERRIK_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let base_url = parse_base_url(&raw_url)?;

        let timeout = parse_secs(&lookup, "FERRIK_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let cache_ttl = parse_secs(&lookup, "FERRIK_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        let telegram_init_data = lookup("FERRIK_TELEGRAM_INIT_DATA")
            .filter(|v| !v.is_empty())
            .map(SecretString::from);

        Ok(Self {
            base_url,
            timeout,
            cache_ttl,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            telegram_init_data,
        })
    }

    /// Base address without a trailing slash, ready for `format!("{base}/{path}")`.
    #[must_use]
    pub fn endpoint_base(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("FERRIK_API_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "FERRIK_API_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    lookup(key).map_or(Ok(Duration::from_secs(default)), |raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.endpoint_base(), DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.telegram_init_data.is_none());
    }

    #[test]
    fn test_hosted_matches_unset_environment() {
        let hosted = ClientConfig::hosted().unwrap();
        let unset = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(hosted.base_url, unset.base_url);
        assert_eq!(hosted.timeout, unset.timeout);
        assert_eq!(hosted.cache_ttl, unset.cache_ttl);
        assert_eq!(hosted.cache_capacity, unset.cache_capacity);
    }

    #[test]
    fn test_blank_url_falls_back_to_default() {
        let config = ClientConfig::from_lookup(lookup(&[("FERRIK_API_URL", "  ")])).unwrap();
        assert_eq!(config.endpoint_base(), DEFAULT_API_URL);
    }

    #[test]
    fn test_custom_url_trailing_slash_trimmed() {
        let config =
            ClientConfig::from_lookup(lookup(&[("FERRIK_API_URL", "http://localhost:8000/api/v1/")]))
                .unwrap();
        assert_eq!(config.endpoint_base(), "http://localhost:8000/api/v1");
    }

    #[test]
    fn test_invalid_url() {
        let result = ClientConfig::from_lookup(lookup(&[("FERRIK_API_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "FERRIK_API_URL"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let result = ClientConfig::from_lookup(lookup(&[("FERRIK_API_URL", "ftp://host/api")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let result =
            ClientConfig::from_lookup(lookup(&[("FERRIK_HTTP_TIMEOUT_SECS", "soon")]));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "FERRIK_HTTP_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_custom_durations() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("FERRIK_HTTP_TIMEOUT_SECS", "3"),
            ("FERRIK_CACHE_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.cache_ttl, Duration::ZERO);
    }

    #[test]
    fn test_debug_redacts_init_data() {
        let config = ClientConfig::from_lookup(lookup(&[(
            "FERRIK_TELEGRAM_INIT_DATA",
            "query_id=AAE&user=%7B%22id%22%3A42%7D&hash=super_secret_hash",
        )]))
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains(DEFAULT_API_URL));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_hash"));
    }
}
