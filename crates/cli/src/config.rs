//! CLI configuration.
//!
//! # Environment Variables
//!
//! In addition to the API client variables (see [`ClientConfig`]):
//! - `FERRIK_DATA_DIR` - Directory holding the saved cart (default: `.ferrik`)
//! - `SENTRY_DSN` - Sentry DSN for error tracking (optional)
//! - `SENTRY_ENVIRONMENT` - Environment name reported to Sentry (optional)

use std::path::PathBuf;

use ferrik_client::{ClientConfig, ConfigError};

const DEFAULT_DATA_DIR: &str = ".ferrik";

/// Configuration for the `ferrik` binary.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub data_dir: PathBuf,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an API client variable is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let client = ClientConfig::from_env()?;
        Ok(Self::with_lookup(client, |key| std::env::var(key).ok()))
    }

    fn with_lookup(client: ClientConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            client,
            data_dir: non_empty("FERRIK_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
            sentry_dsn: non_empty("SENTRY_DSN"),
            sentry_environment: non_empty("SENTRY_ENVIRONMENT"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::with_lookup(ClientConfig::hosted().unwrap(), |_| None);
        assert_eq!(config.data_dir, PathBuf::from(".ferrik"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = CliConfig::with_lookup(ClientConfig::hosted().unwrap(), |key| match key {
            "FERRIK_DATA_DIR" => Some("/var/lib/ferrik".to_string()),
            "SENTRY_DSN" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/ferrik"));
        assert!(config.sentry_dsn.is_none());
    }
}
