//! Isochrone service configuration.
//!
//! Defaults are embedded at compile time from
//! `services/openrouteservice.toml`. A user TOML file may override any
//! subset of fields; missing fields keep the embedded defaults.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::ConfigError;

const DEFAULT_SERVICE_TOML: &str = include_str!("../services/openrouteservice.toml");

/// Connection, retry, and pacing settings for the isochrone service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Unique identifier (e.g., `"openrouteservice"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// API root, without the `/v2/isochrones` path.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Rate-limit retry settings.
    pub retry: RetryConfig,
    /// Inter-request pacing.
    pub pacing: PacingConfig,
}

/// Constant-delay retry settings for rate-limited requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Total attempts before giving up.
    pub max_retries: u32,
    /// Fixed wait after each rate-limited attempt, in milliseconds.
    pub retry_delay_ms: u64,
}

impl RetryConfig {
    /// The retry delay as a [`Duration`].
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Pause inserted after every point request to stay under the upstream
/// request-rate ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PacingConfig {
    /// Wait after each point request, in milliseconds.
    pub request_delay_ms: u64,
}

impl PacingConfig {
    /// The pacing delay as a [`Duration`].
    #[must_use]
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Partial configuration read from a user TOML file.
#[derive(Debug, Default, Deserialize)]
struct ServiceOverrides {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    #[serde(default)]
    retry: RetryOverrides,
    #[serde(default)]
    pacing: PacingOverrides,
}

#[derive(Debug, Default, Deserialize)]
struct RetryOverrides {
    max_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PacingOverrides {
    request_delay_ms: Option<u64>,
}

impl ServiceConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the config is embedded).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(DEFAULT_SERVICE_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded service config: {e}"))
    }

    /// Loads the embedded defaults and applies overrides from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is not valid
    /// TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::embedded().with_overrides(&content)?;
        log::info!("Loaded service configuration from {}", path.display());
        Ok(config)
    }

    /// Applies a TOML document of overrides on top of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if `content` is not valid TOML.
    pub fn with_overrides(mut self, content: &str) -> Result<Self, ConfigError> {
        let overrides: ServiceOverrides = toml::de::from_str(content)?;

        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(max_retries) = overrides.retry.max_retries {
            self.retry.max_retries = max_retries;
        }
        if let Some(retry_delay_ms) = overrides.retry.retry_delay_ms {
            self.retry.retry_delay_ms = retry_delay_ms;
        }
        if let Some(request_delay_ms) = overrides.pacing.request_delay_ms {
            self.pacing.request_delay_ms = request_delay_ms;
        }

        Ok(self)
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
