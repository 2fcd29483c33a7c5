//! Configuration for the JSON-RPC client.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Environment variable holding the API endpoint.
pub const ENV_API_URL: &str = "HOSTSYNC_API_URL";
/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "HOSTSYNC_API_TOKEN";
/// Environment variable holding the per-call timeout in seconds.
pub const ENV_API_TIMEOUT: &str = "HOSTSYNC_API_TIMEOUT";

/// Connection settings for the monitoring API.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// JSON-RPC endpoint, e.g. `http://zabbix.local/zabbix/api_jsonrpc.php`.
    #[serde(default)]
    pub url: Option<Url>,

    /// API token sent as `Authorization: Bearer <token>`.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// Timeout applied to every call.
    #[serde(
        rename = "timeout_secs",
        with = "duration_secs",
        default = "default_timeout"
    )]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            timeout: default_timeout(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ApiConfig {
    /// Create a config pointing at the given endpoint.
    pub fn with_url(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Default::default()
        }
    }

    /// Set the token.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overlay values from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but unparsable.
    pub fn overlay_env(self) -> Result<Self> {
        self.overlay_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but unparsable.
    pub fn overlay_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup(ENV_API_URL) {
            let parsed = url
                .parse()
                .map_err(|e| Error::config_error(format!("{ENV_API_URL}: {e}")))?;
            self.url = Some(parsed);
        }

        if let Some(token) = lookup(ENV_API_TOKEN).filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }

        if let Some(secs) = lookup(ENV_API_TIMEOUT) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| Error::config_error(format!("{ENV_API_TIMEOUT}: {e}")))?;
            self.timeout = Duration::from_secs(secs);
        }

        Ok(self)
    }

    /// The configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when no URL was configured.
    pub fn endpoint(&self) -> Result<&Url> {
        self.url
            .as_ref()
            .ok_or_else(|| Error::config_error("No API URL configured"))
    }
}

const fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
