//! Configuration types for booru-rank-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming an optional JSON configuration file
pub const CONFIG_ENV_VAR: &str = "BOORU_RANK_CONFIG";

/// Main configuration for a crawl run
///
/// Every field has a default, so an empty JSON object `{}` is a valid configuration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Origin of the image board (default: "https://rule34.xxx")
    ///
    /// Listing URLs, synthesized post links and site-relative hrefs are all built against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base name of the output directory, created under the working directory (default: "output")
    #[serde(default = "default_output_base")]
    pub output_base: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Retry behavior for transient fetch failures
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            output_base: default_output_base(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, filling missing fields with defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the file named by [`CONFIG_ENV_VAR`], or defaults when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Check settings that serde cannot enforce
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| Error::Config {
            message: format!("base_url is not a valid URL: {}", e),
            key: Some("base_url".to_string()),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Config {
                message: "base_url must be an http(s) origin".to_string(),
                key: Some("base_url".to_string()),
            });
        }
        if self.output_base.trim().is_empty() {
            return Err(Error::Config {
                message: "output_base must not be empty".to_string(),
                key: Some("output_base".to_string()),
            });
        }
        Ok(())
    }

    /// Base URL without a trailing slash
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Retry configuration for transient failures
///
/// The delay before retry `k` (1-indexed) is `unit * 2^k`, plus a uniformly random
/// `[0, unit)` when `jitter` is set, capped at `max_delay`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Additional attempts after the first one (default: 4)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff time unit (default: 1 second)
    #[serde(default = "default_unit", with = "duration_ms_serde")]
    pub unit: Duration,

    /// Maximum delay between attempts (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            unit: default_unit(),
            max_delay: default_max_delay(),
            jitter: true,
        }
    }
}

fn default_base_url() -> String {
    "https://rule34.xxx".to_string()
}

fn default_output_base() -> String {
    "output".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_retries() -> u32 {
    4
}

fn default_unit() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
