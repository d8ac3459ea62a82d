//! Configuration management with environment variable support.
//!
//! Every default the client and the CLI use can be overridden from the
//! environment. Values are read once and cached for the lifetime of the
//! process; use [`Config::defaults`] to ignore the environment entirely.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `THUMBALIZR_API_KEY` | API key sent as `key` | (empty) |
//! | `THUMBALIZR_BASE_URL` | API endpoint | `https://api.thumbalizr.com/` |
//! | `THUMBALIZR_TIMEOUT` | Request timeout in seconds, `0` disables | `60` |
//! | `THUMBALIZR_CONNECT_TIMEOUT` | Connect timeout in seconds | `10` |
//! | `THUMBALIZR_DEBUG` | Diagnostic logging (`1`, `true`, `yes`) | off |
//! | `THUMBALIZR_POLL_INTERVAL` | Seconds between CLI polls | `10` |
//! | `THUMBALIZR_MAX_ATTEMPTS` | Maximum CLI poll retries | `20` |
//!
//! # Example
//!
//! ```bash
//! export THUMBALIZR_API_KEY="my-key"
//! export THUMBALIZR_TIMEOUT=120
//! thumbalizr https://example.com/
//! ```

use std::env;
use std::sync::OnceLock;
use std::time::Duration;

// ============================================================================
// Default Values
// ============================================================================

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.thumbalizr.com/";

/// Default request timeout (seconds)
pub const DEFAULT_TIMEOUT: u64 = 60;

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// Default delay between two polls of a pending screenshot (seconds)
pub const DEFAULT_POLL_INTERVAL: u64 = 10;

/// Default number of extra polls before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Maximum number of redirects followed per request
pub const MAX_REDIRECTS: usize = 10;

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_API_KEY: &str = "THUMBALIZR_API_KEY";

pub const ENV_BASE_URL: &str = "THUMBALIZR_BASE_URL";

pub const ENV_TIMEOUT: &str = "THUMBALIZR_TIMEOUT";

pub const ENV_CONNECT_TIMEOUT: &str = "THUMBALIZR_CONNECT_TIMEOUT";

pub const ENV_DEBUG: &str = "THUMBALIZR_DEBUG";

pub const ENV_POLL_INTERVAL: &str = "THUMBALIZR_POLL_INTERVAL";

pub const ENV_MAX_ATTEMPTS: &str = "THUMBALIZR_MAX_ATTEMPTS";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Centralized configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API client settings
    pub api: ApiSettings,
    /// Poll loop settings used by the CLI
    pub poll: PollSettings,
}

/// API client settings
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// API key, empty when anonymous
    pub key: String,
    /// Endpoint the query string is appended to
    pub base_url: String,
    /// Total request timeout (seconds, 0 = no timeout)
    pub timeout: u64,
    /// Connection timeout (seconds)
    pub connect_timeout: u64,
    /// Log constructed URLs, raw status headers and swallowed errors
    pub debug: bool,
}

/// Poll loop settings
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Seconds to sleep between two polls
    pub interval: u64,
    /// Maximum number of extra polls
    pub max_attempts: u32,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            api: ApiSettings::from_env(),
            poll: PollSettings::from_env(),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            api: ApiSettings::defaults(),
            poll: PollSettings::defaults(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ApiSettings {
    pub fn from_env() -> Self {
        Self {
            key: env::var(ENV_API_KEY).unwrap_or_default(),
            base_url: env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: parse_env(ENV_TIMEOUT).unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: parse_env(ENV_CONNECT_TIMEOUT).unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            debug: env::var(ENV_DEBUG)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    pub fn defaults() -> Self {
        Self {
            key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            debug: false,
        }
    }

    /// Request timeout as a `Duration`, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        seconds(self.timeout)
    }

    /// Connection timeout as a `Duration`, `None` when disabled
    pub fn connect_timeout(&self) -> Option<Duration> {
        seconds(self.connect_timeout)
    }
}

impl PollSettings {
    pub fn from_env() -> Self {
        Self {
            interval: parse_env(ENV_POLL_INTERVAL).unwrap_or(DEFAULT_POLL_INTERVAL),
            max_attempts: parse_env(ENV_MAX_ATTEMPTS).unwrap_or(DEFAULT_MAX_ATTEMPTS),
        }
    }

    pub fn defaults() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Interpret a boolean-ish environment value
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
