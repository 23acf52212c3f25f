//! Runtime configuration, read from the environment (and `.env`, when present).

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PROFILE_DEADLINE: Duration = Duration::from_millis(3000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 40;
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
    #[error("{key} must be an http(s) URL, got {value:?}")]
    InvalidUrl { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// How long a profile fetch may take before the fallback profile is used.
    pub profile_deadline: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            profile_deadline: DEFAULT_PROFILE_DEADLINE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Delay between confirmation and the order-list refresh.
    pub refresh_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarketConfig {
    pub api: ApiConfig,
    pub session: ResolverConfig,
    pub payment: PollerConfig,
}

impl MarketConfig {
    /// Loads `.env` if present, then reads the `SHAMBA_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = match lookup("SHAMBA_API_BASE_URL") {
            Some(url) => parse_url("SHAMBA_API_BASE_URL", url)?,
            None => DEFAULT_API_BASE_URL.to_string(),
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                request_timeout: Duration::from_secs(number(
                    &lookup,
                    "SHAMBA_REQUEST_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT.as_secs(),
                )?),
            },
            session: ResolverConfig {
                profile_deadline: millis(
                    &lookup,
                    "SHAMBA_PROFILE_DEADLINE_MS",
                    DEFAULT_PROFILE_DEADLINE,
                )?,
            },
            payment: PollerConfig {
                interval: millis(&lookup, "SHAMBA_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL)?,
                max_attempts: u32::try_from(number(
                    &lookup,
                    "SHAMBA_POLL_MAX_ATTEMPTS",
                    u64::from(DEFAULT_POLL_MAX_ATTEMPTS),
                )?)
                .map_err(|_| ConfigError::InvalidNumber {
                    key: "SHAMBA_POLL_MAX_ATTEMPTS",
                    value: lookup("SHAMBA_POLL_MAX_ATTEMPTS").unwrap_or_default(),
                })?,
                refresh_delay: millis(&lookup, "SHAMBA_REFRESH_DELAY_MS", DEFAULT_REFRESH_DELAY)?,
            },
        })
    }
}

fn parse_url(key: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidUrl { key, value })
    }
}

fn number(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    let parsed = value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.clone(),
        })?;
    if parsed == 0 {
        return Err(ConfigError::Zero { key });
    }
    Ok(parsed)
}

fn millis(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    number(lookup, key, default.as_millis() as u64).map(Duration::from_millis)
}
