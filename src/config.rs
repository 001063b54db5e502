//! Engine-wide settings: list location, cache bounds, bulk limits.
//!
//! Defaults come from [`EngineConfig::default`]; [`EngineConfig::from_env`]
//! overlays `MAILGATE_*` environment variables on top.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DISPOSABLE_URL: &str =
    "https://raw.githubusercontent.com/disposable/disposable-email-domains/master/domains.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// JSON array of disposable domains.
    pub disposable_url: String,
    pub disposable_timeout: Duration,
    /// Gap between two lazy load attempts after a failed one.
    pub disposable_retry_interval: Duration,
    pub mx_cache_capacity: usize,
    /// `None` keeps MX answers for the process lifetime.
    pub mx_cache_ttl: Option<Duration>,
    pub bulk_limit: usize,
    pub bulk_workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            disposable_url: DEFAULT_DISPOSABLE_URL.to_string(),
            disposable_timeout: Duration::from_secs(10),
            disposable_retry_interval: Duration::from_secs(60),
            mx_cache_capacity: crate::mx::DEFAULT_CACHE_CAPACITY,
            mx_cache_ttl: None,
            bulk_limit: 1000,
            bulk_workers: 4,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("MAILGATE_DISPOSABLE_URL").filter(|u| !u.trim().is_empty()) {
            config.disposable_url = url.trim().to_string();
        }
        if let Some(secs) = number::<u64, _>(&lookup, "MAILGATE_DISPOSABLE_TIMEOUT_SECS")? {
            config.disposable_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = number::<u64, _>(&lookup, "MAILGATE_DISPOSABLE_RETRY_SECS")? {
            config.disposable_retry_interval = Duration::from_secs(secs);
        }
        if let Some(capacity) = number::<usize, _>(&lookup, "MAILGATE_MX_CACHE_CAPACITY")? {
            config.mx_cache_capacity = capacity;
        }
        if let Some(secs) = number::<u64, _>(&lookup, "MAILGATE_MX_CACHE_TTL_SECS")? {
            config.mx_cache_ttl = Some(Duration::from_secs(secs));
        }
        if let Some(limit) = number::<usize, _>(&lookup, "MAILGATE_BULK_LIMIT")? {
            config.bulk_limit = limit;
        }
        if let Some(workers) = number::<usize, _>(&lookup, "MAILGATE_BULK_WORKERS")? {
            config.bulk_workers = workers.max(1);
        }
        Ok(config)
    }
}

fn number<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}
