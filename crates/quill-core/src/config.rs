use std::time::Duration;

use crate::error::AppError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_MS: u64 = 1000;
const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Configuration for fetching article pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Hard timeout for a single attempt.
    pub timeout: Duration,
    /// Number of attempts per fetch.
    pub max_retries: u32,
    /// Linear backoff base: attempt `i` waits `backoff_base * (i + 1)`.
    pub backoff_base: Duration,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_millis(DEFAULT_BACKOFF_MS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl FetchConfig {
    /// Read configuration from environment variables.
    ///
    /// - `QUILL_FETCH_TIMEOUT_SECS` (optional, defaults to 30, at least 1)
    /// - `QUILL_FETCH_MAX_RETRIES` (optional, defaults to 3, at least 1)
    /// - `QUILL_FETCH_BACKOFF_MS` (optional, defaults to 1000)
    /// - `QUILL_FETCH_MAX_REDIRECTS` (optional, defaults to 10)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let timeout_secs = parse_var(&lookup, "QUILL_FETCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "QUILL_FETCH_TIMEOUT_SECS must be at least 1".into(),
            ));
        }

        let max_retries = parse_var(&lookup, "QUILL_FETCH_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err(AppError::ConfigError(
                "QUILL_FETCH_MAX_RETRIES must be at least 1".into(),
            ));
        }

        let backoff_ms = parse_var(&lookup, "QUILL_FETCH_BACKOFF_MS", DEFAULT_BACKOFF_MS)?;
        let max_redirects =
            parse_var(&lookup, "QUILL_FETCH_MAX_REDIRECTS", DEFAULT_MAX_REDIRECTS)?;

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            backoff_base: Duration::from_millis(backoff_ms),
            max_redirects,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }
}

fn parse_var<L, T>(lookup: &L, key: &str, default: T) -> Result<T, AppError>
where
    L: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(format!(
                "Invalid {key} '{raw}': must be a non-negative integer"
            ))
        }),
    }
}
