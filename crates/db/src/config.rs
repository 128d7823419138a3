use std::str::FromStr;

use quarry_core::content_history::DEFAULT_KEEP_LIMIT;
use quarry_core::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Content history settings loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHistoryConfig {
    /// Revisions kept per thread after each save (default: `20`).
    pub keep_limit: usize,
    /// Page size used when the caller does not pass one (default: `20`).
    pub default_page_size: i64,
    /// Largest page size a caller may request (default: `100`).
    pub max_page_size: i64,
}

impl Default for ContentHistoryConfig {
    fn default() -> Self {
        Self {
            keep_limit: DEFAULT_KEEP_LIMIT,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ContentHistoryConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default |
    /// |---------------------------------|---------|
    /// | `CONTENT_HISTORY_KEEP_LIMIT`    | `20`    |
    /// | `CONTENT_HISTORY_PAGE_SIZE`     | `20`    |
    /// | `CONTENT_HISTORY_MAX_PAGE_SIZE` | `100`   |
    ///
    /// Page sizes are passed through [`ContentHistoryConfig::normalized`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            keep_limit: env_or("CONTENT_HISTORY_KEEP_LIMIT", defaults.keep_limit),
            default_page_size: env_or("CONTENT_HISTORY_PAGE_SIZE", defaults.default_page_size),
            max_page_size: env_or("CONTENT_HISTORY_MAX_PAGE_SIZE", defaults.max_page_size),
        }
        .normalized()
    }

    /// Replace non-positive page sizes with the defaults and cap the default
    /// page size at the maximum.
    pub fn normalized(mut self) -> Self {
        if self.max_page_size < 1 {
            tracing::warn!(
                max_page_size = self.max_page_size,
                default = MAX_PAGE_SIZE,
                "Non-positive max page size, using default"
            );
            self.max_page_size = MAX_PAGE_SIZE;
        }
        if self.default_page_size < 1 {
            tracing::warn!(
                default_page_size = self.default_page_size,
                default = DEFAULT_PAGE_SIZE,
                "Non-positive page size, using default"
            );
            self.default_page_size = DEFAULT_PAGE_SIZE;
        }
        if self.default_page_size > self.max_page_size {
            tracing::warn!(
                default_page_size = self.default_page_size,
                max_page_size = self.max_page_size,
                "Page size above maximum, capping"
            );
            self.default_page_size = self.max_page_size;
        }
        self
    }

    /// Override the retention limit.
    pub fn with_keep_limit(mut self, keep_limit: usize) -> Self {
        self.keep_limit = keep_limit;
        self
    }
}

/// Read and parse an environment variable, falling back to `default` when it
/// is unset or unparsable.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T>(key: &str, raw: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = raw, %default, "Invalid config value, using default");
            default
        }
    }
}
