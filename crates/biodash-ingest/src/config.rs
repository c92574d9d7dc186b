//! Fetch configuration
//!
//! Page size, page safety cap and HTTP timeout for the occurrence fetcher.

use std::time::Duration;
use tracing::warn;

// ============================================================================
// Fetch Constants
// ============================================================================

/// Records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Pagination safety cap. Guards against endpoints that report an
/// ever-growing or bogus total.
pub const DEFAULT_MAX_PAGES: usize = 400;

/// Default timeout for a single page request in seconds.
/// Can be overridden via BIODASH_API_TIMEOUT_SECS.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Fetcher settings
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub page_size: usize,
    pub max_pages: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("biodash/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `BIODASH_PAGE_SIZE`, `BIODASH_MAX_PAGES` and
    /// `BIODASH_API_TIMEOUT_SECS`. Unparseable or zero values are ignored.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let positive = |name: &str| positive_value(name, var(name)?);
        let mut config = Self::default();

        if let Some(size) = positive("BIODASH_PAGE_SIZE") {
            config.page_size = size as usize;
        }
        if let Some(pages) = positive("BIODASH_MAX_PAGES") {
            config.max_pages = pages as usize;
        }
        if let Some(secs) = positive("BIODASH_API_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }

        config
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn positive_value(name: &str, raw: String) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(variable = name, value = %raw, "Ignoring invalid setting");
            None
        },
    }
}
