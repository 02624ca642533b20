//! Crawler configuration
//!
//! The reference crawl policy (30 second request timeout, 100 ms politeness
//! delay) is exposed here as a configuration struct with those values as
//! defaults rather than hardcoded in the worker loop. There is no config
//! file; the CLI fills in the seed URL, worker count, and duration.

use crate::ConfigError;
use std::time::Duration;

/// Upper bound on the worker pool size
///
/// All workers share one reqwest client and its connection pool; past a few
/// hundred concurrent fetches the pool is the bottleneck, not the workers.
pub const MAX_WORKERS: usize = 256;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pause a worker takes between finishing one fetch and starting the next
pub const DEFAULT_POLITENESS_DELAY: Duration = Duration::from_millis(100);

/// Crawler behavior configuration
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Number of concurrent worker tasks
    pub workers: usize,

    /// Per-request timeout for page fetches
    pub request_timeout: Duration,

    /// Delay each worker applies between consecutive fetches
    ///
    /// This bounds the request rate per worker, not globally; the total
    /// request rate is roughly `workers / politeness_delay`.
    pub politeness_delay: Duration,

    /// Identifying User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            request_timeout: DEFAULT_TIMEOUT,
            politeness_delay: DEFAULT_POLITENESS_DELAY,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl CrawlConfig {
    /// Validates the configuration
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Configuration is usable
    /// * `Err(ConfigError)` - A field is out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.workers > MAX_WORKERS {
            return Err(ConfigError::TooManyWorkers(self.workers));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::EmptyUserAgent);
        }
        Ok(())
    }
}

/// Default worker count: one per available core
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
