//! Spindle: a concurrent breadth-first web crawler
//!
//! This crate implements a crawler built around two pieces: a deduplicating
//! URL frontier shared by a pool of workers, and a coordinator that owns the
//! worker pool and the start/stop lifecycle. Fetching is behind an injectable
//! trait so the core has no direct network dependency in tests.

pub mod config;
pub mod crawler;

use thiserror::Error;

/// Main error type for crawler lifecycle operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawler is already running")]
    AlreadyRunning,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Worker count must be at least 1")]
    NoWorkers,

    #[error("Worker count {0} exceeds the maximum of {max}", max = config::MAX_WORKERS)]
    TooManyWorkers(usize),

    #[error("User agent must not be empty")]
    EmptyUserAgent,
}

/// Errors produced by a single fetch attempt
///
/// A fetch failure is always recovered locally by the worker that hit it:
/// the URL is abandoned, the failure is logged, and the crawl continues.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{extract_links, Crawler, Fetcher, FetchedPage, Frontier, HttpFetcher};
