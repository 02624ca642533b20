//! Crawler module: the frontier, the worker pool, and fetching
//!
//! - [`Frontier`] — shared deduplicating URL queue with blocking dequeue
//! - [`Crawler`] — coordinator owning the worker pool and lifecycle
//! - [`Fetcher`] / [`HttpFetcher`] — injectable fetch capability
//! - [`extract_links`] — narrow anchor-target extraction

mod coordinator;
mod extract;
mod fetcher;
mod frontier;

pub use coordinator::Crawler;
pub use extract::extract_links;
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use frontier::Frontier;
