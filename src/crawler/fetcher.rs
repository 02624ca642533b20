//! HTTP fetching
//!
//! The crawl core never speaks to the network directly; workers go through
//! the [`Fetcher`] trait so tests can substitute a canned implementation.
//! [`HttpFetcher`] is the production implementation on top of reqwest, with
//! the configured timeout and user agent and transparent redirect following.

use crate::{CrawlConfig, FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects, used as the base for link resolution
    pub final_url: String,

    /// Raw page body
    pub body: String,
}

/// Injectable fetch capability consumed by the worker loop
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a page, following redirects, honoring the configured timeout
    ///
    /// Any failure (network error, non-success status, timeout) is returned
    /// as a [`FetchError`]; the caller decides what to do with it. This
    /// method must never panic on a malformed URL.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;
}

/// Production fetcher backed by a shared reqwest client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the crawl configuration
    ///
    /// The client follows redirects transparently (up to reqwest's default
    /// of 10 hops) and reuses connections across all workers.
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .redirect(Policy::limited(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            source: e,
        })?;

        Ok(FetchedPage { final_url, body })
    }
}
