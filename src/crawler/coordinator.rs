//! Crawl coordination: worker pool and start/stop lifecycle
//!
//! The [`Crawler`] owns the frontier, a fixed-size pool of worker tasks, and
//! the shared progress counters. Workers run independently; the frontier and
//! the counters are the only state they share. Shutdown is cooperative: an
//! in-flight fetch is allowed to finish (or time out on its own deadline)
//! before the worker observes the closed frontier and exits.

use crate::crawler::extract::extract_links;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::Frontier;
use crate::{CrawlConfig, CrawlError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

/// State shared between the coordinator and its workers
struct Shared {
    frontier: Frontier,
    fetcher: Arc<dyn Fetcher>,
    running: AtomicBool,
    pages_processed: AtomicU64,
    politeness_delay: Duration,
}

/// The crawl coordinator
///
/// Lifecycle: [`start`](Crawler::start) seeds the frontier and launches the
/// worker pool, [`stop`](Crawler::stop) drains and joins it. Progress is
/// readable from any thread at any time via
/// [`pages_processed`](Crawler::pages_processed) and
/// [`queue_size`](Crawler::queue_size). A stopped crawler may be started
/// again; each run gets a fresh, empty frontier and a zeroed page counter.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: Arc<dyn Fetcher>,
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl Crawler {
    /// Creates a crawler with the production HTTP fetcher
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        config.validate()?;
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Creates a crawler with an injected fetch capability
    ///
    /// This is the seam tests use to crawl without a network.
    pub fn with_fetcher(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, CrawlError> {
        config.validate()?;
        let shared = Arc::new(Shared {
            frontier: Frontier::new(),
            fetcher: fetcher.clone(),
            running: AtomicBool::new(false),
            pages_processed: AtomicU64::new(0),
            politeness_delay: config.politeness_delay,
        });

        Ok(Self {
            config,
            fetcher,
            shared,
            workers: Vec::new(),
        })
    }

    /// Seeds the frontier and launches the worker pool
    ///
    /// Returns once the workers are launched; crawling proceeds
    /// asynchronously. The seed is subject to the same dedup rule as any
    /// other URL and is not validated here — a malformed seed simply fails
    /// at fetch time.
    ///
    /// # Errors
    ///
    /// [`CrawlError::AlreadyRunning`] if called while a crawl is active.
    pub fn start(&mut self, seed: &str) -> Result<(), CrawlError> {
        if self.shared.running.load(Ordering::SeqCst) {
            return Err(CrawlError::AlreadyRunning);
        }

        // Fresh state per run: previous workers were joined by stop(), so
        // nothing else holds the old frontier.
        self.shared = Arc::new(Shared {
            frontier: Frontier::new(),
            fetcher: self.fetcher.clone(),
            running: AtomicBool::new(true),
            pages_processed: AtomicU64::new(0),
            politeness_delay: self.config.politeness_delay,
        });

        self.shared.frontier.push(seed);

        tracing::info!(seed, workers = self.config.workers, "starting crawl");
        for id in 0..self.config.workers {
            let shared = self.shared.clone();
            self.workers.push(tokio::spawn(worker_loop(id, shared)));
        }

        Ok(())
    }

    /// Signals shutdown and waits for every worker to terminate
    ///
    /// Calling `stop` on a crawler that is not running is a no-op returning
    /// `Ok(())`. Safe to call when some workers have already exited on their
    /// own. After `stop` returns no worker task remains alive.
    pub async fn stop(&mut self) -> Result<(), CrawlError> {
        if !self.shared.running.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        self.shared.frontier.finish();

        let mut result = Ok(());
        for handle in self.workers.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "worker task failed");
                if result.is_ok() {
                    result = Err(CrawlError::Worker(e));
                }
            }
        }

        tracing::info!(
            pages = self.shared.pages_processed.load(Ordering::Relaxed),
            "crawl stopped"
        );
        result
    }

    /// Number of pages successfully processed so far
    pub fn pages_processed(&self) -> u64 {
        self.shared.pages_processed.load(Ordering::Relaxed)
    }

    /// Snapshot of the number of URLs waiting in the frontier
    pub fn queue_size(&self) -> usize {
        self.shared.frontier.len()
    }

    /// Whether a crawl is currently active
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

impl Drop for Crawler {
    /// Signals shutdown so workers of a dropped running crawler exit on
    /// their own instead of blocking in `pop` forever. Joining is only
    /// possible in the async [`stop`](Crawler::stop).
    fn drop(&mut self) {
        if self.shared.running.swap(false, Ordering::SeqCst) {
            self.shared.frontier.finish();
        }
    }
}

/// The fetch → extract → enqueue loop run by each worker task
///
/// The pop return value is the only exit signal besides the running flag, so
/// a worker can never block past a `stop()` call: if it is waiting in `pop`
/// the close wakes it, and if it is mid-fetch it finishes that cycle first.
async fn worker_loop(id: usize, shared: Arc<Shared>) {
    tracing::debug!(worker = id, "worker started");

    while shared.running.load(Ordering::SeqCst) {
        let Some(url) = shared.frontier.pop().await else {
            break;
        };

        match shared.fetcher.fetch(&url).await {
            Ok(page) => {
                let links = match Url::parse(&page.final_url) {
                    Ok(base) => extract_links(&page.body, &base),
                    Err(e) => {
                        tracing::debug!(url = %page.final_url, error = %e, "unparseable base URL, skipping extraction");
                        Vec::new()
                    }
                };

                shared.pages_processed.fetch_add(1, Ordering::Relaxed);

                // No local dedup: every candidate goes through the
                // frontier's atomic test-and-insert.
                for link in links {
                    shared.frontier.push(link);
                }
            }
            Err(e) => {
                // A failed fetch abandons the URL; it is never retried.
                tracing::warn!(worker = id, %url, error = %e, "fetch failed");
            }
        }

        tokio::time::sleep(shared.politeness_delay).await;
    }

    tracing::debug!(worker = id, "worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchedPage;
    use crate::{FetchError, FetchResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned fetcher serving an in-memory site and counting hits per URL
    struct StubFetcher {
        pages: HashMap<String, String>,
        hits: Mutex<HashMap<String, usize>>,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
                hits: Mutex::new(HashMap::new()),
            })
        }

        fn hits(&self, url: &str) -> usize {
            self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
            *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
            match self.pages.get(url) {
                Some(body) => Ok(FetchedPage {
                    final_url: url.to_string(),
                    body: body.clone(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn fast_config(workers: usize) -> CrawlConfig {
        CrawlConfig {
            workers,
            politeness_delay: Duration::from_millis(1),
            ..CrawlConfig::default()
        }
    }

    /// Polls a condition until it holds or a deadline passes
    async fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let start = tokio::time::Instant::now();
        while start.elapsed() < deadline {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        condition()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_zero_link_seed_terminates_with_one_page() {
        let fetcher = StubFetcher::new(&[("http://example.com/", "<html><body>no links</body></html>")]);
        let mut crawler = Crawler::with_fetcher(fast_config(4), fetcher).unwrap();

        crawler.start("http://example.com/").unwrap();
        assert!(
            wait_until(Duration::from_secs(5), || crawler.pages_processed() == 1).await,
            "seed was never processed"
        );

        crawler.stop().await.unwrap();
        assert_eq!(crawler.pages_processed(), 1);
        assert_eq!(crawler.queue_size(), 0);
        assert!(!crawler.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_seed_fetch_leaves_counters_at_zero() {
        // Seed not served by the stub: every fetch of it returns 404
        let fetcher = StubFetcher::new(&[]);
        let mut crawler = Crawler::with_fetcher(fast_config(2), fetcher.clone()).unwrap();

        crawler.start("http://example.com/").unwrap();
        assert!(
            wait_until(Duration::from_secs(5), || fetcher.hits("http://example.com/") == 1).await,
            "seed fetch was never attempted"
        );

        crawler.stop().await.unwrap();
        assert_eq!(crawler.pages_processed(), 0);
        assert_eq!(crawler.queue_size(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queue_reflects_extracted_links() {
        let fetcher = StubFetcher::new(&[(
            "http://example.com",
            r#"<a href="http://example.com/a">a</a><a href="/b">b</a>"#,
        )]);
        // One worker with a long delay: after processing the seed it sleeps,
        // so the two pushed links sit in the queue unclaimed.
        let config = CrawlConfig {
            workers: 1,
            politeness_delay: Duration::from_secs(2),
            ..CrawlConfig::default()
        };
        let mut crawler = Crawler::with_fetcher(config, fetcher).unwrap();

        crawler.start("http://example.com").unwrap();
        assert!(
            wait_until(Duration::from_secs(5), || crawler.pages_processed() == 1).await,
            "seed was never processed"
        );

        assert_eq!(crawler.queue_size(), 2);
        crawler.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_backlink_to_seed_not_refetched() {
        let fetcher = StubFetcher::new(&[
            ("http://example.com/", r#"<a href="/a">a</a>"#),
            ("http://example.com/a", r#"<a href="http://example.com/">home</a>"#),
        ]);
        let mut crawler = Crawler::with_fetcher(fast_config(4), fetcher.clone()).unwrap();

        crawler.start("http://example.com/").unwrap();
        assert!(
            wait_until(Duration::from_secs(5), || crawler.pages_processed() == 2).await,
            "crawl did not reach both pages"
        );

        crawler.stop().await.unwrap();
        assert_eq!(crawler.pages_processed(), 2);
        assert_eq!(fetcher.hits("http://example.com/"), 1);
        assert_eq!(fetcher.hits("http://example.com/a"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cyclic_link_graph_terminates() {
        let fetcher = StubFetcher::new(&[
            ("http://example.com/a", r#"<a href="/b">b</a>"#),
            ("http://example.com/b", r#"<a href="/c">c</a>"#),
            ("http://example.com/c", r#"<a href="/a">a</a>"#),
        ]);
        let mut crawler = Crawler::with_fetcher(fast_config(2), fetcher.clone()).unwrap();

        crawler.start("http://example.com/a").unwrap();
        assert!(
            wait_until(Duration::from_secs(5), || crawler.pages_processed() == 3).await,
            "cycle was not fully visited"
        );

        crawler.stop().await.unwrap();
        assert_eq!(crawler.pages_processed(), 3);
        for url in [
            "http://example.com/a",
            "http://example.com/b",
            "http://example.com/c",
        ] {
            assert_eq!(fetcher.hits(url), 1, "{} fetched more than once", url);
        }
    }

    #[tokio::test]
    async fn test_double_start_is_an_error() {
        let fetcher = StubFetcher::new(&[]);
        let mut crawler = Crawler::with_fetcher(fast_config(1), fetcher).unwrap();

        crawler.start("http://example.com/").unwrap();
        assert!(matches!(
            crawler.start("http://example.com/"),
            Err(CrawlError::AlreadyRunning)
        ));
        crawler.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_is_a_noop() {
        let fetcher = StubFetcher::new(&[]);
        let mut crawler = Crawler::with_fetcher(fast_config(1), fetcher).unwrap();
        crawler.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_twice_matches_stopping_once() {
        let fetcher = StubFetcher::new(&[("http://example.com/", "<html></html>")]);
        let mut crawler = Crawler::with_fetcher(fast_config(2), fetcher).unwrap();

        crawler.start("http://example.com/").unwrap();
        crawler.stop().await.unwrap();
        let pages = crawler.pages_processed();

        crawler.stop().await.unwrap();
        assert_eq!(crawler.pages_processed(), pages);
        assert!(!crawler.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restart_gets_fresh_state() {
        let fetcher = StubFetcher::new(&[
            ("http://one.example/", "<html></html>"),
            ("http://two.example/", "<html></html>"),
        ]);
        let mut crawler = Crawler::with_fetcher(fast_config(2), fetcher.clone()).unwrap();

        crawler.start("http://one.example/").unwrap();
        assert!(wait_until(Duration::from_secs(5), || crawler.pages_processed() == 1).await);
        crawler.stop().await.unwrap();

        // Second run starts from a zeroed counter and an empty frontier;
        // the first seed is not remembered as discovered.
        crawler.start("http://two.example/").unwrap();
        assert!(
            wait_until(Duration::from_secs(5), || crawler.pages_processed() == 1).await,
            "second run never processed its seed"
        );
        crawler.stop().await.unwrap();

        assert_eq!(crawler.pages_processed(), 1);
        assert_eq!(fetcher.hits("http://one.example/"), 1);
        assert_eq!(fetcher.hits("http://two.example/"), 1);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_construction() {
        let fetcher = StubFetcher::new(&[]);
        let config = CrawlConfig {
            workers: 0,
            ..CrawlConfig::default()
        };
        assert!(matches!(
            Crawler::with_fetcher(config, fetcher),
            Err(CrawlError::Config(_))
        ));
    }
}
