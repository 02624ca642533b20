//! Spindle command-line front end
//!
//! Reads a seed URL, worker count, and optional crawl duration, then runs
//! the crawler while polling its progress counters once per second. Duration
//! enforcement and exhaustion detection live here, not in the crawl core.

use anyhow::Context;
use clap::Parser;
use spindle::{CrawlConfig, Crawler};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Spindle: a concurrent breadth-first web crawler
#[derive(Parser, Debug)]
#[command(name = "spindle")]
#[command(version)]
#[command(about = "Crawl the web outward from a seed URL", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    seed: String,

    /// Number of concurrent worker tasks
    #[arg(short, long)]
    workers: Option<usize>,

    /// Stop crawling after this many seconds (runs until Ctrl-C otherwise)
    #[arg(short, long, value_name = "SECONDS")]
    duration: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    // Seed validation is the caller's concern; the frontier accepts any string.
    let seed = url::Url::parse(&cli.seed)
        .with_context(|| format!("invalid seed URL: {}", cli.seed))?;

    let mut config = CrawlConfig::default();
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    let mut crawler = Crawler::new(config)?;
    crawler.start(seed.as_str())?;

    monitor(&crawler, cli.duration.map(Duration::from_secs)).await;

    crawler.stop().await?;
    println!(
        "Crawl finished: {} pages processed, {} URLs still queued",
        crawler.pages_processed(),
        crawler.queue_size()
    );

    Ok(())
}

/// Polls progress once per second until the crawl should end
///
/// Ends on: the configured duration elapsing, Ctrl-C, or apparent
/// exhaustion (empty queue and an unchanged page count for several
/// consecutive ticks — with an empty frontier the workers are all blocked
/// waiting for work that can no longer arrive).
async fn monitor(crawler: &Crawler, duration: Option<Duration>) {
    const IDLE_TICKS: u32 = 3;

    let started = tokio::time::Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await; // first tick fires immediately

    let mut last_pages = 0;
    let mut idle_ticks = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping crawl");
                return;
            }
        }

        let pages = crawler.pages_processed();
        let queued = crawler.queue_size();
        println!("{} pages processed, {} queued", pages, queued);

        if let Some(limit) = duration {
            if started.elapsed() >= limit {
                tracing::info!("crawl duration reached");
                return;
            }
        }

        if queued == 0 && pages == last_pages {
            idle_ticks += 1;
            if idle_ticks >= IDLE_TICKS {
                tracing::info!("frontier exhausted");
                return;
            }
        } else {
            idle_ticks = 0;
        }
        last_pages = pages;
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("spindle=info,warn"),
            1 => EnvFilter::new("spindle=debug,info"),
            2 => EnvFilter::new("spindle=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
