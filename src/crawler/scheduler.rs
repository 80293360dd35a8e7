//! Fetch scheduler for article pipelines
//!
//! This module handles:
//! - Bounding the number of article pipelines in flight with a semaphore
//! - Pausing after each pipeline before its permit is released
//! - Retrying failed attempts with growing navigation timeouts
//! - Partitioning every submitted URL into scraped or failed

use crate::config::Config;
use crate::crawler::pipeline::ArticlePipeline;
use crate::crawler::renderer::{ImageFetcher, PageRenderer};
use crate::state::ArticleState;
use crate::url::NormalizedUrl;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Result of a scrape run: every submitted URL lands in exactly one set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeOutcome {
    pub scraped: BTreeSet<NormalizedUrl>,
    pub failed: BTreeSet<NormalizedUrl>,
}

impl ScrapeOutcome {
    /// Writes the failed URLs, one per line, in sorted order
    pub fn write_failed_list(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let list: String = self.failed.iter().map(|url| format!("{}\n", url)).collect();
        fs::write(path, list)
    }
}

/// Per-URL bookkeeping shared by all pipelines of a run
#[derive(Default)]
struct Ledger {
    states: HashMap<NormalizedUrl, ArticleState>,
    scraped: BTreeSet<NormalizedUrl>,
    failed: BTreeSet<NormalizedUrl>,
    settled: usize,
}

/// Drives article pipelines with bounded concurrency, retries and rate limiting
///
/// Pipelines are futures joined on the calling task, so they interleave at
/// await points. The ledger lock is never held across an await.
pub struct Scheduler<'a> {
    config: &'a Config,
    pipeline: ArticlePipeline<'a>,
    permits: Semaphore,
    ledger: Mutex<Ledger>,
}

impl<'a> Scheduler<'a> {
    pub fn new(
        config: &'a Config,
        renderer: &'a dyn PageRenderer,
        fetcher: &'a dyn ImageFetcher,
    ) -> Self {
        Self {
            config,
            pipeline: ArticlePipeline::new(config, renderer, fetcher),
            permits: Semaphore::new(config.crawler.concurrency.max(1) as usize),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Scrapes every URL once and returns the scraped/failed partition
    ///
    /// Duplicate URLs are scraped once. URLs settled by an earlier call on
    /// the same scheduler are skipped.
    pub async fn run(&self, urls: impl IntoIterator<Item = NormalizedUrl>) -> ScrapeOutcome {
        let urls: BTreeSet<NormalizedUrl> = urls.into_iter().collect();
        let total = urls.len();
        let started = Instant::now();

        info!(
            "Scraping {} articles with {} concurrent pipelines",
            total,
            self.permits.available_permits()
        );

        join_all(urls.iter().map(|url| self.scrape(url, total, started))).await;

        let ledger = self.ledger();
        ScrapeOutcome {
            scraped: ledger.scraped.intersection(&urls).cloned().collect(),
            failed: ledger.failed.intersection(&urls).cloned().collect(),
        }
    }

    /// Current state of a URL, if it was ever submitted
    pub fn state(&self, url: &NormalizedUrl) -> Option<ArticleState> {
        self.ledger().states.get(url).copied()
    }

    async fn scrape(&self, url: &NormalizedUrl, total: usize, started: Instant) {
        {
            let mut ledger = self.ledger();
            if ledger.scraped.contains(url) || ledger.failed.contains(url) {
                debug!("Skipping already settled {}", url);
                return;
            }
            ledger.states.insert(url.clone(), ArticleState::Pending);
        }

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Scheduler closed before {} could run: {}", url, e);
                self.settle(url, false, total, started);
                return;
            }
        };

        let scraped = self.attempt(url).await;
        self.settle(url, scraped, total, started);

        // the slot stays taken until the delay has passed
        tokio::time::sleep(self.config.crawler.request_delay()).await;
    }

    /// Runs the pipeline until it succeeds or the retry budget is spent
    async fn attempt(&self, url: &NormalizedUrl) -> bool {
        let max_retries = self.config.crawler.max_retries;
        let report = |state: ArticleState| self.transition(url, state);

        for attempt in 0..=max_retries {
            self.transition(url, ArticleState::Fetching);

            match self.pipeline.run(url, attempt, &report).await {
                Ok(_) => return true,
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    warn!("Error scraping {}: {}", url, e);
                    info!("Retrying {} (attempt {})", url, attempt + 1);
                    self.transition(url, ArticleState::Retry);
                    tokio::time::sleep(self.config.crawler.retry_cooldown()).await;
                }
                Err(e) => {
                    error!(
                        "Giving up on {} after {} attempts: {}",
                        url,
                        attempt + 1,
                        e
                    );
                    return false;
                }
            }
        }

        false
    }

    fn transition(&self, url: &NormalizedUrl, next: ArticleState) {
        let mut ledger = self.ledger();
        if let Some(current) = ledger.states.get(url) {
            if !current.can_transition_to(next) {
                warn!("Unexpected state change for {}: {} -> {}", url, current, next);
            }
        }
        ledger.states.insert(url.clone(), next);
    }

    fn settle(&self, url: &NormalizedUrl, scraped: bool, total: usize, started: Instant) {
        self.transition(
            url,
            if scraped {
                ArticleState::Done
            } else {
                ArticleState::Failed
            },
        );

        let mut ledger = self.ledger();
        if scraped {
            ledger.scraped.insert(url.clone());
        } else {
            ledger.failed.insert(url.clone());
        }
        ledger.settled += 1;

        if ledger.settled % 10 == 0 {
            let rate = ledger.settled as f64 / started.elapsed().as_secs_f64();
            info!(
                "Progress: {}/{} articles settled, {} failed, {:.2} pages/sec",
                ledger.settled,
                total,
                ledger.failed.len(),
                rate
            );
        }
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
