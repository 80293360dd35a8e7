//! Run coordinator - main orchestration logic
//!
//! This module ties the phases of a run together:
//! - Discovering the site, or reusing a saved site map
//! - Scraping every article through the scheduler
//! - Recording failed URLs
//! - Building the top-level index once all pipelines have settled

use crate::config::Config;
use crate::crawler::discovery::discover;
use crate::crawler::renderer::{HttpImageFetcher, HttpRenderer, ImageFetcher, PageRenderer};
use crate::crawler::scheduler::{ScrapeOutcome, Scheduler};
use crate::crawler::sitemap::SiteMap;
use crate::output::build_index;
use crate::Result;
use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Main run coordinator
pub struct Coordinator {
    config: Arc<Config>,
    renderer: Arc<dyn PageRenderer>,
    fetcher: Arc<dyn ImageFetcher>,
}

impl Coordinator {
    pub fn new(
        config: Arc<Config>,
        renderer: Arc<dyn PageRenderer>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            config,
            renderer,
            fetcher,
        }
    }

    /// Creates a coordinator that fetches pages and images over HTTP
    pub fn with_http(config: Arc<Config>) -> Result<Self> {
        let renderer = Arc::new(HttpRenderer::new(config.user_agent.clone()));
        let fetcher = Arc::new(HttpImageFetcher::new(&config.user_agent)?);
        Ok(Self::new(config, renderer, fetcher))
    }

    /// Discovers the site and persists the site map and article list
    pub async fn run_discovery(&self) -> Result<SiteMap> {
        let site_map = discover(&self.config, self.renderer.as_ref()).await;
        let output = &self.config.output;
        site_map.save(&output.site_map_path(), &output.article_list_path())?;
        Ok(site_map)
    }

    /// Runs discovery (or loads the saved site map), scrapes, and builds the index
    ///
    /// With `use_sitemap`, a missing or unreadable site map falls back to
    /// discovery. An empty article set stops the run before scraping.
    pub async fn run_full(&self, use_sitemap: bool) -> Result<ScrapeOutcome> {
        let started = Instant::now();
        let output = &self.config.output;

        let site_map = if use_sitemap {
            info!("Phase 1: Loading existing site map...");
            match SiteMap::load(&output.site_map_path()) {
                Ok(site_map) if !site_map.articles.is_empty() => site_map,
                Ok(_) => {
                    warn!("Existing site map lists no articles, running discovery...");
                    self.run_discovery().await?
                }
                Err(e) => {
                    warn!(
                        "Could not load site map {}: {}, running discovery...",
                        output.site_map_path().display(),
                        e
                    );
                    self.run_discovery().await?
                }
            }
        } else {
            info!("Phase 1: Discovering site structure...");
            self.run_discovery().await?
        };

        if site_map.articles.is_empty() {
            error!("No articles found");
            return Ok(ScrapeOutcome::default());
        }
        info!("Found {} articles to scrape", site_map.articles.len());

        info!("Phase 2: Scraping articles...");
        let scheduler = Scheduler::new(&self.config, self.renderer.as_ref(), self.fetcher.as_ref());
        let outcome = scheduler.run(site_map.articles).await;

        let failed_path = output.failed_list_path();
        outcome.write_failed_list(&failed_path)?;

        info!("Phase 3: Generating index files...");
        std::fs::create_dir_all(&output.output_dir)?;
        if let Err(e) = build_index(
            &output.output_dir,
            &output.images_dir,
            &self.config.site.site_name,
            outcome.scraped.len(),
            Local::now().naive_local(),
        ) {
            error!("Failed to build index: {}", e);
        }

        info!(
            "Scraping complete in {:?}: {} scraped, {} failed",
            started.elapsed(),
            outcome.scraped.len(),
            outcome.failed.len()
        );
        if !outcome.failed.is_empty() {
            info!("Failed URLs saved to: {}", failed_path.display());
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::renderer::BrowsingContext;
    use crate::{ImageError, NavigationError};
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Unreachable;

    #[async_trait]
    impl BrowsingContext for Unreachable {
        async fn navigate(&mut self, _url: &str, _timeout: Duration) -> std::result::Result<String, NavigationError> {
            Err(NavigationError::Transport("connection refused".to_string()))
        }

        async fn close(&mut self) {}
    }

    #[async_trait]
    impl PageRenderer for Unreachable {
        async fn open_context(&self) -> std::result::Result<Box<dyn BrowsingContext>, NavigationError> {
            Ok(Box::new(Unreachable))
        }
    }

    #[async_trait]
    impl ImageFetcher for Unreachable {
        async fn fetch(&self, _url: &str, _timeout: Duration) -> std::result::Result<(u16, Vec<u8>), ImageError> {
            Err(ImageError::Transport("connection refused".to_string()))
        }
    }

    fn coordinator(dir: &TempDir) -> Coordinator {
        let mut config = Config::default();
        config.output.output_dir = dir.path().join("output");
        config.output.logs_dir = dir.path().join("logs");
        Coordinator::new(Arc::new(config), Arc::new(Unreachable), Arc::new(Unreachable))
    }

    #[tokio::test]
    async fn test_empty_site_stops_before_scraping() {
        let dir = TempDir::new().unwrap();
        let outcome = coordinator(&dir).run_full(false).await.unwrap();

        assert_eq!(outcome, ScrapeOutcome::default());
        assert!(dir.path().join("logs/site_map.json").exists());
        assert!(!dir.path().join("output/index.md").exists());
    }

    #[tokio::test]
    async fn test_missing_site_map_falls_back_to_discovery() {
        let dir = TempDir::new().unwrap();
        let outcome = coordinator(&dir).run_full(true).await.unwrap();

        assert!(outcome.scraped.is_empty());
        let json = std::fs::read_to_string(dir.path().join("logs/site_map.json")).unwrap();
        assert!(json.contains("\"total_pages_visited\": 1"));
    }
}
