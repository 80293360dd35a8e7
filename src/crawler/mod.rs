//! Crawler module for discovering and scraping the knowledge base
//!
//! This module contains the core run logic, including:
//! - Page rendering and image fetching collaborators
//! - Site discovery and site map persistence
//! - The per-article pipeline
//! - Bounded-concurrency scheduling with retries
//! - Overall run coordination

mod coordinator;
mod discovery;
mod pipeline;
mod renderer;
mod scheduler;
mod sitemap;

pub use coordinator::Coordinator;
pub use discovery::{classify_link, discover, LinkKind};
pub use pipeline::ArticlePipeline;
pub use renderer::{
    build_http_client, BrowsingContext, HttpImageFetcher, HttpRenderer, ImageFetcher, PageRenderer,
};
pub use scheduler::{ScrapeOutcome, Scheduler};
pub use sitemap::SiteMap;
