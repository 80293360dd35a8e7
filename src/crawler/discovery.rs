//! Site discovery
//!
//! Breadth-first traversal from the seed URL. Every page is fetched once; its
//! links are classified as articles (recorded) or categories (queued one level
//! deeper), and any breadcrumb trail on the page is recorded against it.

use crate::config::Config;
use crate::crawler::renderer::{BrowsingContext, PageRenderer};
use crate::crawler::sitemap::SiteMap;
use crate::extract::dom::{collapsed_text, parse_selectors};
use crate::url::{normalize, normalize_in_scope, NormalizedUrl};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, error, info};
use url::Url;

const ARTICLE_PATTERNS: &[&str] = &[
    "/articles/",
    "/article/",
    "/solutions/",
    "/how-to/",
    "/guide/",
    "/tutorial/",
];

const CATEGORY_PATTERNS: &[&str] = &["/category/", "/categories/", "/section/", "/topic/"];

/// Path marker of knowledge-base sections
const KB_SECTION: &str = "/kb/";

/// Suffixes of static pages that count as articles when the anchor text looks
/// like a title
const PAGE_SUFFIXES: &[&str] = &[".html", ".htm"];

/// Anchor text must be longer than this for a suffix match to count
const MIN_TITLE_LEN: usize = 10;

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "#"];

static LINKS: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["a[href]"]));

static BREADCRUMB_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["nav", "ol", "ul"]));

static LIST_ITEMS: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["li"]));

static ANCHORS: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["a"]));

/// What a discovered link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Article,
    Category,
    Other,
}

/// Links and breadcrumb trail found on one page
#[derive(Debug, Default)]
struct PageLinks {
    links: Vec<(NormalizedUrl, String)>,
    breadcrumbs: Vec<String>,
}

/// Classifies a link by its URL and anchor text
///
/// Article patterns win over category patterns. A knowledge-base section link
/// that fails the article test is a category.
pub fn classify_link(url: &str, link_text: &str) -> LinkKind {
    if is_article_url(url, link_text) {
        LinkKind::Article
    } else if is_category_url(url) {
        LinkKind::Category
    } else {
        LinkKind::Other
    }
}

fn is_article_url(url: &str, link_text: &str) -> bool {
    let lower = url.to_lowercase();
    if ARTICLE_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    let path = Url::parse(&lower)
        .map(|u| u.path().to_string())
        .unwrap_or(lower);
    PAGE_SUFFIXES.iter().any(|s| path.ends_with(s)) && link_text.chars().count() > MIN_TITLE_LEN
}

fn is_category_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    CATEGORY_PATTERNS.iter().any(|p| lower.contains(p))
        || (lower.contains(KB_SECTION) && !is_article_url(url, ""))
}

/// Crawls the site from the configured seed and returns the site map
///
/// A page that cannot be fetched is logged and contributes no links. If no
/// browsing context can be opened at all, the returned map is empty.
pub async fn discover(config: &Config, renderer: &dyn PageRenderer) -> SiteMap {
    let mut site_map = SiteMap::default();

    let seed = match normalize(&config.site.kb_url, None) {
        Ok(url) => url,
        Err(e) => {
            error!("Invalid seed URL {}: {}", config.site.kb_url, e);
            return site_map;
        }
    };

    let mut context = match renderer.open_context().await {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to open browsing context for discovery: {}", e);
            return site_map;
        }
    };

    info!("Starting site discovery from: {}", seed);

    let max_depth = config.crawler.max_depth;
    let mut queued: HashSet<NormalizedUrl> = HashSet::new();
    let mut worklist: VecDeque<(NormalizedUrl, u32)> = VecDeque::new();
    queued.insert(seed.clone());
    worklist.push_back((seed, 0));

    while let Some((url, depth)) = worklist.pop_front() {
        site_map.visited.insert(url.clone());
        info!("Discovering: {} (depth: {})", url, depth);

        let page = fetch_page(context.as_mut(), &url, config).await;

        for (link, text) in page.links {
            match classify_link(link.as_str(), &text) {
                LinkKind::Article => {
                    if site_map.articles.insert(link.clone()) {
                        debug!("Found article: {} ({})", link, text);
                    }
                }
                LinkKind::Category => {
                    if depth < max_depth && !queued.contains(&link) {
                        debug!("Found category: {}", link);
                        queued.insert(link.clone());
                        worklist.push_back((link, depth + 1));
                    }
                }
                LinkKind::Other => {}
            }
        }

        if !page.breadcrumbs.is_empty() {
            site_map
                .category_structure
                .insert(url.clone(), page.breadcrumbs);
        }
    }

    context.close().await;

    info!(
        "Discovery complete. Found {} articles across {} pages",
        site_map.articles.len(),
        site_map.visited.len()
    );

    site_map
}

async fn fetch_page(
    context: &mut dyn BrowsingContext,
    url: &NormalizedUrl,
    config: &Config,
) -> PageLinks {
    match context
        .navigate(url.as_str(), config.crawler.navigation_timeout(0))
        .await
    {
        Ok(markup) => parse_page(&markup, url.as_str(), config),
        Err(e) => {
            error!("Error discovering {}: {}", url, e);
            PageLinks::default()
        }
    }
}

fn parse_page(markup: &str, page_url: &str, config: &Config) -> PageLinks {
    let document = Html::parse_document(markup);

    let links = LINKS
        .iter()
        .flat_map(|s| document.select(s))
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if href.is_empty() || SKIPPED_SCHEMES.iter().any(|s| href.starts_with(s)) {
                return None;
            }
            match normalize_in_scope(href, page_url, &config.site) {
                Ok(url) => Some((url, collapsed_text(a))),
                Err(e) => {
                    debug!("Skipping link {}: {}", href, e);
                    None
                }
            }
        })
        .collect();

    PageLinks {
        links,
        breadcrumbs: page_breadcrumbs(&document),
    }
}

/// Item texts of the last breadcrumb-classed `nav`, `ol` or `ul`
fn page_breadcrumbs(document: &Html) -> Vec<String> {
    let containers: Vec<_> = BREADCRUMB_CONTAINERS
        .iter()
        .flat_map(|s| document.select(s))
        .filter(|el| {
            el.value()
                .attr("class")
                .map_or(false, |class| class.to_lowercase().contains("breadcrumb"))
        })
        .collect();

    containers
        .iter()
        .rev()
        .map(|container| {
            let texts = |selectors: &[Selector]| -> Vec<String> {
                selectors
                    .iter()
                    .flat_map(|s| container.select(s))
                    .map(collapsed_text)
                    .filter(|t| !t.is_empty())
                    .collect()
            };
            let items = texts(LIST_ITEMS.as_slice());
            if items.is_empty() {
                texts(ANCHORS.as_slice())
            } else {
                items
            }
        })
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}
