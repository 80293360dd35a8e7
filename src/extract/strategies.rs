//! Ordered extraction strategies
//!
//! Title, content and breadcrumb extraction each run a cascade: strategies are
//! tried in order and the first one that produces a value wins.

use crate::extract::dom::{
    collapsed_text, is_dropped, outer_html, parse_selectors, text_len, Prune,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Minimum trimmed text length for a selector-matched content region
pub const MIN_CONTENT_TEXT: usize = 100;

/// Minimum heuristic score for a fallback content container
pub const MIN_HEURISTIC_SCORE: usize = 200;

/// Score added per paragraph inside a heuristic candidate
const PARAGRAPH_WEIGHT: usize = 50;

pub const TITLE_SELECTORS: &[&str] = &[
    "h1.article-title",
    "h1.kb-title",
    "h1",
    ".page-title",
    ".article-header h1",
];

pub const CONTENT_SELECTORS: &[&str] = &[
    ".article-content",
    ".kb-article-content",
    ".content-wrapper",
    "article",
    "main",
    ".main-content",
    "#main-content",
    ".post-content",
    ".entry-content",
    "div[role=\"main\"]",
];

pub const BREADCRUMB_SELECTORS: &[&str] = &[
    ".breadcrumb",
    "nav[aria-label=\"breadcrumb\"]",
    ".breadcrumbs",
    "ol.breadcrumb",
    "ul.breadcrumb",
];

/// Pruned from a selector-matched content region
static CONTENT_PRUNE: Lazy<Vec<Selector>> =
    Lazy::new(|| parse_selectors(&["nav", "aside", ".sidebar", ".related-articles"]));

/// Ignored by the heuristic scorer and the body fallback
static HEURISTIC_PRUNE: Lazy<Vec<Selector>> = Lazy::new(|| {
    parse_selectors(&[
        "script", "style", "nav", "header", "footer", "aside", ".sidebar",
    ])
});

static HEURISTIC_CANDIDATES: Lazy<Vec<Selector>> =
    Lazy::new(|| parse_selectors(&["div, article, section, main"]));

static PARAGRAPH: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["p"]));
static LIST_ITEM: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["li"]));
static ANCHOR_OR_SPAN: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["a, span"]));
static TITLE_ELEMENT: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["title"]));
static BODY: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["body"]));

const LIST_ITEM_SEPARATORS: &[&str] = &[">", "/", "»"];
const INLINE_SEPARATORS: &[&str] = &[">", "/", "»", "›"];

/// One step of an extraction cascade
pub trait Strategy<T>: Send + Sync {
    /// Short label used in debug logs
    fn name(&self) -> &str;

    /// Returns `Some` when this strategy found a usable value
    fn attempt(&self, document: &Html) -> Option<T>;
}

/// Runs strategies in order and returns the first success
pub fn first_success<T>(strategies: &[Box<dyn Strategy<T>>], document: &Html) -> Option<T> {
    strategies.iter().find_map(|strategy| {
        let result = strategy.attempt(document);
        if result.is_some() {
            debug!("Extraction strategy '{}' succeeded", strategy.name());
        }
        result
    })
}

fn first_match<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

fn first_of<'a>(document: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| first_match(document, s))
}

// ── Title ────────────────────────────────────────────────────────────────────

/// First element matching a selector, if its text is non-empty
pub struct SelectorTitle {
    source: String,
    selector: Selector,
}

impl SelectorTitle {
    pub fn new(source: &str) -> Option<Self> {
        Some(Self {
            source: source.to_string(),
            selector: Selector::parse(source).ok()?,
        })
    }
}

impl Strategy<String> for SelectorTitle {
    fn name(&self) -> &str {
        &self.source
    }

    fn attempt(&self, document: &Html) -> Option<String> {
        let title = collapsed_text(first_match(document, &self.selector)?);
        (!title.is_empty()).then_some(title)
    }
}

/// The `<title>` element with a trailing "| Site" style suffix removed
pub struct DocumentTitle {
    suffix: Option<Regex>,
}

impl DocumentTitle {
    pub fn new(site_name: &str) -> Self {
        let pattern = format!(r"\s*[|–-]\s*{}.*$", regex::escape(site_name));
        Self {
            suffix: Regex::new(&pattern).ok(),
        }
    }
}

impl Strategy<String> for DocumentTitle {
    fn name(&self) -> &str {
        "title element"
    }

    fn attempt(&self, document: &Html) -> Option<String> {
        let raw = collapsed_text(first_of(document, &TITLE_ELEMENT)?);
        let title = match &self.suffix {
            Some(suffix) => suffix.replace(&raw, "").trim().to_string(),
            None => raw,
        };
        (!title.is_empty()).then_some(title)
    }
}

// ── Content ──────────────────────────────────────────────────────────────────

/// First element matching a content selector, pruned, if enough text remains
pub struct SelectorContent {
    source: String,
    selector: Selector,
}

impl SelectorContent {
    pub fn new(source: &str) -> Option<Self> {
        Some(Self {
            source: source.to_string(),
            selector: Selector::parse(source).ok()?,
        })
    }
}

impl Strategy<String> for SelectorContent {
    fn name(&self) -> &str {
        &self.source
    }

    fn attempt(&self, document: &Html) -> Option<String> {
        let element = first_match(document, &self.selector)?;
        let prune = Prune {
            selectors: &CONTENT_PRUNE,
        };
        let length = text_len(element, &prune);
        if length > MIN_CONTENT_TEXT {
            Some(outer_html(element, &prune))
        } else {
            debug!(
                "Content selector '{}' matched only {} characters",
                self.source, length
            );
            None
        }
    }
}

/// Highest scoring block container, scored as `text length + 50 * paragraphs`
///
/// Ties go to the container that appears first in the document.
pub struct HeuristicContent;

impl HeuristicContent {
    fn score(element: ElementRef<'_>, prune: &Prune<'_>) -> usize {
        let paragraphs = PARAGRAPH
            .iter()
            .flat_map(|s| element.select(s))
            .filter(|p| !is_dropped(*p, prune))
            .count();
        text_len(element, prune) + PARAGRAPH_WEIGHT * paragraphs
    }
}

impl Strategy<String> for HeuristicContent {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn attempt(&self, document: &Html) -> Option<String> {
        let prune = Prune {
            selectors: &HEURISTIC_PRUNE,
        };

        let mut best: Option<(ElementRef<'_>, usize)> = None;
        for candidate in HEURISTIC_CANDIDATES.iter().flat_map(|s| document.select(s)) {
            if is_dropped(candidate, &prune) {
                continue;
            }
            let score = Self::score(candidate, &prune);
            if score > MIN_HEURISTIC_SCORE && best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        best.map(|(element, _)| outer_html(element, &prune))
    }
}

/// The whole body with boilerplate removed
pub struct BodyContent;

impl Strategy<String> for BodyContent {
    fn name(&self) -> &str {
        "body"
    }

    fn attempt(&self, document: &Html) -> Option<String> {
        let prune = Prune {
            selectors: &HEURISTIC_PRUNE,
        };
        first_of(document, &BODY).map(|body| outer_html(body, &prune))
    }
}

// ── Breadcrumbs ──────────────────────────────────────────────────────────────

/// Breadcrumb items from the first container matching a selector
///
/// List items are tried first, then mixed anchors and spans. Pure separator
/// glyphs are dropped.
pub struct SelectorBreadcrumbs {
    source: String,
    selector: Selector,
}

impl SelectorBreadcrumbs {
    pub fn new(source: &str) -> Option<Self> {
        Some(Self {
            source: source.to_string(),
            selector: Selector::parse(source).ok()?,
        })
    }
}

impl Strategy<Vec<String>> for SelectorBreadcrumbs {
    fn name(&self) -> &str {
        &self.source
    }

    fn attempt(&self, document: &Html) -> Option<Vec<String>> {
        let container = first_match(document, &self.selector)?;

        let mut items = collect_items(container, &LIST_ITEM, LIST_ITEM_SEPARATORS);
        if items.is_empty() {
            items = collect_items(container, &ANCHOR_OR_SPAN, INLINE_SEPARATORS);
        }

        (!items.is_empty()).then_some(items)
    }
}

fn collect_items(container: ElementRef<'_>, selectors: &[Selector], separators: &[&str]) -> Vec<String> {
    selectors
        .iter()
        .flat_map(|s| container.select(s))
        .map(collapsed_text)
        .filter(|text| !text.is_empty() && !separators.contains(&text.as_str()))
        .collect()
}

/// Builds the title cascade
pub fn title_strategies(site_name: &str) -> Vec<Box<dyn Strategy<String>>> {
    let mut strategies: Vec<Box<dyn Strategy<String>>> = TITLE_SELECTORS
        .iter()
        .filter_map(|s| SelectorTitle::new(s))
        .map(|s| Box::new(s) as Box<dyn Strategy<String>>)
        .collect();
    strategies.push(Box::new(DocumentTitle::new(site_name)));
    strategies
}

/// Builds the content cascade
pub fn content_strategies() -> Vec<Box<dyn Strategy<String>>> {
    let mut strategies: Vec<Box<dyn Strategy<String>>> = CONTENT_SELECTORS
        .iter()
        .filter_map(|s| SelectorContent::new(s))
        .map(|s| Box::new(s) as Box<dyn Strategy<String>>)
        .collect();
    strategies.push(Box::new(HeuristicContent));
    strategies.push(Box::new(BodyContent));
    strategies
}

/// Builds the breadcrumb cascade
pub fn breadcrumb_strategies() -> Vec<Box<dyn Strategy<Vec<String>>>> {
    BREADCRUMB_SELECTORS
        .iter()
        .filter_map(|s| SelectorBreadcrumbs::new(s))
        .map(|s| Box::new(s) as Box<dyn Strategy<Vec<String>>>)
        .collect()
}
