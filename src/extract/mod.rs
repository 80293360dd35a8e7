//! Content extraction
//!
//! Turns a rendered page into an [`ArticleDocument`]: title, main content
//! markup, breadcrumb trail, auxiliary metadata and image references.

pub mod dom;
mod metadata;
pub mod strategies;

use dom::{contains_element, has_text, inner_html, DomFilter};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use strategies::{
    breadcrumb_strategies, content_strategies, first_success, title_strategies, Strategy,
};

pub use metadata::extract_metadata;

/// Title used when a page offers nothing better
pub const UNTITLED: &str = "Untitled Article";

static IMAGES: Lazy<Vec<Selector>> = Lazy::new(|| dom::parse_selectors(&["img[src]"]));

/// An image referenced by a page, as written in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// `src` attribute, possibly relative
    pub src: String,
    pub alt: String,
    pub title: String,
}

/// Everything extracted from one article page
#[derive(Debug, Clone)]
pub struct ArticleDocument {
    pub url: String,
    pub title: String,
    /// Outer markup of the selected content region; empty when nothing was found
    pub content_html: String,
    pub breadcrumbs: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    /// Every image on the page in document order, inside the content region or not
    pub images: Vec<ImageRef>,
}

/// Runs the title, content and breadcrumb cascades over page markup
pub struct Extractor {
    title: Vec<Box<dyn Strategy<String>>>,
    content: Vec<Box<dyn Strategy<String>>>,
    breadcrumbs: Vec<Box<dyn Strategy<Vec<String>>>>,
}

impl Extractor {
    /// Creates an extractor; `site_name` is stripped from `<title>` fallbacks
    pub fn new(site_name: &str) -> Self {
        Self {
            title: title_strategies(site_name),
            content: content_strategies(),
            breadcrumbs: breadcrumb_strategies(),
        }
    }

    pub fn extract(&self, markup: &str, url: &str) -> ArticleDocument {
        let document = Html::parse_document(markup);

        ArticleDocument {
            url: url.to_string(),
            title: first_success(&self.title, &document).unwrap_or_else(|| UNTITLED.to_string()),
            content_html: first_success(&self.content, &document).unwrap_or_default(),
            breadcrumbs: first_success(&self.breadcrumbs, &document).unwrap_or_default(),
            metadata: extract_metadata(&document, markup),
            images: extract_images(&document),
        }
    }
}

fn extract_images(document: &Html) -> Vec<ImageRef> {
    IMAGES
        .iter()
        .flat_map(|s| document.select(s))
        .filter_map(|img| {
            let element = img.value();
            let src = element.attr("src")?.trim();
            if src.is_empty() {
                return None;
            }
            Some(ImageRef {
                src: src.to_string(),
                alt: element.attr("alt").unwrap_or_default().to_string(),
                title: element.attr("title").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Drops empty paragraphs, empty divs and doubled line breaks
struct Cleanup;

impl DomFilter for Cleanup {
    fn keep(&self, el: ElementRef<'_>) -> bool {
        match el.value().name() {
            "p" => has_text(el) || contains_element(el, &["img"]),
            "div" => has_text(el) || contains_element(el, &["img", "video", "iframe"]),
            // of two adjacent <br>, only the second survives
            "br" => !el
                .next_sibling()
                .and_then(|n| n.value().as_element().map(|e| e.name() == "br"))
                .unwrap_or(false),
            _ => true,
        }
    }
}

/// Tidies extracted content markup before Markdown conversion
pub fn clean_content(content_html: &str) -> String {
    let fragment = Html::parse_fragment(content_html);
    inner_html(fragment.root_element(), &Cleanup)
}

/// Returns true if content markup carries neither text nor images
pub fn is_empty_content(content_html: &str) -> bool {
    if content_html.trim().is_empty() {
        return true;
    }
    let fragment = Html::parse_fragment(content_html);
    let root = fragment.root_element();
    !has_text(root) && !contains_element(root, &["img"])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html>
<head><title>RB26 Wiring Guide | Haltech</title></head>
<body>
  <nav class="breadcrumbs"><a href="/kb">Knowledge Base</a><span>/</span><a href="/kb/haltech">Haltech</a><span>/</span><a href="/kb/engines">Engines</a></nav>
  <img src="/img/logo.png" alt="logo">
  <div class="article-content">
    <h1 class="article-title">RB26 Wiring Guide</h1>
    <p>This guide covers wiring a Haltech Elite into an RB26DETT equipped Skyline, including the trigger, injectors and coils.</p>
    <img src="/img/diagram.png" alt="Diagram" title="Pinout">
  </div>
</body>
</html>"#;

    #[test]
    fn test_extract_full_page() {
        let extractor = Extractor::new("Haltech");
        let doc = extractor.extract(PAGE, "https://support.haltech.com/kb/articles/rb26");

        assert_eq!(doc.title, "RB26 Wiring Guide");
        assert!(doc.content_html.starts_with(r#"<div class="article-content">"#));
        assert_eq!(doc.breadcrumbs, vec!["Knowledge Base", "Haltech", "Engines"]);
        assert_eq!(doc.images.len(), 2);
        assert_eq!(doc.images[0].src, "/img/logo.png");
        assert_eq!(
            doc.images[1],
            ImageRef {
                src: "/img/diagram.png".to_string(),
                alt: "Diagram".to_string(),
                title: "Pinout".to_string(),
            }
        );
    }

    #[test]
    fn test_untitled_placeholder() {
        let extractor = Extractor::new("Haltech");
        let doc = extractor.extract("<html><body><p>x</p></body></html>", "https://x.test/a");
        assert_eq!(doc.title, UNTITLED);
    }

    #[test]
    fn test_empty_page_has_no_content() {
        let extractor = Extractor::new("Haltech");
        let doc = extractor.extract("", "https://x.test/a");
        assert!(doc.breadcrumbs.is_empty());
        assert!(doc.images.is_empty());
        // the parser always synthesizes <body>, which is the last resort
        assert_eq!(doc.content_html, "<body></body>");
    }

    #[test]
    fn test_is_empty_content() {
        assert!(is_empty_content(""));
        assert!(is_empty_content("<body></body>"));
        assert!(is_empty_content("<div> <p>\n</p></div>"));
        assert!(!is_empty_content("<div>text</div>"));
        assert!(!is_empty_content(r#"<div><img src="a.png"></div>"#));
    }

    #[test]
    fn test_clean_content() {
        let cleaned = clean_content(
            r#"<div><p> </p><p>text<br><br>more</p><div>  </div><div><img src="a.png"></div><p><img src="b.png"></p></div>"#,
        );
        assert_eq!(
            cleaned,
            r#"<div><p>text<br>more</p><div><img src="a.png"></div><p><img src="b.png"></p></div>"#
        );
    }

    #[test]
    fn test_clean_keeps_separated_breaks() {
        let cleaned = clean_content("<p>a<br> <br>b</p>");
        assert_eq!(cleaned, "<p>a<br> <br>b</p>");
    }
}
