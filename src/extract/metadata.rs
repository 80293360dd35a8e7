use crate::extract::dom::{collapsed_text, parse_selectors};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:Last\s+)?(?:Modified|Updated):\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
        r"(?i)(?:Date|Published):\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static ARTICLE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)article[/-]?(\d+)").expect("valid regex"));
static AUTHOR_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)author|by-line").expect("valid regex"));
static TAGS_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)tags|keywords").expect("valid regex"));

static CLASSED: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["[class]"]));
static TAG_ITEMS: Lazy<Vec<Selector>> = Lazy::new(|| parse_selectors(&["a, span"]));

/// Tags longer than this are treated as prose, not labels
const MAX_TAG_LEN: usize = 50;

/// Collects whatever auxiliary metadata the page happens to carry
///
/// Keys: `last_modified`, `article_id`, `author`, `tags` (comma separated).
/// The article id is searched in the raw markup so ids inside attributes
/// and URLs are found too.
pub fn extract_metadata(document: &Html, markup: &str) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    let page_text: String = document.root_element().text().collect();
    if let Some(date) = DATE_PATTERNS
        .iter()
        .find_map(|re| re.captures(&page_text))
        .and_then(|c| c.get(1))
    {
        metadata.insert("last_modified".to_string(), date.as_str().to_string());
    }

    if let Some(id) = ARTICLE_ID.captures(markup).and_then(|c| c.get(1)) {
        metadata.insert("article_id".to_string(), id.as_str().to_string());
    }

    if let Some(author) = first_with_class(document, &AUTHOR_CLASS).map(collapsed_text) {
        if !author.is_empty() {
            metadata.insert("author".to_string(), author);
        }
    }

    if let Some(container) = first_with_class(document, &TAGS_CLASS) {
        let tags: Vec<String> = TAG_ITEMS
            .iter()
            .flat_map(|s| container.select(s))
            .map(collapsed_text)
            .filter(|t| !t.is_empty() && t.chars().count() < MAX_TAG_LEN)
            .collect();
        if !tags.is_empty() {
            metadata.insert("tags".to_string(), tags.join(", "));
        }
    }

    metadata
}

/// First element, in document order, whose class attribute matches
fn first_with_class<'a>(document: &'a Html, pattern: &Regex) -> Option<ElementRef<'a>> {
    CLASSED
        .iter()
        .flat_map(|s| document.select(s))
        .find(|el| el.value().attr("class").map_or(false, |c| pattern.is_match(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_modified() {
        let markup = "<html><body><p>Last Modified: 12/03/2023</p></body></html>";
        let html = Html::parse_document(markup);
        let metadata = extract_metadata(&html, markup);
        assert_eq!(metadata.get("last_modified").map(String::as_str), Some("12/03/2023"));
    }

    #[test]
    fn test_published_date_case_insensitive() {
        let markup = "<html><body><span>published: 1-2-24</span></body></html>";
        let html = Html::parse_document(markup);
        let metadata = extract_metadata(&html, markup);
        assert_eq!(metadata.get("last_modified").map(String::as_str), Some("1-2-24"));
    }

    #[test]
    fn test_article_id_from_markup() {
        let markup = r#"<html><body><a href="/kb/article/48213">self</a></body></html>"#;
        let html = Html::parse_document(markup);
        let metadata = extract_metadata(&html, markup);
        assert_eq!(metadata.get("article_id").map(String::as_str), Some("48213"));
    }

    #[test]
    fn test_author_and_tags() {
        let markup = r#"<html><body>
            <div class="post-Author">  Jane   Tuner </div>
            <ul class="article-tags"><li><a>ECU</a></li><li><span>Wiring</span></li></ul>
        </body></html>"#;
        let html = Html::parse_document(markup);
        let metadata = extract_metadata(&html, markup);
        assert_eq!(metadata.get("author").map(String::as_str), Some("Jane Tuner"));
        assert_eq!(metadata.get("tags").map(String::as_str), Some("ECU, Wiring"));
    }

    #[test]
    fn test_nothing_found() {
        let markup = "<html><body><p>plain</p></body></html>";
        let html = Html::parse_document(markup);
        assert!(extract_metadata(&html, markup).is_empty());
    }
}
