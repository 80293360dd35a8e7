//! Category classifier
//!
//! Maps a `(url, title, content)` triple to a category path and a synthesized
//! breadcrumb trail. This is a best-effort heuristic: keywords are plain
//! substrings, so short ones ("rb", "ls", "map") will misfile some documents.
//! The output is a pure function of its input, which keeps re-scrapes stable.

pub mod tables;

use once_cell::sync::Lazy;
use regex::Regex;
use tables::{FALLBACK_CATEGORY, KEYWORD_TABLES, SLUG_FALLBACKS};
use tracing::debug;

/// Root labels every synthesized breadcrumb trail starts with
pub const ROOT_LABELS: [&str; 2] = ["Knowledge Base", "Haltech"];

/// Number of content characters considered by the keyword scan
const CONTENT_PREFIX_CHARS: usize = 500;

static ARTICLE_SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/kb/articles/([^/?]+)").expect("valid regex"));

/// Result of classifying a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Slash-separated category directory, e.g. `technical-library/engines/nissan`
    pub category_path: String,
    /// Root labels followed by one title-cased label per path segment
    pub breadcrumbs: Vec<String>,
}

impl Classification {
    fn from_path(category_path: &str) -> Self {
        let breadcrumbs = ROOT_LABELS
            .iter()
            .map(|label| label.to_string())
            .chain(
                category_path
                    .split('/')
                    .map(|part| title_case(&part.replace('-', " "))),
            )
            .collect();

        Self {
            category_path: category_path.to_string(),
            breadcrumbs,
        }
    }
}

/// Classifies a document into a category path
///
/// Keyword tables are scanned in priority order (engine, product, technical,
/// software) against `"{url} {title} {first 500 chars of content}"`, all
/// lowercased; the first keyword found wins. The URL is scanned whole, scheme
/// included, so "https" matches the sensor keyword "tps" for any page that
/// no earlier keyword claims.
///
/// Without a keyword match, `/kb/articles/<slug>` URLs are placed by terms in
/// the slug, and everything else lands in the catch-all `articles` bucket.
///
/// # Examples
///
/// ```
/// use kb_mirror::classify;
///
/// let result = classify(
///     "https://support.haltech.com/portal/en/kb/haltech/rb26-wiring-guide/",
///     "RB26 Wiring Guide",
///     "",
/// );
/// assert_eq!(result.category_path, "technical-library/engines/nissan");
/// ```
pub fn classify(url: &str, title: &str, content: &str) -> Classification {
    let content_prefix: String = content.chars().take(CONTENT_PREFIX_CHARS).collect();
    let combined = format!(
        "{} {} {}",
        url.to_lowercase(),
        title.to_lowercase(),
        content_prefix.to_lowercase()
    );

    for table in KEYWORD_TABLES {
        if let Some((keyword, category)) = table
            .entries
            .iter()
            .find(|(keyword, _)| combined.contains(keyword))
        {
            debug!(
                "Classified {} via {} keyword '{}' -> {}",
                url, table.name, keyword, category
            );
            return Classification::from_path(category);
        }
    }

    if url.contains("/kb/articles/") {
        if let Some(slug) = ARTICLE_SLUG.captures(url).and_then(|c| c.get(1)) {
            let slug = slug.as_str();
            for (terms, category) in SLUG_FALLBACKS {
                if terms.iter().any(|term| slug.contains(term)) {
                    debug!("Classified {} via slug '{}' -> {}", url, slug, category);
                    return Classification::from_path(category);
                }
            }
        }
    }

    Classification::from_path(FALLBACK_CATEGORY)
}

/// Uppercases every letter that follows a non-letter and lowercases the rest
///
/// `"technical library"` becomes `"Technical Library"`, `"nsp"` becomes `"Nsp"`.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }

    result
}
