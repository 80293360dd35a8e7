//! Output path resolution
//!
//! Decides where a document lives in the output tree. The file name always
//! comes from the URL, never from the title, so documents sharing a title do
//! not overwrite each other.

use crate::classify::classify;
use crate::url::{last_segment, path_segments};
use std::path::PathBuf;
use tracing::debug;

/// Marker of article URLs whose location is decided by the classifier
const ARTICLE_PATH: &str = "/kb/articles/";

/// Breadcrumb entries above the category levels ("Knowledge Base", site name)
const ROOT_BREADCRUMBS: usize = 2;

/// Characters that are not allowed in file names
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '/', '\\'];

/// Where a document is written, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    /// Category directories below the output root; empty for the root itself
    pub directories: Vec<String>,
    pub filename: String,
}

impl OutputLocation {
    pub fn directory(&self) -> PathBuf {
        self.directories.iter().collect()
    }

    /// Number of directory levels between the document and the output root
    pub fn depth(&self) -> usize {
        self.directories.len()
    }
}

/// Resolves the directory and file name for a document
///
/// # Decision Order
///
/// 1. Article URLs (`/kb/articles/`) without navigation context (two or
///    fewer breadcrumbs) are placed by the category classifier
/// 2. Otherwise, more than two breadcrumbs give the directories, minus the
///    two root labels, each slugified
/// 3. Otherwise, the URL path segments (after `path_prefixes`) minus the last
///
/// The file name is the last URL segment, cleaned and truncated to
/// `max_filename_length`, with `.md` appended.
pub fn resolve_path(
    url: &str,
    title: &str,
    content: &str,
    breadcrumbs: &[String],
    path_prefixes: &[String],
    max_filename_length: usize,
) -> OutputLocation {
    let without_navigation = breadcrumbs.len() <= ROOT_BREADCRUMBS;

    let directories: Vec<String> = if url.contains(ARTICLE_PATH) && without_navigation {
        let classification = classify(url, title, content);
        debug!(
            "Placing {} by classifier: {}",
            url, classification.category_path
        );
        classification
            .category_path
            .split('/')
            .map(str::to_string)
            .collect()
    } else if !without_navigation {
        breadcrumbs[ROOT_BREADCRUMBS..]
            .iter()
            .map(|crumb| slugify(crumb))
            .filter(|slug| !slug.is_empty())
            .collect()
    } else {
        let mut segments = path_segments(url, path_prefixes);
        segments.pop();
        segments
            .iter()
            .map(|segment| clean_filename(segment))
            .filter(|segment| !segment.is_empty() && segment != "." && segment != "..")
            .collect()
    };

    OutputLocation {
        directories,
        filename: document_filename(url, max_filename_length),
    }
}

/// File name for a document, from the last URL path segment
pub fn document_filename(url: &str, max_filename_length: usize) -> String {
    let stem = last_segment(url)
        .map(|segment| truncate_at_separator(&clean_filename(&segment), max_filename_length))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "index".to_string());
    format!("{}.md", stem)
}

/// Lowercase, with every run of non-alphanumeric characters turned into one '-'
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Removes characters that are invalid in file names and collapses whitespace
pub fn clean_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts a name to at most `max_len` characters, backing up to the last '-'
pub fn truncate_at_separator(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }

    let truncated: String = name.chars().take(max_len).collect();
    match truncated.rsplit_once('-') {
        Some((head, _)) if !head.is_empty() => head.to_string(),
        _ => truncated,
    }
}
