//! Site map persistence
//!
//! The site map is the only artifact carried from one run to the next. It is
//! written as pretty JSON next to a plain sorted list of article URLs.

use crate::url::{normalize, NormalizedUrl};
use crate::{MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// Everything discovery learned about the site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteMap {
    pub visited: BTreeSet<NormalizedUrl>,
    pub articles: BTreeSet<NormalizedUrl>,
    /// Breadcrumb trail recorded for each page that had one
    pub category_structure: BTreeMap<NormalizedUrl, Vec<String>>,
}

/// On-disk layout of `site_map.json`
#[derive(Debug, Serialize, Deserialize)]
struct SiteMapFile {
    total_articles: usize,
    total_pages_visited: usize,
    articles: Vec<String>,
    category_structure: BTreeMap<String, Vec<String>>,
}

impl SiteMap {
    /// Writes the JSON site map and the newline-delimited article list
    pub fn save(&self, site_map_path: &Path, article_list_path: &Path) -> Result<()> {
        for path in [site_map_path, article_list_path] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = SiteMapFile {
            total_articles: self.articles.len(),
            total_pages_visited: self.visited.len(),
            articles: self.articles.iter().map(|u| u.to_string()).collect(),
            category_structure: self
                .category_structure
                .iter()
                .map(|(url, crumbs)| (url.to_string(), crumbs.clone()))
                .collect(),
        };
        fs::write(site_map_path, serde_json::to_string_pretty(&file)?)?;
        info!("Site map saved to: {}", site_map_path.display());

        let list: String = self
            .articles
            .iter()
            .map(|url| format!("{}\n", url))
            .collect();
        fs::write(article_list_path, list)?;
        info!("Article URLs saved to: {}", article_list_path.display());

        Ok(())
    }

    /// Reads a site map written by [`SiteMap::save`]
    ///
    /// The visited set is not persisted, only its size, so it comes back empty.
    pub fn load(site_map_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(site_map_path)?;
        let file: SiteMapFile = serde_json::from_str(&content)?;

        let articles = file
            .articles
            .iter()
            .map(|url| parse_url(url))
            .collect::<Result<BTreeSet<_>>>()?;

        let category_structure = file
            .category_structure
            .into_iter()
            .map(|(url, crumbs)| Ok((parse_url(&url)?, crumbs)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        info!(
            "Loaded site map from {}: {} articles, {} pages visited",
            site_map_path.display(),
            articles.len(),
            file.total_pages_visited
        );

        Ok(Self {
            visited: BTreeSet::new(),
            articles,
            category_structure,
        })
    }
}

fn parse_url(url: &str) -> Result<NormalizedUrl> {
    normalize(url, None)
        .map_err(|e| MirrorError::SiteMap(format!("invalid URL '{}': {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn url(s: &str) -> NormalizedUrl {
        normalize(s, None).unwrap()
    }

    fn sample() -> SiteMap {
        let mut map = SiteMap::default();
        map.visited.insert(url("https://support.haltech.com/portal/en/kb/haltech"));
        map.visited.insert(url("https://support.haltech.com/portal/en/kb/haltech/elite"));
        map.articles.insert(url("https://support.haltech.com/portal/en/kb/articles/b"));
        map.articles.insert(url("https://support.haltech.com/portal/en/kb/articles/a"));
        map.category_structure.insert(
            url("https://support.haltech.com/portal/en/kb/haltech/elite"),
            vec!["Knowledge Base".to_string(), "Elite".to_string()],
        );
        map
    }

    #[test]
    fn test_save_writes_json_and_list() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("logs/site_map.json");
        let list_path = dir.path().join("logs/article_urls.txt");

        sample().save(&json_path, &list_path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["total_articles"], 2);
        assert_eq!(json["total_pages_visited"], 2);
        assert_eq!(
            json["articles"][0],
            "https://support.haltech.com/portal/en/kb/articles/a"
        );
        assert_eq!(
            json["category_structure"]["https://support.haltech.com/portal/en/kb/haltech/elite"][1],
            "Elite"
        );

        assert_eq!(
            fs::read_to_string(&list_path).unwrap(),
            "https://support.haltech.com/portal/en/kb/articles/a\nhttps://support.haltech.com/portal/en/kb/articles/b\n"
        );
    }

    #[test]
    fn test_load_restores_articles() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("site_map.json");
        let original = sample();
        original
            .save(&json_path, &dir.path().join("article_urls.txt"))
            .unwrap();

        let loaded = SiteMap::load(&json_path).unwrap();
        assert_eq!(loaded.articles, original.articles);
        assert_eq!(loaded.category_structure, original.category_structure);
        assert!(loaded.visited.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = SiteMap::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(MirrorError::Io(_))));
    }

    #[test]
    fn test_load_rejects_bad_urls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site_map.json");
        fs::write(
            &path,
            r#"{"total_articles":1,"total_pages_visited":1,"articles":["ftp://x/y"],"category_structure":{}}"#,
        )
        .unwrap();

        assert!(matches!(SiteMap::load(&path), Err(MirrorError::SiteMap(_))));
    }
}
