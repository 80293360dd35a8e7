//! Image rehosting
//!
//! Downloads the images a document references into the shared image directory
//! and points the Markdown at the local copies. Relative paths depend on how
//! deep the document sits below the output root.

use crate::crawler::ImageFetcher;
use crate::extract::ImageRef;
use crate::output::path::clean_filename;
use crate::url::{normalize, url_basename};
use crate::ImageError;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Extensions accepted as-is; anything else gets `.jpg` appended
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

/// An image saved for the current document
struct SavedImage {
    relative_path: String,
    alt: String,
    title: String,
}

/// Downloads images and rewrites references for one document at a time
pub struct ImageRehoster<'a> {
    fetcher: &'a dyn ImageFetcher,
    images_dir: &'a Path,
    images_dir_name: &'a str,
    timeout: Duration,
}

impl<'a> ImageRehoster<'a> {
    /// Creates a rehoster writing into `images_dir`, which is referenced from
    /// documents as `images_dir_name` directly below the output root
    pub fn new(
        fetcher: &'a dyn ImageFetcher,
        images_dir: &'a Path,
        images_dir_name: &'a str,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            images_dir,
            images_dir_name,
            timeout,
        }
    }

    /// Rehosts every image of a document and returns the rewritten Markdown
    ///
    /// `document_depth` is the number of directories between the document and
    /// the output root. A failed download is logged and skipped. Images that
    /// were saved but are not referenced anywhere afterwards are appended to
    /// the end of the document.
    pub async fn rehost(
        &self,
        markdown: &str,
        images: &[ImageRef],
        article_url: &str,
        document_depth: usize,
    ) -> String {
        let mut markdown = markdown.to_string();
        let mut saved: Vec<SavedImage> = Vec::new();
        let mut filenames: HashMap<String, String> = HashMap::new();

        if !images.is_empty() {
            if let Err(e) = tokio::fs::create_dir_all(self.images_dir).await {
                warn!(
                    "Cannot create image directory {}: {}",
                    self.images_dir.display(),
                    e
                );
                return markdown;
            }
        }

        for (index, image) in images.iter().enumerate() {
            let absolute = match normalize(&image.src, Some(article_url)) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Skipping image '{}': {}", image.src, e);
                    continue;
                }
            };

            let filename = match filenames.get(absolute.as_str()) {
                Some(filename) => filename.clone(),
                None => {
                    let filename = match self.download(absolute.as_str(), index).await {
                        Ok(filename) => filename,
                        Err(e) => {
                            warn!("Failed to download image {}: {}", absolute, e);
                            continue;
                        }
                    };
                    filenames.insert(absolute.to_string(), filename.clone());
                    saved.push(SavedImage {
                        relative_path: relative_image_path(
                            document_depth,
                            self.images_dir_name,
                            &filename,
                        ),
                        alt: image.alt.clone(),
                        title: image.title.clone(),
                    });
                    filename
                }
            };

            let relative = relative_image_path(document_depth, self.images_dir_name, &filename);
            let candidates = source_candidates(&image.src, article_url, absolute.as_str());
            markdown = rewrite_references(&markdown, &candidates, &relative);
        }

        for image in &saved {
            if !markdown.contains(&image.relative_path) {
                debug!("Appending unreferenced image {}", image.relative_path);
                markdown.push_str("\n\n");
                markdown.push_str(&markdown_image(&image.alt, &image.relative_path, &image.title));
            }
        }

        markdown
    }

    /// Fetches one image and stores it under its local file name
    async fn download(&self, url: &str, index: usize) -> Result<String, ImageError> {
        let bytes = match self.fetcher.fetch(url, self.timeout).await? {
            (200, bytes) => bytes,
            (status, _) => return Err(ImageError::Http(status)),
        };

        let filename = image_filename(url, index);
        if self.store(&filename, &bytes).await? {
            warn!(
                "Image {} replaced a different image saved as {}",
                url, filename
            );
        }

        debug!("Downloaded image: {}", filename);
        Ok(filename)
    }

    /// Writes `bytes` as `filename`, returning true when a file with
    /// different content was already there
    async fn store(&self, filename: &str, bytes: &[u8]) -> Result<bool, ImageError> {
        let path = self.images_dir.join(filename);
        let clobbered = match tokio::fs::read(&path).await {
            Ok(existing) => existing != bytes,
            Err(_) => false,
        };
        tokio::fs::write(&path, bytes).await?;
        Ok(clobbered)
    }
}

/// Path from a document `depth` levels below the output root to a shared image
///
/// # Examples
///
/// ```
/// use kb_mirror::output::relative_image_path;
///
/// assert_eq!(relative_image_path(3, "images", "diagram.png"), "../../../images/diagram.png");
/// assert_eq!(relative_image_path(0, "images", "diagram.png"), "images/diagram.png");
/// ```
pub fn relative_image_path(depth: usize, images_dir_name: &str, filename: &str) -> String {
    format!("{}{}/{}", "../".repeat(depth), images_dir_name, filename)
}

/// Local file name for an image URL
///
/// The URL basename, or `image_<index>` when there is none, with `.jpg`
/// appended unless a known image extension is present.
pub fn image_filename(url: &str, index: usize) -> String {
    let basename = clean_filename(&url_basename(url));
    let name = if basename.is_empty() {
        format!("image_{}", index)
    } else {
        basename
    };

    let lower = name.to_lowercase();
    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        name
    } else {
        format!("{}.jpg", name)
    }
}

/// Spellings under which an image source may appear in the Markdown,
/// longest first
fn source_candidates(src: &str, article_url: &str, normalized: &str) -> Vec<String> {
    let joined = Url::parse(article_url)
        .and_then(|base| base.join(src.trim()))
        .map(String::from)
        .ok();

    let mut candidates: Vec<String> = Vec::new();
    for candidate in joined
        .into_iter()
        .chain([normalized.to_string(), src.trim().to_string()])
    {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates.sort_by_key(|c| std::cmp::Reverse(c.len()));
    candidates
}

/// Points references to any of `candidates` at `relative`
///
/// Markdown image syntax is rewritten first, then any remaining raw
/// occurrence of a source, such as a plain link to the full-size image.
fn rewrite_references(markdown: &str, candidates: &[String], relative: &str) -> String {
    let mut text = markdown.to_string();

    for candidate in candidates {
        let pattern = format!(r#"!\[([^\]]*)\]\({}(\s+"[^"]*")?\)"#, regex::escape(candidate));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        if re.is_match(&text) {
            text = re
                .replace_all(&text, |caps: &Captures<'_>| {
                    format!(
                        "![{}]({}{})",
                        &caps[1],
                        relative,
                        caps.get(2).map_or("", |m| m.as_str())
                    )
                })
                .into_owned();
        }
    }

    for candidate in candidates {
        if !relative.contains(candidate.as_str()) && text.contains(candidate.as_str()) {
            text = text.replace(candidate.as_str(), relative);
        }
    }

    text
}

fn markdown_image(alt: &str, path: &str, title: &str) -> String {
    if title.is_empty() {
        format!("![{}]({})", alt, path)
    } else {
        format!("![{}]({} \"{}\")", alt, path, title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const ARTICLE: &str = "https://support.haltech.com/portal/en/kb/articles/rb26-wiring-guide";

    struct MockFetcher {
        responses: HashMap<String, u16>,
        requested: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn new(responses: &[(&str, u16)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(url, status)| (url.to_string(), *status))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageFetcher for MockFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<(u16, Vec<u8>), ImageError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(status) => Ok((*status, b"bytes".to_vec())),
                None => Err(ImageError::Transport(format!("no route to {}", url))),
            }
        }
    }

    fn image(src: &str, alt: &str, title: &str) -> ImageRef {
        ImageRef {
            src: src.to_string(),
            alt: alt.to_string(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_rewrites_to_depth_relative_path() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join("images");
        let fetcher = MockFetcher::new(&[("https://support.haltech.com/img/diagram.png", 200)]);
        let rehoster = ImageRehoster::new(&fetcher, &images_dir, "images", Duration::from_secs(5));

        let markdown = "Intro\n\n![Diagram](https://support.haltech.com/img/diagram.png \"Pinout\")";
        let result = rehoster
            .rehost(markdown, &[image("/img/diagram.png", "Diagram", "Pinout")], ARTICLE, 3)
            .await;

        assert_eq!(result, "Intro\n\n![Diagram](../../../images/diagram.png \"Pinout\")");
        assert!(images_dir.join("diagram.png").exists());
    }

    #[tokio::test]
    async fn test_failed_download_is_skipped() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join("images");
        let fetcher = MockFetcher::new(&[("https://support.haltech.com/img/missing.png", 404)]);
        let rehoster = ImageRehoster::new(&fetcher, &images_dir, "images", Duration::from_secs(5));

        let markdown = "![x](https://support.haltech.com/img/missing.png)";
        let result = rehoster
            .rehost(
                markdown,
                &[
                    image("/img/missing.png", "x", ""),
                    image("/img/unreachable.png", "y", ""),
                ],
                ARTICLE,
                1,
            )
            .await;

        assert_eq!(result, markdown);
        assert!(!images_dir.join("missing.png").exists());
    }

    #[tokio::test]
    async fn test_unreferenced_image_appended() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join("images");
        let fetcher = MockFetcher::new(&[("https://support.haltech.com/img/logo.png", 200)]);
        let rehoster = ImageRehoster::new(&fetcher, &images_dir, "images", Duration::from_secs(5));

        let result = rehoster
            .rehost("Body text", &[image("/img/logo.png", "Logo", "Brand")], ARTICLE, 0)
            .await;

        assert_eq!(result, "Body text\n\n![Logo](images/logo.png \"Brand\")");
    }

    #[tokio::test]
    async fn test_raw_reference_fallback() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join("images");
        let fetcher = MockFetcher::new(&[("https://support.haltech.com/img/a.png", 200)]);
        let rehoster = ImageRehoster::new(&fetcher, &images_dir, "images", Duration::from_secs(5));

        let result = rehoster
            .rehost(
                "[full size](https://support.haltech.com/img/a.png)",
                &[image("/img/a.png", "", "")],
                ARTICLE,
                2,
            )
            .await;

        assert_eq!(result, "[full size](../../images/a.png)");
    }

    #[tokio::test]
    async fn test_repeated_image_downloaded_once() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join("images");
        let fetcher = MockFetcher::new(&[("https://support.haltech.com/img/a.png", 200)]);
        let rehoster = ImageRehoster::new(&fetcher, &images_dir, "images", Duration::from_secs(5));

        let markdown = "![a](https://support.haltech.com/img/a.png)\n\n![a](https://support.haltech.com/img/a.png)";
        let result = rehoster
            .rehost(
                markdown,
                &[image("/img/a.png", "a", ""), image("/img/a.png", "a", "")],
                ARTICLE,
                1,
            )
            .await;

        assert_eq!(result, "![a](../images/a.png)\n\n![a](../images/a.png)");
        assert_eq!(fetcher.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_link_to_rehosted_image_rewritten() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().join("images");
        let fetcher = MockFetcher::new(&[("https://support.haltech.com/img/a.png", 200)]);
        let rehoster = ImageRehoster::new(&fetcher, &images_dir, "images", Duration::from_secs(5));

        let markdown = "![Diagram](https://support.haltech.com/img/a.png)\n\n[Full size](https://support.haltech.com/img/a.png)";
        let result = rehoster
            .rehost(markdown, &[image("/img/a.png", "Diagram", "")], ARTICLE, 1)
            .await;

        assert_eq!(
            result,
            "![Diagram](../images/a.png)\n\n[Full size](../images/a.png)"
        );
    }

    #[tokio::test]
    async fn test_store_reports_replaced_content() {
        let dir = TempDir::new().unwrap();
        let images_dir = dir.path().to_path_buf();
        let fetcher = MockFetcher::new(&[]);
        let rehoster = ImageRehoster::new(&fetcher, &images_dir, "images", Duration::from_secs(5));

        assert!(!rehoster.store("a.png", b"first").await.unwrap());
        assert!(!rehoster.store("a.png", b"first").await.unwrap());
        assert!(rehoster.store("a.png", b"second").await.unwrap());
        assert_eq!(std::fs::read(images_dir.join("a.png")).unwrap(), b"second");
    }

    #[test]
    fn test_image_filename() {
        assert_eq!(image_filename("https://x.test/img/diagram.png", 0), "diagram.png");
        assert_eq!(image_filename("https://x.test/img/PHOTO.JPEG", 0), "PHOTO.JPEG");
        assert_eq!(image_filename("https://x.test/img/render", 0), "render.jpg");
        assert_eq!(image_filename("https://x.test/img/", 4), "image_4.jpg");
    }

    #[test]
    fn test_relative_image_path() {
        assert_eq!(
            relative_image_path(3, "images", "diagram.png"),
            "../../../images/diagram.png"
        );
        assert_eq!(relative_image_path(1, "assets", "a.svg"), "../assets/a.svg");
    }
}
