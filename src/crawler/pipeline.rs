//! Per-article workflow: fetch, extract, convert, place, rehost, write

use crate::classify::{title_case, ROOT_LABELS};
use crate::config::Config;
use crate::convert::convert;
use crate::crawler::renderer::{BrowsingContext, ImageFetcher, PageRenderer};
use crate::extract::{clean_content, is_empty_content, ArticleDocument, Extractor};
use crate::output::{resolve_path, FrontMatter, ImageRehoster, OutputArtifact, OutputLocation};
use crate::state::ArticleState;
use crate::url::NormalizedUrl;
use crate::PipelineError;
use chrono::Local;
use std::path::PathBuf;
use tracing::{debug, info};

/// Runs one attempt of the article workflow
pub struct ArticlePipeline<'a> {
    config: &'a Config,
    renderer: &'a dyn PageRenderer,
    fetcher: &'a dyn ImageFetcher,
    extractor: Extractor,
}

impl<'a> ArticlePipeline<'a> {
    pub fn new(
        config: &'a Config,
        renderer: &'a dyn PageRenderer,
        fetcher: &'a dyn ImageFetcher,
    ) -> Self {
        Self {
            config,
            renderer,
            fetcher,
            extractor: Extractor::new(&config.site.site_name),
        }
    }

    /// Processes `url` in a fresh browsing context and returns the written path
    ///
    /// `attempt` is zero-based and scales the navigation timeout. Every state
    /// entered after `Fetching` is reported through `report`. The browsing
    /// context is closed whatever the outcome.
    pub async fn run(
        &self,
        url: &NormalizedUrl,
        attempt: u32,
        report: &(dyn Fn(ArticleState) + Sync),
    ) -> Result<PathBuf, PipelineError> {
        let mut context = self.renderer.open_context().await?;
        let result = self.process(context.as_mut(), url, attempt, report).await;
        context.close().await;
        result
    }

    async fn process(
        &self,
        context: &mut dyn BrowsingContext,
        url: &NormalizedUrl,
        attempt: u32,
        report: &(dyn Fn(ArticleState) + Sync),
    ) -> Result<PathBuf, PipelineError> {
        info!("Scraping: {}", url);
        let timeout = self.config.crawler.navigation_timeout(attempt);
        let markup = context.navigate(url.as_str(), timeout).await?;

        report(ArticleState::Extracting);
        let document = self.extractor.extract(&markup, url.as_str());
        if is_empty_content(&document.content_html) {
            return Err(PipelineError::Extraction);
        }

        report(ArticleState::Converting);
        let markdown = convert(&clean_content(&document.content_html), url.as_str());
        if markdown.trim().is_empty() {
            return Err(PipelineError::Conversion);
        }

        let output = &self.config.output;
        let location = resolve_path(
            url.as_str(),
            &document.title,
            &markdown,
            &document.breadcrumbs,
            &self.config.site.path_prefixes,
            output.max_filename_length,
        );
        debug!("Resolved {} to {}", url, location.directory().display());

        let markdown = if output.download_images && !document.images.is_empty() {
            report(ArticleState::ImageProcessing);
            let images_path = output.images_path();
            ImageRehoster::new(
                self.fetcher,
                &images_path,
                &output.images_dir,
                self.config.crawler.image_timeout(),
            )
            .rehost(&markdown, &document.images, url.as_str(), location.depth())
            .await
        } else {
            markdown
        };

        report(ArticleState::Writing);
        let artifact = OutputArtifact {
            directory: location.directory(),
            filename: location.filename.clone(),
            front_matter: front_matter(&document, &location),
            markdown_body: markdown,
        };
        let path = artifact.write(&output.output_dir).await?;
        info!("Saved: {}", path.display());

        Ok(path)
    }
}

/// Front matter for a document placed at `location`
///
/// Category and subcategory are the first two levels below the root labels,
/// taken from the page breadcrumbs when they carry navigation context and
/// from the resolved directories otherwise.
fn front_matter(document: &ArticleDocument, location: &OutputLocation) -> FrontMatter {
    let levels: Vec<String> = if document.breadcrumbs.len() > ROOT_LABELS.len() {
        document.breadcrumbs[ROOT_LABELS.len()..].to_vec()
    } else {
        location
            .directories
            .iter()
            .map(|dir| title_case(&dir.replace('-', " ")))
            .collect()
    };

    FrontMatter {
        title: document.title.clone(),
        url: document.url.clone(),
        date_scraped: Local::now().date_naive(),
        category: levels.first().cloned(),
        subcategory: levels.get(1).cloned(),
    }
}
