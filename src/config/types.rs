use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for kb-mirror
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// defaults for the Haltech support knowledge base.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// The knowledge base being mirrored
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site root, used as the base for relative references
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Seed URL for discovery
    #[serde(rename = "kb-url")]
    pub kb_url: String,

    /// Host every in-scope URL must have
    #[serde(rename = "target-domain")]
    pub target_domain: String,

    /// Display name; also stripped as a suffix from `<title>` text
    #[serde(rename = "site-name")]
    pub site_name: String,

    /// Case-insensitive substrings that exclude a URL path from the crawl
    #[serde(rename = "exclude-patterns")]
    pub exclude_patterns: Vec<String>,

    /// Leading path fragments removed before URL segments become directories
    #[serde(rename = "path-prefixes")]
    pub path_prefixes: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://support.haltech.com".to_string(),
            kb_url: "https://support.haltech.com/portal/en/kb/haltech".to_string(),
            target_domain: "support.haltech.com".to_string(),
            site_name: "Haltech".to_string(),
            exclude_patterns: vec![
                "login".to_string(),
                "signup".to_string(),
                "account".to_string(),
                "portal/api".to_string(),
            ],
            path_prefixes: vec![
                "portal/en/kb/haltech/".to_string(),
                "portal/kb/".to_string(),
                "kb/".to_string(),
            ],
        }
    }
}

/// Crawl and scrape behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth followed from the seed during discovery
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of article pipelines allowed in flight at once
    pub concurrency: u32,

    /// Pause after each article pipeline releases its permit (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Retries after the first attempt before an article is marked failed
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base page navigation timeout, scaled by attempt number (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Wait between a failed attempt and the next one (milliseconds)
    #[serde(rename = "retry-cooldown-ms")]
    pub retry_cooldown_ms: u64,

    /// Timeout for a single image download (milliseconds)
    #[serde(rename = "image-timeout-ms")]
    pub image_timeout_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            concurrency: 3,
            request_delay_ms: 1500,
            max_retries: 3,
            navigation_timeout_ms: 30_000,
            retry_cooldown_ms: 2000,
            image_timeout_ms: 30_000,
        }
    }
}

impl CrawlerConfig {
    /// Navigation timeout for a zero-based attempt number
    pub fn navigation_timeout(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms.saturating_mul(u64::from(attempt) + 1))
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_cooldown(&self) -> Duration {
        Duration::from_millis(self.retry_cooldown_ms)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }
}

/// User agent sent with page and image requests
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the Markdown tree
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Where the site map, URL lists and failed list are written
    #[serde(rename = "logs-dir")]
    pub logs_dir: PathBuf,

    /// Name of the shared image directory directly below `output_dir`
    #[serde(rename = "images-dir")]
    pub images_dir: String,

    /// Whether referenced images are downloaded and rehosted
    #[serde(rename = "download-images")]
    pub download_images: bool,

    /// Upper bound for generated file name stems
    #[serde(rename = "max-filename-length")]
    pub max_filename_length: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            logs_dir: PathBuf::from("logs"),
            images_dir: "images".to_string(),
            download_images: true,
            max_filename_length: 200,
        }
    }
}

impl OutputConfig {
    /// Absolute-or-relative path of the shared image directory
    pub fn images_path(&self) -> PathBuf {
        self.output_dir.join(&self.images_dir)
    }

    pub fn site_map_path(&self) -> PathBuf {
        self.logs_dir.join("site_map.json")
    }

    pub fn article_list_path(&self) -> PathBuf {
        self.logs_dir.join("article_urls.txt")
    }

    pub fn failed_list_path(&self) -> PathBuf {
        self.logs_dir.join("failed_urls.txt")
    }
}
