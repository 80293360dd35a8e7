//! Page rendering and image fetching collaborators
//!
//! The pipeline only talks to these traits. The HTTP implementations:
//! - Build clients with the configured browser user agent
//! - Give every browsing context its own cookie store
//! - Reject responses whose Content-Type is not HTML
//! - Classify failures into timeouts, transport errors and bad statuses

use crate::config::UserAgentConfig;
use crate::{ImageError, NavigationError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Opens isolated browsing contexts on a shared rendering backend
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn open_context(&self) -> Result<Box<dyn BrowsingContext>, NavigationError>;
}

/// A single isolated browsing session
///
/// Callers must call [`BrowsingContext::close`] on every exit path.
#[async_trait]
pub trait BrowsingContext: Send {
    /// Loads `url` and returns the rendered markup
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<String, NavigationError>;

    async fn close(&mut self);
}

/// Downloads raw image bytes
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Returns the HTTP status code and the response body
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<(u16, Vec<u8>), ImageError>;
}

/// Builds an HTTP client sending the configured user agent
///
/// # Example
///
/// ```no_run
/// use kb_mirror::config::UserAgentConfig;
/// use kb_mirror::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), true).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, cookies: bool) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.value.as_str())
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(cookies)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Renders pages by fetching them over HTTP
///
/// Markup is returned as served; scripts are not executed.
pub struct HttpRenderer {
    user_agent: UserAgentConfig,
}

impl HttpRenderer {
    pub fn new(user_agent: UserAgentConfig) -> Self {
        Self { user_agent }
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn open_context(&self) -> Result<Box<dyn BrowsingContext>, NavigationError> {
        let client = build_http_client(&self.user_agent, true)
            .map_err(|e| NavigationError::Transport(e.to_string()))?;
        Ok(Box::new(HttpContext {
            client: Some(client),
        }))
    }
}

/// Browsing context backed by a client with its own cookie jar
struct HttpContext {
    client: Option<Client>,
}

#[async_trait]
impl BrowsingContext for HttpContext {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<String, NavigationError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| NavigationError::Transport("browsing context closed".to_string()))?;

        let response = client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(NavigationError::ContentMismatch(content_type));
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(e, timeout))?;
        debug!("Fetched {} ({} bytes)", url, body.len());

        Ok(body)
    }

    async fn close(&mut self) {
        self.client = None;
    }
}

fn classify_error(e: reqwest::Error, timeout: Duration) -> NavigationError {
    if e.is_timeout() {
        NavigationError::Timeout(timeout)
    } else if e.is_connect() {
        NavigationError::Transport(format!("connection failed: {}", e))
    } else {
        NavigationError::Transport(e.to_string())
    }
}

/// Fetches images over a shared HTTP client
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, false)?,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<(u16, Vec<u8>), ImageError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ImageError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Transport(e.to_string()))?;

        Ok((status, bytes.to_vec()))
    }
}
