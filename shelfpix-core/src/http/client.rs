//! HTTP client trait and implementations.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, REFERER};
use tokio::io::AsyncWriteExt;

use crate::error::FetchError;

/// Browser-identifying user agent sent with every request. Image hosts
/// routinely reject requests without one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Referer hint sent with binary downloads.
pub const DEFAULT_REFERER: &str = "https://www.google.com/";

const PAGE_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const IMAGE_ACCEPT: &str = "image/webp,image/apng,image/*,*/*;q=0.8";

/// Trait for HTTP clients, enabling mockability in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetch a page from a URL, buffered into a string.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;

    /// Download binary content from a URL, streaming it to `dest`.
    /// Returns the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for &T {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch_html(url).await
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        (**self).download(url, dest).await
    }
}

/// Configuration for WebClient.
#[derive(Clone)]
pub struct WebClientBuilder {
    timeout: Duration,
    user_agent: String,
    referer: String,
}

impl Default for WebClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
        }
    }

    /// Set the total request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Set the referer sent with downloads.
    pub fn referer(mut self, referer: String) -> Self {
        self.referer = referer;
        self
    }

    /// Build the WebClient.
    pub fn build(self) -> Result<WebClient, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()?;

        Ok(WebClient {
            inner,
            referer: self.referer,
        })
    }
}

/// Production HTTP client.
pub struct WebClient {
    inner: reqwest::Client,
    referer: String,
}

impl WebClient {
    /// Create a new WebClient with default configuration.
    pub fn new() -> Result<Self, reqwest::Error> {
        WebClientBuilder::new().build()
    }

    /// Get a builder for custom configuration.
    pub fn builder() -> WebClientBuilder {
        WebClientBuilder::new()
    }
}

#[async_trait]
impl HttpClient for WebClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!(url, "network: fetching page");
        let response = self
            .inner
            .get(parsed)
            .header(ACCEPT, PAGE_ACCEPT)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| FetchError::InvalidEncoding(format!("Invalid UTF-8 in response: {}", e)))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        tracing::debug!(url, "network: downloading");
        let response = self
            .inner
            .get(parsed)
            .header(ACCEPT, IMAGE_ACCEPT)
            .header(REFERER, &self.referer)
            .send()
            .await?
            .error_for_status()?;

        let mut stream = response.bytes_stream();
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(url, bytes = written, "network: download complete");
        Ok(written)
    }
}

/// Mock response for testing.
#[derive(Clone)]
pub enum MockResponse {
    Page(String),
    File(Vec<u8>),
    Error(String),
}

/// Mock HTTP client for testing. Records every requested URL so tests can
/// assert which network activity (if any) took place.
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    /// Create a new empty mock client.
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add a response for a URL.
    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    /// Add a page response for a URL.
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_response(url, MockResponse::Page(html.to_string()))
    }

    /// Add a binary response for a URL.
    pub fn with_file(self, url: &str, bytes: Vec<u8>) -> Self {
        self.with_response(url, MockResponse::File(bytes))
    }

    /// Add an error response for a URL.
    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.with_response(url, MockResponse::Error(error.to_string()))
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.record(url);
        match self.responses.get(url) {
            Some(MockResponse::Page(html)) => Ok(html.clone()),
            Some(MockResponse::File(bytes)) => String::from_utf8(bytes.clone())
                .map_err(|e| FetchError::InvalidEncoding(e.to_string())),
            Some(MockResponse::Error(e)) => Err(FetchError::InvalidUrl(e.clone())),
            None => Err(FetchError::InvalidUrl(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        self.record(url);
        match self.responses.get(url) {
            Some(MockResponse::Page(html)) => {
                tokio::fs::write(dest, html.as_bytes()).await?;
                Ok(html.len() as u64)
            }
            Some(MockResponse::File(bytes)) => {
                tokio::fs::write(dest, bytes).await?;
                Ok(bytes.len() as u64)
            }
            Some(MockResponse::Error(e)) => Err(FetchError::InvalidUrl(e.clone())),
            None => Err(FetchError::InvalidUrl(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}
