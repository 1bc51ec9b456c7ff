//! Content fetching from URLs, files, and stdin.
//!
//! Orchestration code talks to the network through the [`Fetcher`] trait so
//! that it can run against an in-memory source in tests. [`HttpFetcher`] is
//! the reqwest-backed implementation.

use std::fs;
use std::future::Future;
use std::path::PathBuf;

use serde::Deserialize;

use crate::{Result, SitecarveError};

/// Desktop browser User-Agent. Some hosts serve reduced markup to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// Source of remote documents and assets.
pub trait Fetcher {
    /// Fetches `url` and returns the body decoded as text.
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>> + Send;

    /// Fetches `url` and returns the raw body.
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[cfg(feature = "fetch")]
pub use http::{HttpFetcher, fetch_url};

#[cfg(feature = "fetch")]
mod http {
    use std::time::Duration;

    use reqwest::{Client, Response};
    use tracing::debug;
    use url::Url;

    use super::{FetchConfig, Fetcher};
    use crate::{Result, SitecarveError};

    /// [`Fetcher`] backed by a shared reqwest client.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: Client,
        timeout: u64,
    }

    impl HttpFetcher {
        pub fn new(config: &FetchConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.timeout))
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(SitecarveError::HttpError)?;

            Ok(Self { client, timeout: config.timeout })
        }

        async fn get(&self, url: &str) -> Result<Response> {
            let parsed_url = Url::parse(url).map_err(|e| SitecarveError::InvalidUrl(format!("{url}: {e}")))?;
            debug!(%url, "GET");

            let response = self
                .client
                .get(parsed_url)
                .header(
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/*;q=0.8,*/*;q=0.7",
                )
                .header("Accept-Language", "en-US,en;q=0.9")
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        SitecarveError::Timeout { timeout: self.timeout }
                    } else {
                        SitecarveError::HttpError(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(SitecarveError::HttpStatus { url: url.to_string(), status: status.as_u16() });
            }

            Ok(response)
        }
    }

    impl Fetcher for HttpFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            Ok(self.get(url).await?.text().await?)
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            Ok(self.get(url).await?.bytes().await?.to_vec())
        }
    }

    /// Fetches HTML content from a URL with a one-off client.
    pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
        HttpFetcher::new(config)?.fetch_text(url).await
    }
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(SitecarveError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(SitecarveError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(SitecarveError::from)?;

    Ok(buffer)
}
