//! Page and image fetching
//!
//! A single fetch contract covers both the tile's landing page and the icon
//! image it points at: GET with an identifying user agent and an explicit
//! timeout, returning raw bytes on any 2xx response and a typed
//! [`FetchError`] otherwise. The trait boundary lets tests substitute a
//! scripted fetcher for the real HTTP client.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetch contract shared by page and image retrieval.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`, returning the raw response body on any 2xx status.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// reqwest-backed implementation of [`PageFetcher`]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build an HTTP fetcher with the given identifying user agent and
    /// per-request timeout. A timeout is mandatory; without one a stalled
    /// host would stall the whole resolution pass.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                cause: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_request_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn map_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidUrl(url.to_string())
    } else {
        FetchError::Network {
            url: url.to_string(),
            cause: error.to_string(),
        }
    }
}
