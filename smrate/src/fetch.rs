//! Fetch capability injected into the engine.
//!
//! The engine never talks to the network directly; it is handed a
//! [`PageFetcher`] implementation. This abstraction allows for dependency
//! injection and easier testing by enabling scripted fetchers in tests.

use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use tracing::{trace, warn};

/// Default per-request timeout. A stalled request fails its pipeline stage
/// rather than hanging the entity in `Retrieving` forever.
const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Default User-Agent string. The ratings site rejects requests without one.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Errors from the fetch boundary.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport failure, non-success status, or unreadable body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body was not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
}

/// Asynchronous fetch-and-parse capability.
///
/// Implementations fetch a URL and return either the document text or the
/// parsed JSON body. Both calls are single-attempt; retry policy is
/// deliberately not part of this boundary.
pub trait PageFetcher: Send + Sync {
    /// Fetches a URL and returns the response body as document text.
    fn fetch_document(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Fetches a URL and parses the response body as JSON.
    fn fetch_json(&self, url: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Production fetcher backed by a pooled `reqwest` client.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher with the default 30 s timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a fetcher with a custom per-request timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        trace!(url, "HTTP GET starting");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Http(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(url, status = response.status().as_u16(), "HTTP error status");
            return Err(FetchError::Http(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(format!("failed to read response: {}", e)))?;

        trace!(url, bytes = body.len(), "HTTP response body read");
        Ok(body)
    }
}

impl PageFetcher for ReqwestFetcher {
    async fn fetch_document(&self, url: &str) -> Result<String, FetchError> {
        self.get_text(url).await
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let body = self.get_text(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::InvalidJson(e.to_string()))
    }
}
