//! HTTP fetch seam used by discovery and capability extraction.
//!
//! All remote calls go through [`HttpFetch`] so the probing logic can be
//! exercised against scripted responses in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use ogc_common::{OgcError, OgcResult};

/// A fetched text response: status plus body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Bounded-timeout HTTP GET returning text.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_text(&self, url: &str) -> OgcResult<FetchResponse>;
}

/// Production fetcher backed by a shared reqwest client.
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Build a fetcher with the given per-request timeout.
    pub fn new(timeout: Duration) -> OgcResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| OgcError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Default 30-second timeout.
    pub fn with_default_timeout() -> OgcResult<Self> {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> OgcResult<FetchResponse> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                OgcError::Timeout
            } else {
                OgcError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| OgcError::Transport {
            url: url.to_string(),
            message: format!("failed to read body: {}", e),
        })?;

        Ok(FetchResponse { status, body })
    }
}
