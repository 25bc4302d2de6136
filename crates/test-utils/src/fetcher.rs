//! Scripted [`HttpFetch`] implementation for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use ogc_common::{OgcError, OgcResult};
use ogc_discovery::{FetchResponse, HttpFetch};

/// Maps exact URLs to canned responses. URLs without a scripted response
/// fail with a transport error, like an unreachable host would.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, (u16, String)>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a 200 response for `url`.
    pub fn ok(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (200, body.to_string()));
        self
    }

    /// Script an arbitrary status for `url`.
    pub fn status(mut self, url: &str, status: u16, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), (status, body.to_string()));
        self
    }
}

#[async_trait]
impl HttpFetch for StaticFetcher {
    async fn get_text(&self, url: &str) -> OgcResult<FetchResponse> {
        match self.responses.get(url) {
            Some((status, body)) => Ok(FetchResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Err(OgcError::Transport {
                url: url.to_string(),
                message: "connection refused (no scripted response)".to_string(),
            }),
        }
    }
}
