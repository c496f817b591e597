//! Fragment retrieval: one GET per attempt, raced against cancellation.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::UpdateError,
    protocol::{
        DEFAULT_PARTIAL_PARAM, DEFAULT_PARTIAL_VALUE, REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE,
    },
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::query::QueryParams;

/// Query parameter asking the server for the fragment instead of the full page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialMarker {
    pub param: String,
    pub value: String,
}

impl Default for PartialMarker {
    fn default() -> Self {
        Self {
            param: DEFAULT_PARTIAL_PARAM.to_string(),
            value: DEFAULT_PARTIAL_VALUE.to_string(),
        }
    }
}

impl PartialMarker {
    pub fn apply(&self, url: &Url) -> Url {
        let mut params = QueryParams::from_url(url);
        params.set(&self.param, self.value.clone());
        params.apply_to(url)
    }

    /// Canonical page URL, as it may appear in history.
    pub fn strip(&self, url: &Url) -> Url {
        let mut params = QueryParams::from_url(url);
        if params.get(&self.param).is_none() {
            return url.clone();
        }
        params.remove(&self.param);
        params.apply_to(url)
    }
}

#[async_trait]
pub trait FragmentTransport: Send + Sync {
    /// Body text on 2xx; `Remote` for other statuses, `Transport` otherwise.
    async fn get(&self, url: &Url) -> Result<String, UpdateError>;
}

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Client with a cookie store so same-origin session cookies are sent.
    pub fn new() -> reqwest::Result<Self> {
        let http = Client::builder().cookie_store(true).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl FragmentTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String, UpdateError> {
        let response = self
            .http
            .get(url.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
            .send()
            .await
            .map_err(|err| UpdateError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::Remote {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|err| UpdateError::Transport(err.to_string()))
    }
}

pub struct FragmentFetcher {
    transport: Arc<dyn FragmentTransport>,
    marker: PartialMarker,
    retries: u32,
}

impl FragmentFetcher {
    pub fn new(transport: Arc<dyn FragmentTransport>, marker: PartialMarker) -> Self {
        Self {
            transport,
            marker,
            retries: 0,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn marker(&self) -> &PartialMarker {
        &self.marker
    }

    /// Fetches the fragment for the canonical `url`. Once `cancel` fires the
    /// result is always `Cancelled`, even if the transport already finished.
    pub async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Result<String, UpdateError> {
        let request_url = self.marker.apply(url);
        let mut attempt = 0;
        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(UpdateError::Cancelled),
                result = self.transport.get(&request_url) => result,
            };

            if cancel.is_cancelled() {
                return Err(UpdateError::Cancelled);
            }

            match result {
                Err(err) if err.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(url = %request_url, attempt, error = %err, "fragment fetch failed; retrying");
                }
                Ok(markup) => {
                    debug!(url = %request_url, bytes = markup.len(), "fragment fetched");
                    return Ok(markup);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
