//! `reqwest`-backed fetcher.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use super::protocols::{FetchResult, Fetcher};
use crate::config::FetchConfig;
use crate::errors::NavigationError;

/// Fetches pages over HTTP with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, NavigationError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| NavigationError::network("<client>", e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<FetchResult, NavigationError> {
        let start = Instant::now();

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| NavigationError::network(url, e.to_string()))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let response_headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let content_type = response_headers.get("content-type").cloned();

        let text = response
            .text()
            .await
            .map_err(|e| NavigationError::network(url, e.to_string()))?;

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(url, status_code, duration_ms, "Fetched page");

        Ok(FetchResult {
            status_code,
            headers: response_headers,
            text,
            final_url,
            content_type,
            duration_ms,
        })
    }
}
