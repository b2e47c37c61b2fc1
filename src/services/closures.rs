// src/services/closures.rs

//! HTTP client for the National Highways closures feed.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;

use crate::error::{AppError, Result};
use crate::models::FeedConfig;
use crate::utils::http;

use super::ClosureSource;

/// Header carrying the feed subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

const SOURCE_NAME: &str = "National Highways closures feed";

/// Fetches the raw DATEX closures payload.
pub struct ClosureFeedClient {
    client: Client,
    url: String,
    api_key: String,
}

impl ClosureFeedClient {
    /// Build a client from configuration, resolving the API key.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = http::create_client(config)?;
        Ok(Self::with_client(client, &config.url, api_key))
    }

    /// Build from an existing HTTP client.
    pub fn with_client(client: Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for ClosureFeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureFeedClient")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ClosureSource for ClosureFeedClient {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_payload(&self) -> Result<String> {
        log::debug!("Fetching closures from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/xml")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Closures feed returned HTTP {}", status.as_u16());
            return Err(AppError::feed(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(AppError::empty_response(SOURCE_NAME));
        }

        log::debug!("Received {} bytes from closures feed", body.len());
        Ok(body)
    }
}
