//! Page client for feed mirrors
//!
//! With a scraping-backend key configured, every mirror request is proxied
//! through the metered backend (`?api_key=..&url=..`). Without one, mirrors
//! are fetched directly.

use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use super::fallback::PageSource;
use crate::utils::constants::USER_AGENT as USER_AGENT_CONST;

pub struct ScrapeClient {
    client: reqwest::Client,
    backend_url: String,
    api_key: Option<String>,
}

impl ScrapeClient {
    pub fn new(backend_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            backend_url: backend_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn is_metered(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl PageSource for ScrapeClient {
    async fn get_page(&self, url: &str) -> Result<String> {
        let request = match &self.api_key {
            Some(key) => {
                debug!("🕸️ Scrape backend → {}", url);
                self.client
                    .get(&self.backend_url)
                    .query(&[("api_key", key.as_str()), ("url", url)])
            }
            None => {
                debug!("🕸️ Direct fetch → {}", url);
                self.client.get(url)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| eyre!("Request failed: {}", e))?;

        let status = response.status();
        if status == 429 {
            return Err(eyre!("Rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(eyre!("HTTP error: {}", status));
        }

        response
            .text()
            .await
            .map_err(|e| eyre!("Failed to read body: {}", e))
    }
}
