use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::{LinkError, Result};

/// Retrieves the raw markup of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return the body text. Fails on network errors and non-2xx statuses.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher with a per-request timeout
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(LinkError::UpstreamStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!("📄 Downloaded {} characters from {}", body.len(), url);
        Ok(body)
    }
}
