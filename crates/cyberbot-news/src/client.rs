//! HTTP feed client.

use async_trait::async_trait;
use cyberbot_core::error::{CyberBotError, Result};
use cyberbot_core::traits::FeedClient;
use std::time::Duration;

pub struct HttpFeedClient {
    client: reqwest::Client,
}

impl HttpFeedClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("CyberBot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CyberBotError::Http(format!("HTTP client error: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CyberBotError::Feed(format!("{url}: {e}")))?;
        if !resp.status().is_success() {
            return Err(CyberBotError::Feed(format!("{url}: HTTP {}", resp.status())));
        }
        resp.text()
            .await
            .map_err(|e| CyberBotError::Feed(format!("{url}: {e}")))
    }
}
