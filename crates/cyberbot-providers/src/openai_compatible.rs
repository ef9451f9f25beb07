//! OpenAI-compatible chat-completion provider.
//!
//! Sends a fixed system prompt plus the single user message; no history,
//! no tools. Works against any endpoint speaking the `/chat/completions`
//! dialect.

use async_trait::async_trait;
use cyberbot_core::config::ChatConfig;
use cyberbot_core::error::{CyberBotError, Result};
use cyberbot_core::traits::ChatProvider;
use serde_json::{Value, json};
use std::time::Duration;

pub struct OpenAiCompatibleProvider {
    name: String,
    api_key: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    base_url: String,
    model: String,
    temperature: f32,
    system_prompt: String,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn from_config(config: &ChatConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CyberBotError::Http(format!("HTTP client error: {e}")))?;

        Ok(Self {
            name: "openai".to_string(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            client,
        })
    }

    fn request_body(&self, message: &str) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": message },
            ],
        })
    }
}

/// Pull `choices[0].message.content` out of a completion response.
pub fn extract_content(json: &Value) -> Result<String> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| CyberBotError::Provider("No choices in response".into()))?;
    choice["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CyberBotError::Provider("Empty message content in response".into()))
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply(&self, message: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(CyberBotError::ApiKeyMissing(self.name.clone()));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body(message))
            .send()
            .await
            .map_err(|e| {
                CyberBotError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CyberBotError::Provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| CyberBotError::Http(e.to_string()))?;
        let content = extract_content(&json)?;
        tracing::debug!("💬 {} replied ({} chars)", self.name, content.len());
        Ok(content)
    }
}
