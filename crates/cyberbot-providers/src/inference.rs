//! Hosted text-classification models (Hugging Face Inference API).
//!
//! `POST {base_url}/models/{model}` with `{"inputs": text}` answers with a
//! list of `{label, score}` candidates, sometimes wrapped in an extra list.
//! Every outcome is folded into a [`Verdict`]; this client never errors.

use async_trait::async_trait;
use cyberbot_core::config::{DetectorConfig, InferenceConfig};
use cyberbot_core::error::{CyberBotError, Result};
use cyberbot_core::traits::TextClassifier;
use cyberbot_core::types::Verdict;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

pub struct InferenceClassifier {
    name: String,
    url: String,
    api_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

impl InferenceClassifier {
    pub fn new(name: &str, config: &InferenceConfig, detector: &DetectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CyberBotError::Http(format!("HTTP client error: {e}")))?;

        Ok(Self {
            name: name.to_string(),
            url: format!(
                "{}/models/{}",
                config.base_url.trim_end_matches('/'),
                detector.model
            ),
            api_token: config.api_token.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, text: &str) -> Result<Value> {
        let resp = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| CyberBotError::Http(format!("{} request failed: {e}", self.name)))?;

        // Error bodies are still JSON (`{"error": ...}`); let the parser judge them.
        resp.json::<Value>()
            .await
            .map_err(|e| CyberBotError::Http(format!("{} response unreadable: {e}", self.name)))
    }
}

/// Interpret an inference response body.
///
/// Accepts `[{label, score}, ...]` and `[[{label, score}, ...]]`; the
/// highest-scoring candidate wins. Anything else is [`Verdict::Malformed`].
pub fn parse_verdict(body: &Value) -> Verdict {
    let candidates = match body.as_array().and_then(|outer| outer.first()) {
        Some(Value::Array(inner)) => inner.clone(),
        Some(_) => body.as_array().cloned().unwrap_or_default(),
        None => return Verdict::Malformed,
    };

    candidates
        .into_iter()
        .filter_map(|c| serde_json::from_value::<LabelScore>(c).ok())
        .filter(|c| c.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .map(|best| Verdict::Success {
            label: best.label.to_lowercase(),
            score: best.score,
        })
        .unwrap_or(Verdict::Malformed)
}

#[async_trait]
impl TextClassifier for InferenceClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, text: &str) -> Verdict {
        if self.api_token.is_empty() {
            tracing::debug!("{} classifier has no API token", self.name);
            return Verdict::Unavailable;
        }

        match self.request(text).await {
            Ok(body) => {
                let verdict = parse_verdict(&body);
                if verdict == Verdict::Malformed {
                    tracing::warn!("⚠️ {} model returned unexpected body: {body}", self.name);
                }
                verdict
            }
            Err(e) => {
                tracing::warn!("⚠️ {} detection unavailable: {e}", self.name);
                Verdict::Unavailable
            }
        }
    }
}
