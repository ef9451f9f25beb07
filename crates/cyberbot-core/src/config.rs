//! CyberBot configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CyberBotError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CyberBotConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl CyberBotConfig {
    /// Load config from the default path (~/.cyberbot/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CyberBotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CyberBotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the CyberBot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cyberbot")
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using an arbitrary lookup.
    ///
    /// Empty values are ignored so a blank `OPENAI_API_KEY=` does not wipe
    /// a key from the config file.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.chat.api_key = key;
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.chat.base_url = url;
        }
        if let Some(token) = get("HF_API_TOKEN") {
            self.inference.api_token = token;
        }
        if let Some(db) = get("CYBERBOT_DATABASE") {
            self.storage.database_path = db;
        }
        if let Some(kb) = get("CYBERBOT_KNOWLEDGE") {
            self.knowledge.path = kb;
        }
        if let Some(port) = get("PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.gateway.port = port;
        }
    }
}

/// Expand `~` and environment references in a configured path.
pub fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 5000 }
fn default_host() -> String { "0.0.0.0".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Chat-completion (AI fallback) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

fn default_chat_base_url() -> String { "https://api.openai.com/v1".into() }
fn default_chat_model() -> String { "gpt-3.5-turbo".into() }
fn default_chat_temperature() -> f32 { 0.4 }
fn default_system_prompt() -> String { "You are CyberBot, a cybersecurity assistant.".into() }
fn default_chat_timeout() -> u64 { 30 }

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_chat_base_url(),
            model: default_chat_model(),
            temperature: default_chat_temperature(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_chat_timeout(),
        }
    }
}

/// Remote inference (phishing / spam models) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_phishing_detector")]
    pub phishing: DetectorConfig,
    #[serde(default = "default_spam_detector")]
    pub spam: DetectorConfig,
}

/// One hosted classification model and the label that means "positive".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub model: String,
    pub positive_label: String,
}

fn default_inference_base_url() -> String { "https://api-inference.huggingface.co".into() }
fn default_inference_timeout() -> u64 { 10 }
fn default_phishing_detector() -> DetectorConfig {
    DetectorConfig {
        model: "ealvaradob/bert-finetuned-phishing".into(),
        positive_label: "phishing".into(),
    }
}
fn default_spam_detector() -> DetectorConfig {
    DetectorConfig {
        model: "mrm8488/bert-tiny-finetuned-sms-spam-detection".into(),
        positive_label: "spam".into(),
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_inference_base_url(),
            timeout_secs: default_inference_timeout(),
            phishing: default_phishing_detector(),
            spam: default_spam_detector(),
        }
    }
}

/// News feeds configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedSource>,
    #[serde(default = "default_per_feed_limit")]
    pub per_feed_limit: usize,
    #[serde(default = "default_digest_size")]
    pub digest_size: usize,
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

fn default_feeds() -> Vec<FeedSource> {
    [
        ("The Hacker News", "https://feeds.feedburner.com/TheHackersNews"),
        ("Krebs on Security", "https://krebsonsecurity.com/feed/"),
        ("CERT-IN", "https://www.cert-in.org.in/rss.xml"),
    ]
    .into_iter()
    .map(|(name, url)| FeedSource { name: name.into(), url: url.into() })
    .collect()
}
fn default_per_feed_limit() -> usize { 10 }
fn default_digest_size() -> usize { 5 }
fn default_feed_timeout() -> u64 { 10 }

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            per_feed_limit: default_per_feed_limit(),
            digest_size: default_digest_size(),
            timeout_secs: default_feed_timeout(),
        }
    }
}

/// Knowledge base location: a JSON file or a directory of JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_path")]
    pub path: String,
}

fn default_knowledge_path() -> String { "~/.cyberbot/knowledge_base".into() }

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self { path: default_knowledge_path() }
    }
}

/// Interaction log / news storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String { "~/.cyberbot/cyberbot.db".into() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self { database_path: default_database_path() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CyberBotConfig::default();
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
        assert!((config.chat.temperature - 0.4).abs() < 0.01);
        assert_eq!(config.inference.timeout_secs, 10);
        assert_eq!(config.news.feeds.len(), 3);
        assert_eq!(config.news.per_feed_limit, 10);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            [gateway]
            port = 8080

            [chat]
            model = "gpt-4o-mini"

            [inference.spam]
            model = "acme/spam-v2"
            positive_label = "LABEL_1"

            [[news.feeds]]
            name = "Local"
            url = "http://localhost/feed.xml"
        "#;

        let config: CyberBotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.chat.model, "gpt-4o-mini");
        assert_eq!(config.inference.spam.positive_label, "LABEL_1");
        assert_eq!(config.inference.phishing.positive_label, "phishing");
        assert_eq!(config.news.feeds, vec![FeedSource {
            name: "Local".into(),
            url: "http://localhost/feed.xml".into(),
        }]);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: CyberBotConfig = toml::from_str("").unwrap();
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.storage.database_path, "~/.cyberbot/cyberbot.db");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-test"),
            ("HF_API_TOKEN", "hf_test"),
            ("CYBERBOT_DATABASE", ":memory:"),
            ("PORT", "9000"),
            ("OPENAI_BASE_URL", "  "),
        ]);
        let mut config = CyberBotConfig::default();
        config.apply_env_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.chat.api_key, "sk-test");
        assert_eq!(config.inference.api_token, "hf_test");
        assert_eq!(config.storage.database_path, ":memory:");
        assert_eq!(config.gateway.port, 9000);
        // Blank values are ignored
        assert_eq!(config.chat.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_invalid_port_env_ignored() {
        let mut config = CyberBotConfig::default();
        config.apply_env_from(|k| (k == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.gateway.port, 5000);
    }

    #[test]
    fn test_home_dir() {
        let home = CyberBotConfig::home_dir();
        assert!(home.to_string_lossy().contains("cyberbot"));
    }
}
