//! # CyberBot Providers
//!
//! Clients for the remote services CyberBot delegates to:
//! - [`OpenAiCompatibleProvider`] — chat completions for the AI fallback.
//! - [`InferenceClassifier`] — hosted text-classification models
//!   (phishing URLs, spam messages).
//!
//! Each client makes exactly one request per call with a fixed timeout.

pub mod inference;
pub mod openai_compatible;

pub use inference::InferenceClassifier;
pub use openai_compatible::OpenAiCompatibleProvider;

use cyberbot_core::config::CyberBotConfig;
use cyberbot_core::error::Result;

/// Chat provider from configuration.
pub fn create_chat_provider(config: &CyberBotConfig) -> Result<OpenAiCompatibleProvider> {
    OpenAiCompatibleProvider::from_config(&config.chat)
}

/// Phishing URL classifier from configuration.
pub fn create_phishing_classifier(config: &CyberBotConfig) -> Result<InferenceClassifier> {
    InferenceClassifier::new("phishing", &config.inference, &config.inference.phishing)
}

/// Spam message classifier from configuration.
pub fn create_spam_classifier(config: &CyberBotConfig) -> Result<InferenceClassifier> {
    InferenceClassifier::new("spam", &config.inference, &config.inference.spam)
}
