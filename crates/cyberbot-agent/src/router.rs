//! Message router: one classified message, one handler, one log entry.

use cyberbot_core::error::CyberBotError;
use cyberbot_core::traits::{ChatProvider, TextClassifier};
use cyberbot_core::types::{ChatReply, Intent, LogEntry, Verdict};
use cyberbot_db::CyberBotDb;
use cyberbot_knowledge::KnowledgeStore;
use cyberbot_news::NewsService;
use std::sync::Arc;

use crate::intent::{classify_intent, extract_url};

pub const PHISHING_POSITIVE: &str = "⚠️ This URL is likely a PHISHING website.";
pub const PHISHING_NEGATIVE: &str = "✅ This URL appears LEGITIMATE.";
pub const PHISHING_MALFORMED: &str = "❓ Unable to analyze this URL.";
pub const PHISHING_UNAVAILABLE: &str = "❌ Phishing detection unavailable.";

pub const SPAM_MALFORMED: &str = "❓ Unable to analyze this message.";
pub const SPAM_UNAVAILABLE: &str = "❌ Spam detection unavailable.";

pub const AI_UNAVAILABLE: &str = "⚠️ AI service unavailable. Please try again later.";
pub const AI_LIMIT_REACHED: &str =
    "⚠️ AI limit reached.\nPlease be cautious of unknown links, OTP requests, and urgent messages.";

/// Render a percentage the way users see it: whole numbers keep one
/// decimal (`50.0`), anything else prints its shortest form (`98.77`).
fn format_pct(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{pct:.1}")
    } else {
        format!("{pct}")
    }
}

/// Every service the router dispatches to, built once at startup.
pub struct MessageRouter {
    chat: Arc<dyn ChatProvider>,
    phishing: Arc<dyn TextClassifier>,
    spam: Arc<dyn TextClassifier>,
    knowledge: Arc<KnowledgeStore>,
    news: Arc<NewsService>,
    db: Arc<CyberBotDb>,
    phishing_label: String,
    spam_label: String,
}

impl MessageRouter {
    pub fn new(
        chat: Arc<dyn ChatProvider>,
        phishing: Arc<dyn TextClassifier>,
        spam: Arc<dyn TextClassifier>,
        knowledge: Arc<KnowledgeStore>,
        news: Arc<NewsService>,
        db: Arc<CyberBotDb>,
    ) -> Self {
        Self {
            chat,
            phishing,
            spam,
            knowledge,
            news,
            db,
            phishing_label: "phishing".into(),
            spam_label: "spam".into(),
        }
    }

    /// Override the labels that count as a positive detection.
    pub fn with_positive_labels(mut self, phishing: &str, spam: &str) -> Self {
        self.phishing_label = phishing.to_string();
        self.spam_label = spam.to_string();
        self
    }

    /// Classify, dispatch and log a single message.
    pub async fn handle(&self, message: &str) -> ChatReply {
        let intent = classify_intent(message);
        tracing::info!("🧭 Routing message as '{intent}' ({} chars)", message.len());

        let reply = self.dispatch(intent, message).await;
        self.record(message, &reply, intent);
        ChatReply { reply, intent }
    }

    /// Run the handler that owns `intent`. Always yields reply text.
    pub async fn dispatch(&self, intent: Intent, message: &str) -> String {
        match intent {
            Intent::News => self.news.latest_news_reply().await,
            Intent::Phishing => {
                let target = extract_url(message).unwrap_or(message);
                self.check_phishing(target).await
            }
            Intent::Spam => self.check_spam(message).await,
            Intent::Learning => self.learning_reply(message).await,
            Intent::Ai => self.chat_reply(message).await,
        }
    }

    async fn check_phishing(&self, url: &str) -> String {
        let verdict = self.phishing.classify(url).await;
        tracing::debug!("🎣 {} verdict for {url}: {verdict:?}", self.phishing.name());
        match verdict {
            Verdict::Success { .. } if verdict.is_label(&self.phishing_label) => {
                PHISHING_POSITIVE.to_string()
            }
            Verdict::Success { .. } => PHISHING_NEGATIVE.to_string(),
            Verdict::Malformed => PHISHING_MALFORMED.to_string(),
            Verdict::Unavailable => PHISHING_UNAVAILABLE.to_string(),
        }
    }

    async fn check_spam(&self, text: &str) -> String {
        let verdict = self.spam.classify(text).await;
        tracing::debug!("📨 {} verdict: {verdict:?}", self.spam.name());
        let pct = format_pct(verdict.confidence_pct().unwrap_or_default());
        match verdict {
            Verdict::Success { .. } if verdict.is_label(&self.spam_label) => {
                format!("🚨 This message is SPAM (confidence {pct}%).")
            }
            Verdict::Success { .. } => format!("✅ This message looks safe (confidence {pct}%)."),
            Verdict::Malformed => SPAM_MALFORMED.to_string(),
            Verdict::Unavailable => SPAM_UNAVAILABLE.to_string(),
        }
    }

    async fn learning_reply(&self, message: &str) -> String {
        match self.knowledge.lookup(message) {
            Some(answer) => {
                tracing::debug!("📚 Knowledge base hit");
                answer.to_string()
            }
            None => {
                tracing::debug!("📚 Knowledge base miss, asking {}", self.chat.name());
                self.chat_reply(message).await
            }
        }
    }

    async fn chat_reply(&self, message: &str) -> String {
        match self.chat.reply(message).await {
            Ok(reply) => reply,
            Err(CyberBotError::ApiKeyMissing(provider)) => {
                tracing::warn!("⚠️ No API key for chat provider '{provider}'");
                AI_UNAVAILABLE.to_string()
            }
            Err(e) => {
                tracing::warn!("⚠️ Chat provider '{}' failed: {e}", self.chat.name());
                AI_LIMIT_REACHED.to_string()
            }
        }
    }

    /// Persist the exchange. Storage failures never reach the caller.
    fn record(&self, message: &str, reply: &str, intent: Intent) {
        let entry = LogEntry::new(message, reply, intent);
        if let Err(e) = self.db.append_log(&entry) {
            tracing::error!("❌ Failed to save interaction log: {e}");
        }
    }
}
