//! Service traits the message router is built from.
//!
//! Every remote dependency sits behind one of these so the router can be
//! constructed once at startup and exercised with in-process fakes in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Verdict;

/// A chat-completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Produce a reply for a single user message.
    async fn reply(&self, message: &str) -> Result<String>;
}

/// A remote text classifier (phishing URL, spam message, ...).
///
/// Never fails: transport and shape problems are folded into [`Verdict`].
#[async_trait]
pub trait TextClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Verdict;
}

/// Downloads raw feed documents.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}
