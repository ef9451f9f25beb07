//! Data model shared between the router, storage and HTTP layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which handler owns a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Ai,
    News,
    Phishing,
    Spam,
    Learning,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Ai => "ai",
            Intent::News => "news",
            Intent::Phishing => "phishing",
            Intent::Spam => "spam",
            Intent::Learning => "learning",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(Intent::Ai),
            "news" => Ok(Intent::News),
            "phishing" => Ok(Intent::Phishing),
            "spam" => Ok(Intent::Spam),
            "learning" => Ok(Intent::Learning),
            other => Err(format!("unknown intent '{other}'")),
        }
    }
}

/// One persisted request/response exchange. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub user_message: String,
    pub bot_reply: String,
    pub intent: Intent,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(user_message: &str, bot_reply: &str, intent: Intent) -> Self {
        Self {
            user_message: user_message.to_string(),
            bot_reply: bot_reply.to_string(),
            intent,
            timestamp: Utc::now(),
        }
    }
}

/// A news article pulled from a feed. `link` is the dedup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub source: String,
    pub published: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a remote text-classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Verdict {
    /// The service answered with a label and its confidence in `0.0..=1.0`.
    Success { label: String, score: f64 },
    /// The service answered, but not in the expected shape.
    Malformed,
    /// The service could not be reached or is not configured.
    Unavailable,
}

impl Verdict {
    /// True when the verdict carries `label` (case-insensitive).
    pub fn is_label(&self, label: &str) -> bool {
        matches!(self, Verdict::Success { label: l, .. } if l.eq_ignore_ascii_case(label))
    }

    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_pct(&self) -> Option<f64> {
        match self {
            Verdict::Success { score, .. } => Some((score * 10_000.0).round() / 100.0),
            _ => None,
        }
    }
}

/// Body returned from `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub intent: Intent,
}
