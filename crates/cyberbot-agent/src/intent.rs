//! Keyword intent classification.
//!
//! First match wins: news → URL (phishing) → spam → learning → ai.
//! Keywords match as plain substrings of the lowercased message, so
//! `"window"` counts as containing `"win"`.

use cyberbot_core::types::Intent;
use regex::Regex;
use std::sync::LazyLock;

pub const NEWS_KEYWORDS: &[&str] = &[
    "news", "latest", "recent", "breach", "attack", "incident", "update", "today",
];

pub const SPAM_KEYWORDS: &[&str] = &[
    "win", "free", "offer", "click", "urgent", "otp", "bank", "lottery",
];

pub const LEARNING_PHRASES: &[&str] = &[
    "what is", "explain", "how to", "define", "meaning", "difference",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)https?://\S+").unwrap());

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Classify a raw user message.
pub fn classify_intent(message: &str) -> Intent {
    let msg = message.to_lowercase();

    if contains_any(&msg, NEWS_KEYWORDS) {
        Intent::News
    } else if URL_RE.is_match(&msg) {
        Intent::Phishing
    } else if contains_any(&msg, SPAM_KEYWORDS) {
        Intent::Spam
    } else if contains_any(&msg, LEARNING_PHRASES) {
        Intent::Learning
    } else {
        Intent::Ai
    }
}

/// First `http(s)://` URL in the message, original casing kept.
/// The scheme matches case-insensitively, like classification does.
pub fn extract_url(message: &str) -> Option<&str> {
    URL_RE.find(message).map(|m| m.as_str())
}
