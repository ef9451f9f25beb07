//! # CyberBot Knowledge Base
//!
//! Canned answers to common security questions, loaded once from JSON and
//! read-only afterwards. No ranking, no embeddings: a question is matched
//! by normalized text, exactly or by substring.
//!
//! ```text
//! "What is Phishing??"  → normalize → "what is phishing"
//!   1. exact key            "what is phishing"
//!   2. key inside query     "phishing" ⊂ "what is phishing"
//!   3. query inside key     "phishing" ⊂ "how to report phishing"
//! ```

pub mod normalize;
pub mod store;

pub use normalize::normalize;
pub use store::KnowledgeStore;
