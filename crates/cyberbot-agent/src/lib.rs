//! # CyberBot Agent
//!
//! Decides which handler owns a message and runs it.
//!
//! ```text
//! message ─▶ classify_intent ─▶ news     ─▶ NewsService (fetch + digest)
//!                             ├▶ phishing ─▶ phishing model (first URL only)
//!                             ├▶ spam     ─▶ spam model
//!                             ├▶ learning ─▶ KnowledgeStore ─(miss)─▶ chat
//!                             └▶ ai       ─▶ chat
//!                                   │
//!                                   ▼
//!                             append LogEntry, return ChatReply
//! ```

pub mod intent;
pub mod router;

pub use intent::{classify_intent, extract_url};
pub use router::MessageRouter;
