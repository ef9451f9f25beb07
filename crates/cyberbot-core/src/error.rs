//! Unified error type for CyberBot.

/// Errors shared across all CyberBot crates.
#[derive(Debug, thiserror::Error)]
pub enum CyberBotError {
    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("http error: {0}")]
    Http(String),

    /// A remote provider answered, but not with something usable.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider needs an API key and none is configured.
    #[error("API key missing for provider '{0}'")]
    ApiKeyMissing(String),

    /// Persistence failure.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("knowledge base error: {0}")]
    Knowledge(String),

    /// Feed download or parse failure.
    #[error("feed error: {0}")]
    Feed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CyberBotError>;
