//! API route handlers for the gateway.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
};
use cyberbot_core::types::{ChatReply, LogEntry};
use serde::Deserialize;
use std::sync::Arc;

use super::server::AppState;

/// Optional `?limit=N` on the log views. A value that is not a
/// non-negative integer is ignored and the full log is returned.
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub limit: Option<String>,
}

impl LogQuery {
    pub fn limit(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|l| l.trim().parse().ok())
    }
}

/// Liveness banner.
pub async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "running",
        "message": "CyberBot backend is live 🚀",
    }))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cyberbot-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Route one message. Any body is accepted: a missing, non-string or
/// unparsable `message` is treated as the empty message.
pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Json<ChatReply> {
    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    let message = payload["message"].as_str().unwrap_or("");
    Json(state.router.handle(message).await)
}

/// Interaction log, oldest first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LogQuery>,
) -> Json<Vec<LogEntry>> {
    match state.db.history(q.limit()) {
        Ok(entries) => Json(entries),
        Err(e) => {
            tracing::error!("❌ Failed to read history: {e}");
            Json(Vec::new())
        }
    }
}

/// Interaction log, newest first.
pub async fn admin_logs(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LogQuery>,
) -> Json<Vec<LogEntry>> {
    match state.db.recent_logs(q.limit()) {
        Ok(entries) => Json(entries),
        Err(e) => {
            tracing::error!("❌ Failed to read logs: {e}");
            Json(Vec::new())
        }
    }
}
