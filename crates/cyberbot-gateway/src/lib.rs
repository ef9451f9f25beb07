//! # CyberBot Gateway
//!
//! HTTP surface:
//! - `GET  /`            — liveness banner
//! - `GET  /health`      — health check
//! - `POST /chat`        — `{message}` → `{reply, intent}`
//! - `GET  /history`     — interaction log, oldest first
//! - `GET  /admin/logs`  — interaction log, newest first

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
