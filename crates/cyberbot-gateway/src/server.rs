//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{get, post},
};
use cyberbot_agent::MessageRouter;
use cyberbot_core::config::{CyberBotConfig, expand_path};
use cyberbot_db::CyberBotDb;
use cyberbot_knowledge::KnowledgeStore;
use cyberbot_news::{HttpFeedClient, NewsService};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    pub start_time: std::time::Instant,
    /// Intent classification + handler dispatch.
    pub router: Arc<MessageRouter>,
    /// Interaction log and news storage.
    pub db: Arc<CyberBotDb>,
}

impl AppState {
    /// Construct every service once from configuration.
    pub fn from_config(config: &CyberBotConfig) -> anyhow::Result<Self> {
        let db_path = expand_path(&config.storage.database_path);
        let db = match CyberBotDb::open(&db_path) {
            Ok(db) => {
                tracing::info!("💾 Database initialized: {}", db_path.display());
                db
            }
            Err(e) => {
                tracing::error!("❌ Failed to open database {}: {e}", db_path.display());
                tracing::warn!("⚠️ Falling back to in-memory storage, logs will not persist");
                CyberBotDb::open(std::path::Path::new(":memory:"))?
            }
        };
        let db = Arc::new(db);

        let knowledge = KnowledgeStore::load_or_empty(&expand_path(&config.knowledge.path));

        let chat = cyberbot_providers::create_chat_provider(config)?;
        if config.chat.api_key.is_empty() {
            tracing::warn!("⚠️ OPENAI_API_KEY not set, AI replies will use fallback text");
        }
        let phishing = cyberbot_providers::create_phishing_classifier(config)?;
        let spam = cyberbot_providers::create_spam_classifier(config)?;
        if config.inference.api_token.is_empty() {
            tracing::warn!("⚠️ HF_API_TOKEN not set, phishing/spam checks are unavailable");
        }

        let feed_client = HttpFeedClient::new(config.news.timeout_secs)?;
        let news = NewsService::new(&config.news, Arc::new(feed_client), db.clone());
        tracing::info!("📰 News service ready ({} feeds)", news.feed_count());

        let router = MessageRouter::new(
            Arc::new(chat),
            Arc::new(phishing),
            Arc::new(spam),
            Arc::new(knowledge),
            Arc::new(news),
            db.clone(),
        )
        .with_positive_labels(
            &config.inference.phishing.positive_label,
            &config.inference.spam.positive_label,
        );

        Ok(Self {
            start_time: std::time::Instant::now(),
            router: Arc::new(router),
            db,
        })
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    // Example: CYBERBOT_CORS_ORIGINS=https://cyberbot.example,https://admin.cyberbot.example
    let cors = match std::env::var("CYBERBOT_CORS_ORIGINS") {
        Ok(origins_str) => {
            let origins: Vec<_> = origins_str
                .split(',')
                .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
                .collect();
            cors.allow_origin(origins)
        }
        Err(_) => cors.allow_origin(Any),
    };

    Router::new()
        .route("/", get(super::routes::home))
        .route("/health", get(super::routes::health_check))
        .route("/chat", post(super::routes::chat))
        .route("/history", get(super::routes::history))
        .route("/admin/logs", get(super::routes::admin_logs))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(config: &CyberBotConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 CyberBot gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
