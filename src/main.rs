//! # CyberBot
//!
//! Cybersecurity assistant backend.
//!
//! Usage:
//!   cyberbot                          # Start the HTTP gateway (default port 5000)
//!   cyberbot serve --port 8080        # Custom port
//!   cyberbot fetch-news               # Refresh the news store and print a digest
//!   cyberbot classify "what is xss"   # Show which handler a message would reach

use anyhow::Result;
use clap::{Parser, Subcommand};
use cyberbot_core::config::{CyberBotConfig, expand_path};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cyberbot",
    version,
    about = "🛡️ CyberBot — cybersecurity assistant backend"
)]
struct Cli {
    /// Config file (default: $CYBERBOT_CONFIG or ~/.cyberbot/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP gateway
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,
        /// Listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fetch all configured feeds once and print the digest
    FetchNews,
    /// Print the intent a message classifies as
    Classify {
        /// Message text
        message: String,
    },
}

fn load_config(explicit: Option<PathBuf>) -> Result<CyberBotConfig> {
    let path = explicit.or_else(|| std::env::var("CYBERBOT_CONFIG").ok().map(PathBuf::from));
    let mut config = match path {
        Some(p) => CyberBotConfig::load_from(&p)?,
        None => CyberBotConfig::load()?,
    };
    config.apply_env();
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "cyberbot=debug,cyberbot_gateway=debug,cyberbot_agent=debug,cyberbot_news=debug,tower_http=debug"
    } else {
        "cyberbot=info,cyberbot_gateway=info,cyberbot_agent=info,cyberbot_news=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = load_config(cli.config)?;
    tracing::debug!("⚙️ Config loaded: {} feed(s), chat model {}", config.news.feeds.len(), config.chat.model);

    match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            println!("🛡️ CyberBot v{}", env!("CARGO_PKG_VERSION"));
            println!("   🌐 API:       http://{}:{}", config.gateway.host, config.gateway.port);
            println!("   🗄️  Database:  {}", config.storage.database_path);
            println!("   📚 Knowledge: {}", config.knowledge.path);
            println!();
            cyberbot_gateway::start(&config).await?;
        }
        Command::FetchNews => {
            let db = cyberbot_db::CyberBotDb::open(&expand_path(&config.storage.database_path))?;
            let client = cyberbot_news::HttpFeedClient::new(config.news.timeout_secs)?;
            let news = cyberbot_news::NewsService::new(&config.news, Arc::new(client), Arc::new(db));

            let report = news.fetch_and_store().await;
            println!(
                "📰 {} parsed, {} new, {} feed(s) failed",
                report.fetched,
                report.inserted,
                report.failed_feeds.len()
            );
            for name in &report.failed_feeds {
                println!("   ❌ {name}");
            }
            println!();
            println!("{}", news.digest()?);
        }
        Command::Classify { message } => {
            let intent = cyberbot_agent::classify_intent(&message);
            let mut out = serde_json::json!({ "intent": intent });
            if let Some(url) = cyberbot_agent::extract_url(&message) {
                out["url"] = serde_json::json!(url);
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(())
}
