//! boardcast - Real-time task-board proxy

use anyhow::{Context, Result};
use boardcast_core::upstream::DEFAULT_API_BASE;
use boardcast_core::{Gateway, ProxyConfig, TrelloClient};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "boardcast",
    version,
    about = "Real-time Trello proxy with cached reads, webhook normalization and SSE fan-out",
    long_about = "A thin real-time proxy between web clients and the Trello API.\n\
                  \n\
                  Forwards card/board mutations, caches board-list reads behind a short TTL,\n\
                  normalizes inbound Trello webhooks into a canonical event taxonomy, and\n\
                  rebroadcasts every change to connected clients over Server-Sent Events.\n\
                  \n\
                  Examples:\n\
                    boardcast serve                          # Run the proxy on port 5000\n\
                    boardcast serve --port 8080              # Custom port\n\
                    boardcast serve --warm-boards B1,B2      # Pre-fetch boards on startup\n\
                    boardcast register-webhook https://proxy.example/webhook B1\n\
                  \n\
                  Environment Variables:\n\
                    BOARDCAST_API_KEY                        # Trello API key (required)\n\
                    BOARDCAST_API_TOKEN                      # Trello API token (required)\n\
                    BOARDCAST_API_BASE                       # Upstream base URL override\n\
                    BOARDCAST_PORT                           # Listen port\n\
                    BOARDCAST_CACHE_TTL_MS                   # Snapshot TTL in milliseconds\n\
                    BOARDCAST_WARM_BOARDS                    # Comma-separated board ids"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Trello API key
    #[arg(long, env = "BOARDCAST_API_KEY")]
    api_key: Option<String>,

    /// Trello API token
    #[arg(long, env = "BOARDCAST_API_TOKEN")]
    api_token: Option<String>,

    /// Upstream API base URL
    #[arg(long, env = "BOARDCAST_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the proxy server (default)
    Serve {
        /// Listen port
        #[arg(long, env = "BOARDCAST_PORT", default_value = "5000")]
        port: u16,

        /// Cached snapshot TTL in milliseconds
        #[arg(long, env = "BOARDCAST_CACHE_TTL_MS", default_value = "30000")]
        cache_ttl_ms: u64,

        /// Comma-separated board ids to pre-fetch on startup
        #[arg(long, env = "BOARDCAST_WARM_BOARDS")]
        warm_boards: Option<String>,
    },
    /// Register a change-notification webhook upstream and exit
    RegisterWebhook {
        /// Publicly reachable URL of this proxy's /webhook endpoint
        callback_url: String,

        /// Board (or other model) id the webhook watches
        id_model: String,

        /// Free-text label stored with the webhook
        #[arg(long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boardcast=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let api_key = cli
        .api_key
        .context("missing Trello API key (--api-key or BOARDCAST_API_KEY)")?;
    let api_token = cli
        .api_token
        .context("missing Trello API token (--api-token or BOARDCAST_API_TOKEN)")?;

    match cli.mode.unwrap_or(Mode::Serve {
        port: 5000,
        cache_ttl_ms: 30_000,
        warm_boards: None,
    }) {
        Mode::Serve {
            port,
            cache_ttl_ms,
            warm_boards,
        } => {
            let config = ProxyConfig {
                api_key,
                api_token,
                api_base: cli.api_base,
                cache_ttl: Duration::from_millis(cache_ttl_ms),
                warm_boards: ProxyConfig::parse_warm_boards(
                    warm_boards.as_deref().unwrap_or_default(),
                ),
            };
            run_serve(config, port).await
        }
        Mode::RegisterWebhook {
            callback_url,
            id_model,
            description,
        } => {
            let client = TrelloClient::new(&cli.api_base, &api_key, &api_token);
            let registered = client
                .register_webhook(&callback_url, &id_model, description.as_deref())
                .await
                .context("webhook registration failed")?;
            println!("{}", serde_json::to_string_pretty(&registered)?);
            Ok(())
        }
    }
}

async fn run_serve(config: ProxyConfig, port: u16) -> Result<()> {
    info!(
        ttl_ms = config.cache_ttl.as_millis() as u64,
        warm_boards = config.warm_boards.len(),
        "starting boardcast proxy"
    );

    let gateway = Arc::new(Gateway::from_config(&config));

    if !config.warm_boards.is_empty() {
        gateway.warm_cache(&config.warm_boards).await;
    }

    boardcast_web::run(gateway, port).await
}
