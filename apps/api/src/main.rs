mod chat;
mod config;
mod errors;
mod evaluation;
mod extract;
mod history;
mod llm_client;
mod routes;
mod scenarios;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::history::repository::{FileRepository, InMemoryRepository, Repository};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SimTrainer API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::from_config(&config)?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s, scoring: {}, chat: {})",
        llm.model(),
        config.llm_timeout_secs,
        config.enable_model_scoring,
        config.enable_model_chat
    );

    let repo: Arc<dyn Repository> = match &config.data_dir {
        Some(dir) => {
            info!("Storing conversations under {}", dir.display());
            Arc::new(FileRepository::open(dir).await?)
        }
        None => {
            info!("DATA_DIR not set; conversations are kept in memory");
            Arc::new(InMemoryRepository::new())
        }
    };

    let state = AppState::new(config.clone(), Arc::new(llm), repo);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
