mod analysis;
mod config;
mod errors;
mod llm_client;
mod media;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use civicflow_core::RoutingTable;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::media::{LocalDiskStore, MediaStore, S3MediaStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("civicflow_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CivicFlow relay v{}", env!("CARGO_PKG_VERSION"));

    // Routing table: built-in Udaipur contacts unless overridden
    let routing = match &config.routing_table_path {
        Some(path) => RoutingTable::load(path)
            .with_context(|| format!("Failed to load routing table from {}", path.display()))?,
        None => RoutingTable::default(),
    };
    info!("Routing table loaded ({} buckets)", routing.routes().len());

    // Initialize model client
    let model = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )
    .context("Failed to build HTTP client for the model")?;
    info!("LLM client initialized (model: {})", model.model());

    // Local upload dir is always created: it backs the static route even when S3 is on
    let local = LocalDiskStore::create(config.upload_dir.clone())
        .await
        .context("Failed to create upload directory")?;
    let media: Arc<dyn MediaStore> = match &config.s3 {
        Some(s3) => Arc::new(S3MediaStore::connect(s3).await),
        None => Arc::new(local),
    };

    let state = AppState {
        model: Arc::new(model),
        media,
        routing: Arc::new(routing),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // browser client runs on its own origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
