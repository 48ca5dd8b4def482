//! folio-chat - backend for a portfolio site's AI chat widget
//!
//! Serves the portfolio content and runs one conversation per visitor
//! session, answering questions through a hosted Gemini model.

mod api;
mod completion;
mod config;
mod conversation;
mod llm;
mod portfolio;
mod runtime;
mod state_machine;
mod system_prompt;

use api::{create_router, AppState};
use completion::CompletionClient;
use config::AppConfig;
use llm::{GeminiService, LoggingService};
use portfolio::Portfolio;
use runtime::RuntimeManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env();

    // Portfolio content is fixed for the life of the process
    let portfolio = match &config.content_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading portfolio content");
            Portfolio::load(path)?
        }
        None => Portfolio::bundled()?,
    };
    let portfolio = Arc::new(portfolio);

    // The API key is not read here; a missing key only surfaces on first chat
    let gemini = GeminiService::new(
        config.credential(),
        config.model.clone(),
        config.gateway.as_deref(),
    );
    tracing::info!(
        model = %config.model,
        endpoint = %gemini.endpoint(),
        gateway = config.gateway.is_some(),
        "Completion service configured"
    );
    let llm = Arc::new(LoggingService::new(Arc::new(gemini)));
    let client = CompletionClient::new(llm, &portfolio);
    tracing::debug!(
        chars = client.system_instruction().len(),
        owner = %portfolio.owner,
        "System instruction built"
    );

    let runtime = Arc::new(RuntimeManager::new(Arc::new(client), portfolio.greeting()));
    let reaper = runtime.spawn_reaper(config.session_idle);
    tracing::info!(
        idle_secs = config.session_idle.as_secs(),
        "Idle session sweeper started"
    );
    let state = AppState::new(runtime, portfolio);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("folio-chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
