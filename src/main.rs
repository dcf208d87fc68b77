use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use clinic_chat::core::config::{AppPaths, ConfigService};
use clinic_chat::core::logging;
use clinic_chat::server;
use clinic_chat::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths.log_dir, "server.log");

    let config_service = ConfigService::new(paths.clone());
    let config = config_service
        .load_config()
        .with_context(|| format!("Invalid config at {}", config_service.config_path().display()))?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    tracing::info!(
        llm_model = %config.models.llm_model,
        embedding_model = %config.models.embedding_model,
        top_k = config.retrieval.top_k,
        "Starting clinic chat backend"
    );

    let state = AppState::initialize(config).await?;

    match state.llm.health_check().await {
        Ok(true) => tracing::info!("Model server reachable"),
        _ => tracing::warn!("Model server is not reachable; /chat will fail until it is"),
    }

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
