use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::is_production;
use crate::router::app;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    if config.uses_development_secret() {
        if is_production!(config) {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        warn!("Signing tokens with the built-in development secret; set JWT_SECRET");
    }

    info!("Starting Conduit API in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config)
        .await
        .context("failed to open database")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Conduit API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
