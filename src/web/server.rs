//! Web server using Axum.

use std::net::SocketAddr;

use super::router::{create_app_router, AppState};
use crate::config::{ServerConfig, Settings};
use crate::error::{Error, Result};

/// Serve the relay on `config.host:config.port` until Ctrl-C.
pub async fn run_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let app = create_app_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::Web(format!("Invalid address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Feishu relay listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Feishu relay stopped");
    Ok(())
}

/// Build the state from settings and serve it.
pub async fn run_web_server(settings: &Settings) -> Result<()> {
    let state = AppState::from_settings(settings)?;
    run_server(&settings.server, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
