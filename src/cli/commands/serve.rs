use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::app::{router, AppState};
use crate::config::config;
use crate::database::{DatabaseManager, MemoryStore, PgStore, Stores};

pub async fn handle(port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    let config = config();
    tracing::info!("Starting Helpdesk API in {:?} mode", config.environment);

    let stores = if in_memory {
        tracing::warn!("Using the in-memory store; data is lost on exit");
        Stores::from_backend(Arc::new(MemoryStore::new()))
    } else {
        let pool = DatabaseManager::connect(config).await?;
        if let Err(e) = DatabaseManager::run_migrations(&pool).await {
            tracing::warn!("Schema migration failed, continuing with the existing schema: {}", e);
        }
        Stores::from_backend(Arc::new(PgStore::new(pool)))
    };

    let app = router(AppState::from_config(config, stores)?, config);

    let port = port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Helpdesk API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
