//! # Taskboard API Server
//!
//! Serves the task board HTTP API: authenticated task CRUD, batch
//! reposition, public client config and health.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskboard-api
//! TASKBOARD_STORE=memory JWT_SECRET=... cargo run -p taskboard-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, StoreConfig},
};
use taskboard_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    store::{memory::MemoryTaskStore, postgres::PgTaskStore, TaskStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let store: Arc<dyn TaskStore> = match &config.store {
        StoreConfig::Postgres { url, max_connections } => {
            let pool = create_pool(DatabaseConfig {
                url: url.clone(),
                max_connections: *max_connections,
                ..Default::default()
            })
            .await
            .context("Failed to connect to database")?;

            run_migrations(&pool).await.context("Failed to run migrations")?;
            Arc::new(PgTaskStore::new(pool))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory task store; tasks are lost on restart");
            Arc::new(MemoryTaskStore::new())
        }
    };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
