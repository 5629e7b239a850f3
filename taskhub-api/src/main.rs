//! # TaskHub API Server
//!
//! The TaskHub API server: authentication, task CRUD with soft deletes,
//! comments, file attachments and per-user analytics over PostgreSQL.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskhub-api
//! ```

use std::sync::Arc;
use taskhub_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskhub_shared::db::{migrations, pool};
use taskhub_shared::storage::DiskStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskhub_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskHub API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let blobs = DiskStore::new(&config.storage.upload_dir);
    blobs.ensure_root().await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db.clone(), config, Arc::new(blobs));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    pool::close_pool(db).await;

    Ok(())
}
