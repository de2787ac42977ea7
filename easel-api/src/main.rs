//! # Easel API Server
//!
//! HTTP backend for the Easel artist marketplace: accounts, artist
//! profiles, categories, bookings and reviews.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p easel-api
//! ```
//!
//! Set `LOG_FORMAT=json` for JSON log lines.

use easel_api::{
    app::{build_router, AppState},
    config::Config,
};
use easel_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_lazy_pool, DatabaseConfig},
        Database,
    },
    storage::{BlobStore, HttpBlobStore, MemoryBlobStore},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "easel_api=debug,easel_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect_database(config: &Config) -> anyhow::Result<Database> {
    let Some(url) = config.database.url.as_deref() else {
        warn!("DATABASE_URL not set; reads return empty results and writes fail");
        return Ok(Database::unavailable());
    };

    let pool = create_lazy_pool(&DatabaseConfig {
        url: url.to_string(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })?;

    if config.database.run_migrations {
        run_migrations(&pool).await?;
    }

    Ok(Database::connected(pool))
}

fn blob_store(config: &Config) -> Arc<dyn BlobStore> {
    match config.blob.endpoint.as_deref() {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "Using HTTP blob store");
            Arc::new(HttpBlobStore::new(
                endpoint,
                config.blob.api_key.clone(),
                config.blob.public_url.as_deref(),
            ))
        }
        None => {
            warn!("BLOB_ENDPOINT not set; uploads are kept in memory only");
            Arc::new(MemoryBlobStore::new())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Easel API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        transitions = ?config.bookings.transitions,
        production = config.api.production,
        "Configuration loaded"
    );

    let db = connect_database(&config).await?;
    let blobs = blob_store(&config);
    let address = config.bind_address();

    let app = build_router(AppState::new(db, config, blobs));

    let listener = TcpListener::bind(&address).await?;
    info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
