use anyhow::Context;
use dotenvy::dotenv;
use movie_catalog::app;
use movie_catalog::config::settings::AppConfig;
use movie_catalog::infrastructure::db::pool::connect_to_db;
use movie_catalog::infrastructure::db::postgres::PgDocumentStore;
use movie_catalog::infrastructure::storage::s3::S3BlobStore;
use movie_catalog::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting server...");

    let config = AppConfig::new().context("Invalid configuration")?;

    let pool = connect_to_db(&config.database_url, config.store_timeout)
        .await
        .context("Failed to connect to the document store")?;
    let documents = PgDocumentStore::new(pool, &config.movies_collection);
    documents
        .ensure_schema()
        .await
        .context("Failed to prepare the movies collection")?;

    let blobs = S3BlobStore::new(&config.storage, config.store_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState::new(config, Arc::new(blobs), Arc::new(documents));
    let app = app::create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
