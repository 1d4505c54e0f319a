//! Binary entry point for the castmatch server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use castmatch_enrichment::PersonDirectory;
use castmatch_recognition::HttpFaceEncoder;
use castmatch_server::{AppState, Config, routes};
use castmatch_store::PgEmbeddingStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;

    let store = PgEmbeddingStore::connect(&config.db.url())
        .await
        .context("connecting to embedding store")?;
    store.migrate().await.context("migrating embedding store")?;

    let state = AppState::new(
        Arc::new(store),
        Arc::new(HttpFaceEncoder::new(config.encoder_url.clone())),
        PersonDirectory::new(
            config.directory_api_key.clone(),
            config.directory_bio_key.clone(),
        ),
        config.scratch_dir.clone(),
    );

    let app = routes::router(Arc::new(state));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!("Listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
