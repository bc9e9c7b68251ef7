mod config;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::post, Router};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use config::ServerConfig;
use state::{AppState, RateProvider};

// Bank exports are small; anything past this is not a CSV upload.
const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load()?;

    let pool = moneta_storage::create_db(&config.database_path).await?;
    moneta_storage::seed_default_categories(&pool).await?;
    info!("database ready at {}", config.database_path.display());

    let state = Arc::new(AppState {
        pool,
        rate: RateProvider::from_config(&config.rate),
    });

    let router = Router::new()
        .route("/api/import/preview", post(routes::import_preview))
        .route("/api/import/commit", post(routes::import_commit))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(&config.bind).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
