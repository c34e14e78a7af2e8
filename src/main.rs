mod config;
mod db;
mod entities;
mod error;
mod models;
mod repository;
mod routes;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    repository::{DbMovieStore, MovieStore},
};

pub struct AppState {
    pub store: Arc<dyn MovieStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movies_api=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let db = db::connect(&config).await?;
    let state = Arc::new(AppState { store: Arc::new(DbMovieStore::new(db)) });

    let app = routes::router(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
