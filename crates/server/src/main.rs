use db::DbErr;
use server::{AppState, http};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};
use utils_core::assets::asset_dir;

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},services={level},db={level},auth={level},utils_core={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).expect("Failed to create tracing filter");
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    if !asset_dir().exists() {
        std::fs::create_dir_all(asset_dir())?;
    }

    let state = AppState::new().await?;
    let app = http::router(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}")).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown handler: {e}");
        return;
    }
    tracing::info!("shutdown signal received");
}
