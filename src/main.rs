use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use whodunit::{api, config::ServerConfig, state::AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whodunit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting whodunit...");

    let config = ServerConfig::from_env();
    let state = Arc::new(AppState::with_config(config.game.clone()));

    let app = api::router(state)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await
}
