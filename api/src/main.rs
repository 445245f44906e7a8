use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod extract;
mod fixtures;
mod middleware;
mod openapi;
mod routes;
mod state;
mod store;

/// Debug logs for this binary's own modules, request traces from tower-http.
fn default_log_filter() -> String {
    format!("{}=debug,tower_http=info", env!("CARGO_CRATE_NAME"))
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::ServerConfig::from_env();

    std::fs::create_dir_all(&config.log_path).expect("Failed to create log directory");

    tracing::info!(
        fixtures = %config.fixtures_path.display(),
        logs = %config.log_path.display(),
        scenario = %config.default_scenario,
        "Loaded configuration"
    );

    let app = routes::app(state::AppState::new(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Mock tools server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
