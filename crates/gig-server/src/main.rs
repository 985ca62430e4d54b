//! Gig Server - booking backend for the campus gig marketplace

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gig_server::config::Config;
use gig_server::state::AppState;
use gig_server::{api, persistence};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    let filter = EnvFilter::from_default_env().add_directive("gig_server=debug".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Gig Server...");
    tracing::info!(
        walking_speed_kmh = config.rules.walking_speed_kmh,
        campus_factor = config.rules.campus_factor,
        buffer_minutes = config.rules.travel_buffer_minutes,
        "Scheduling rules loaded"
    );

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await?;
    let port = config.server_port;
    let state = Arc::new(AppState::new(db, config));

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        futures::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
