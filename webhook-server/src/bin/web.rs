//! Sirens Web Server - payment provider webhook receiver.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env` if present)
//! - Serves the Helio webhook, test and health endpoints
//! - Shuts down gracefully on SIGINT/SIGTERM

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sirens::{router, AppState, Config, Dispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal in deployed environments
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(dotenv_loaded = dotenv_loaded, "web_server_starting");

    // Load configuration
    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;
    info!(
        port = config.port,
        webhook_secret_configured = config.webhook_secret.is_some(),
        require_webhook_secret = config.require_webhook_secret,
        request_timeout_ms = config.request_timeout_ms,
        max_body_bytes = config.max_body_bytes,
        cors_origins = ?config.cors_origins,
        "config_loaded"
    );

    if config.webhook_secret.is_none() {
        warn!("webhook_signature_verification_disabled");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    // Create application state
    let state = AppState::new(config, Dispatcher::logging());

    // Build the router
    let app = router(state);

    // Bind to address
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(
        address = %addr,
        webhook_path = "/api/helio/webhook",
        health_path = "/health",
        "web_server_listening"
    );

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
