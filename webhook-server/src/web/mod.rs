//! Web server module for receiving payment provider webhooks.
//!
//! Routes:
//! - `GET  /health`             liveness check
//! - `POST /api/helio/webhook`  signed Helio events
//! - `POST /api/helio/test`     synthetic payment echo for smoke tests
//!
//! Every response carries the baseline security headers; browser origins on
//! the configured allow-list get credentialed CORS.

pub mod handlers;
pub mod security;
pub mod signature;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use handlers::{
    health, helio_test, helio_webhook, not_found, signature_from_headers, AppState,
    HealthResponse, TestPaymentRequest, TestPaymentResponse, WebhookResponse,
};
pub use security::{cors_layer, with_security_headers, SECURITY_HEADERS};
pub use signature::{
    compute_signature, is_signature_verification_enabled, verify_helio_signature,
    FALLBACK_SIGNATURE_HEADER, SIGNATURE_HEADER, SIGNATURE_PREFIX,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    let body_limit = state.config.max_body_bytes;
    let cors = cors_layer(&state.config.cors_origins);

    let routes = Router::new()
        .route("/health", get(health))
        .route("/api/helio/webhook", post(helio_webhook))
        .route("/api/helio/test", post(helio_test))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors);

    with_security_headers(routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
