//! HTTP endpoint handlers.
//!
//! The webhook handler runs the whole boundary pipeline for one delivery:
//! 1. Verify the signature over the raw body (if a secret is configured)
//! 2. Parse the body into an event
//! 3. Dispatch the event and map the outcome to a status code

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::error::{ErrorResponse, WebhookError};
use crate::events::{parse_webhook, WebhookEnvelope, DEFAULT_CURRENCY};
use crate::web::signature::{
    is_signature_verification_enabled, verify_helio_signature, FALLBACK_SIGNATURE_HEADER,
    SIGNATURE_HEADER,
};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: now_rfc3339(),
    })
}

// =============================================================================
// Helio Webhook
// =============================================================================

/// Webhook success response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: &'static str,
}

impl WebhookResponse {
    fn processed() -> Self {
        Self {
            message: "Webhook processed successfully",
        }
    }
}

/// Read the signature from the primary header, falling back to the legacy one.
pub fn signature_from_headers(headers: &HeaderMap) -> Option<String> {
    [SIGNATURE_HEADER, FALLBACK_SIGNATURE_HEADER]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Helio webhook endpoint.
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what the provider sent.
pub async fn helio_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let envelope = WebhookEnvelope::new(body, signature_from_headers(&headers));
    let secret = state.config.webhook_secret();

    info!(
        has_signature = envelope.signature.is_some(),
        has_secret = secret.is_some(),
        body_length = envelope.body.len(),
        "helio_webhook_received"
    );

    if is_signature_verification_enabled(secret) {
        if !verify_helio_signature(&envelope.body, envelope.signature.as_deref(), secret) {
            warn!(body_length = envelope.body.len(), "helio_signature_invalid");
            return Err(WebhookError::InvalidSignature);
        }
    } else {
        debug!("helio_signature_verification_skipped");
    }

    let event = parse_webhook(&envelope.body).map_err(|e| {
        warn!(error = %e, "helio_payload_invalid");
        WebhookError::from(e)
    })?;

    let outcome = state.dispatcher.dispatch(event).await;
    info!(outcome = outcome.label(), "helio_webhook_dispatched");

    match outcome {
        DispatchOutcome::Failed { error, .. } if error.is_retryable() => {
            Err(WebhookError::Collaborator(error))
        }
        _ => Ok(Json(WebhookResponse::processed())),
    }
}

// =============================================================================
// Integration Test Endpoint
// =============================================================================

/// Synthetic payment request for smoke-testing the integration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPaymentRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// Synthetic completed-transaction response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPaymentResponse {
    pub id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub transaction_id: String,
    pub timestamp: String,
}

/// Test endpoint. Echoes a completed transaction without verifying or
/// dispatching anything.
pub async fn helio_test(
    payload: Result<Json<TestPaymentRequest>, JsonRejection>,
) -> Result<Json<TestPaymentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection, "helio_test_payment_invalid");
        (rejection.status(), Json(ErrorResponse { error: "Test failed" }))
    })?;

    info!(
        amount = ?request.amount,
        currency = ?request.currency,
        "helio_test_payment_received"
    );

    let now = Utc::now();
    let millis = now.timestamp_millis();

    Ok(Json(TestPaymentResponse {
        id: format!("test_{}", millis),
        status: "completed",
        amount: request.amount,
        currency: request
            .currency
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        customer_email: request.customer_email,
        customer_name: request.customer_name,
        transaction_id: format!("txn_{}", millis),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

// =============================================================================
// Fallback
// =============================================================================

/// 404 handler for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Endpoint not found",
        }),
    )
}
