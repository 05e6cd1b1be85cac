//! Webhook error types and their HTTP mapping.
//!
//! Status codes drive the provider's redelivery:
//! - 401: authentication failed, never retried
//! - 500: payload unreadable or collaborator could not record the event

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::dispatch::HandlerError;
use crate::events::PayloadError;

/// Errors surfaced by the webhook endpoint.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature missing, mismatched or malformed while a secret is configured.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body is not a valid `{event, data}` payload.
    #[error("Invalid webhook payload: {0}")]
    MalformedPayload(#[from] PayloadError),

    /// A collaborator could not durably record the event.
    #[error("Webhook processing failed: {0}")]
    Collaborator(#[from] HandlerError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::MalformedPayload(_) | WebhookError::Collaborator(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller. Internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            WebhookError::InvalidSignature => "Invalid signature",
            WebhookError::MalformedPayload(_) => "Invalid webhook payload",
            WebhookError::Collaborator(_) => "Webhook processing failed",
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
