//! Webhook event model and payload parsing.
//!
//! ## Parsing Flow
//!
//! ```text
//! raw bytes → ParsedPayload {event, data} → WebhookEvent
//! ```
//!
//! `data` must be a JSON object for every event kind. It is only decoded into
//! a [`TransactionRecord`] for recognized kinds; unrecognized kinds pass
//! through without inspecting its fields.

pub mod types;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use types::{
    EventKind, ParsedPayload, TransactionRecord, WebhookEnvelope, WebhookEvent,
    DEFAULT_CURRENCY, FIRST_DEPOSIT_KEY,
};

/// Errors raised while decoding a webhook body.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Body is not JSON or lacks the `{event, data}` shape.
    #[error("malformed webhook body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// `data` is null or not a JSON object.
    #[error("{event} payload data must be an object")]
    InvalidData { event: EventKind },

    /// `data` is not a valid transaction for a recognized event.
    #[error("invalid {event} transaction: {source}")]
    InvalidTransaction {
        event: EventKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode raw webhook bytes into a dispatchable event.
pub fn parse_webhook(body: &[u8]) -> Result<WebhookEvent, PayloadError> {
    let payload: ParsedPayload = serde_json::from_slice(body).map_err(PayloadError::InvalidJson)?;
    WebhookEvent::try_from(payload)
}

impl TryFrom<ParsedPayload> for WebhookEvent {
    type Error = PayloadError;

    fn try_from(payload: ParsedPayload) -> Result<Self, Self::Error> {
        let ParsedPayload { event, data } = payload;

        if !data.is_object() {
            return Err(PayloadError::InvalidData { event });
        }

        let event = match event {
            EventKind::Unrecognized(name) => return Ok(WebhookEvent::Unrecognized(name)),
            known => known,
        };

        let record = decode_transaction(&event, data)?;
        debug!(event = %event, transaction_id = %record.id, "webhook_payload_parsed");

        Ok(match event {
            EventKind::PaymentCompleted => WebhookEvent::PaymentCompleted(record),
            EventKind::PaymentFailed => WebhookEvent::PaymentFailed(record),
            EventKind::WithdrawalCompleted => WebhookEvent::WithdrawalCompleted(record),
            EventKind::WithdrawalFailed => WebhookEvent::WithdrawalFailed(record),
            EventKind::Unrecognized(name) => WebhookEvent::Unrecognized(name),
        })
    }
}

fn decode_transaction(event: &EventKind, data: Value) -> Result<TransactionRecord, PayloadError> {
    serde_json::from_value(data).map_err(|source| PayloadError::InvalidTransaction {
        event: event.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_payment_completed() {
        let body = br#"{
            "event": "payment.completed",
            "data": { "id": "tx_1", "amount": 100, "metadata": { "isFirstDeposit": true } }
        }"#;

        let event = parse_webhook(body).unwrap();

        assert_eq!(event.kind(), EventKind::PaymentCompleted);
        let record = event.transaction().unwrap();
        assert_eq!(record.id, "tx_1");
        assert_eq!(record.amount, 100.0);
        assert!(record.is_first_deposit());
    }

    #[test]
    fn test_parse_failure_event_keeps_error() {
        let body = br#"{
            "event": "withdrawal.failed",
            "data": { "id": "wd_9", "amount": 40, "error": "insufficient funds" }
        }"#;

        match parse_webhook(body).unwrap() {
            WebhookEvent::WithdrawalFailed(record) => {
                assert_eq!(record.error.as_deref(), Some("insufficient funds"));
            }
            other => panic!("Expected WithdrawalFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_unrecognized_ignores_data_fields() {
        let body = br#"{"event": "refund.issued", "data": {"refundId": 7}}"#;
        assert_eq!(
            parse_webhook(body).unwrap(),
            WebhookEvent::Unrecognized("refund.issued".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_non_object_data() {
        for body in [
            &br#"{"event": "refund.issued", "data": null}"#[..],
            &br#"{"event": "refund.issued", "data": "not an object"}"#[..],
            &br#"{"event": "payment.completed", "data": null}"#[..],
            &br#"{"event": "withdrawal.failed", "data": [1, 2]}"#[..],
        ] {
            assert!(
                matches!(parse_webhook(body), Err(PayloadError::InvalidData { .. })),
                "accepted {}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(matches!(
            parse_webhook(b"{not json"),
            Err(PayloadError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(matches!(
            parse_webhook(br#"{"data": {"id": "tx_1"}}"#),
            Err(PayloadError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_webhook(br#"{"event": "payment.completed"}"#),
            Err(PayloadError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_rejects_transaction_without_id() {
        let body = br#"{"event": "payment.failed", "data": {"amount": 5}}"#;
        match parse_webhook(body) {
            Err(PayloadError::InvalidTransaction { event, .. }) => {
                assert_eq!(event, EventKind::PaymentFailed);
            }
            other => panic!("Expected InvalidTransaction, got {:?}", other),
        }
    }
}
