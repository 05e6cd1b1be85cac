//! Webhook message types.
//!
//! This module defines:
//! - [`WebhookEnvelope`]: the raw inbound bytes plus the provided signature
//! - [`EventKind`]: the closed set of recognized event discriminators
//! - [`ParsedPayload`]: the decoded `{event, data}` wire shape
//! - [`TransactionRecord`]: the transaction carried by recognized events

use std::fmt;

use axum::body::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Currency used when a transaction omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Metadata key flagging a customer's first deposit.
pub const FIRST_DEPOSIT_KEY: &str = "isFirstDeposit";

// =============================================================================
// Envelope
// =============================================================================

/// Raw inbound webhook as received over HTTP.
///
/// `body` holds the exact bytes the signature was computed over. It is never
/// re-serialized before verification.
#[derive(Debug, Clone)]
pub struct WebhookEnvelope {
    /// Unparsed request body
    pub body: Bytes,
    /// Signature token from the request headers, if any
    pub signature: Option<String>,
}

impl WebhookEnvelope {
    pub fn new(body: Bytes, signature: Option<String>) -> Self {
        Self { body, signature }
    }
}

// =============================================================================
// Event kinds
// =============================================================================

/// Event discriminator.
///
/// Matching is by exact string. Anything else lands in `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum EventKind {
    PaymentCompleted,
    PaymentFailed,
    WithdrawalCompleted,
    WithdrawalFailed,
    Unrecognized(String),
}

impl EventKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "payment.completed" => EventKind::PaymentCompleted,
            "payment.failed" => EventKind::PaymentFailed,
            "withdrawal.completed" => EventKind::WithdrawalCompleted,
            "withdrawal.failed" => EventKind::WithdrawalFailed,
            other => EventKind::Unrecognized(other.to_string()),
        }
    }

    /// Wire name of the event.
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::PaymentCompleted => "payment.completed",
            EventKind::PaymentFailed => "payment.failed",
            EventKind::WithdrawalCompleted => "withdrawal.completed",
            EventKind::WithdrawalFailed => "withdrawal.failed",
            EventKind::Unrecognized(other) => other,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, EventKind::Unrecognized(_))
    }
}

impl From<String> for EventKind {
    fn from(raw: String) -> Self {
        match EventKind::parse(&raw) {
            EventKind::Unrecognized(_) => EventKind::Unrecognized(raw),
            known => known,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payload
// =============================================================================

/// Decoded webhook body.
///
/// `data` stays as raw JSON until the event kind is known, so unrecognized
/// events never require a transaction-shaped `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedPayload {
    pub event: EventKind,
    pub data: Value,
}

/// Transaction carried by payment and withdrawal events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Provider transaction identifier
    pub id: String,
    /// Plain numeric amount as sent by the provider
    #[serde(default)]
    pub amount: f64,
    #[serde(
        default = "default_currency",
        deserialize_with = "deserialize_currency"
    )]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Provider error message, only on failure events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl TransactionRecord {
    /// Whether `metadata.isFirstDeposit` is the boolean `true`.
    pub fn is_first_deposit(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(FIRST_DEPOSIT_KEY))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Treat an explicit `null` currency the same as an absent one.
fn deserialize_currency<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_currency))
}

/// Fully decoded webhook event, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    PaymentCompleted(TransactionRecord),
    PaymentFailed(TransactionRecord),
    WithdrawalCompleted(TransactionRecord),
    WithdrawalFailed(TransactionRecord),
    /// Event name the receiver does not handle
    Unrecognized(String),
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WebhookEvent::PaymentCompleted(_) => EventKind::PaymentCompleted,
            WebhookEvent::PaymentFailed(_) => EventKind::PaymentFailed,
            WebhookEvent::WithdrawalCompleted(_) => EventKind::WithdrawalCompleted,
            WebhookEvent::WithdrawalFailed(_) => EventKind::WithdrawalFailed,
            WebhookEvent::Unrecognized(name) => EventKind::Unrecognized(name.clone()),
        }
    }

    pub fn transaction(&self) -> Option<&TransactionRecord> {
        match self {
            WebhookEvent::PaymentCompleted(record)
            | WebhookEvent::PaymentFailed(record)
            | WebhookEvent::WithdrawalCompleted(record)
            | WebhookEvent::WithdrawalFailed(record) => Some(record),
            WebhookEvent::Unrecognized(_) => None,
        }
    }
}
