//! Sirens webhook receiver.
//!
//! Accepts payment provider callbacks, verifies their HMAC signature and
//! dispatches each event to a business-logic collaborator.
//!
//! ## Architecture
//!
//! ```text
//! raw bytes → Verifier → parse_webhook → Dispatcher → TransactionHandler
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use dispatch::{
    first_deposit_bonus, BonusCreditor, DispatchOutcome, Dispatcher, HandlerError,
    LoggingHandler, TransactionHandler, FIRST_DEPOSIT_BONUS_RATE,
};
pub use error::WebhookError;
pub use events::{
    parse_webhook, EventKind, ParsedPayload, PayloadError, TransactionRecord, WebhookEnvelope,
    WebhookEvent,
};
pub use web::{router, verify_helio_signature, AppState};
