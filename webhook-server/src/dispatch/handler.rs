//! Collaborator interfaces invoked by the dispatcher.
//!
//! Production wiring supplies real implementations (ledger, email,
//! accounting); tests supply recording fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::events::TransactionRecord;

/// Failure reported by a collaborator.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The transaction was not durably recorded. The provider should retry.
    #[error("transaction not recorded: {0}")]
    NotRecorded(String),

    /// The collaborator refused the transaction. Retrying cannot help.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

impl HandlerError {
    /// Returns true if the provider should redeliver the webhook.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HandlerError::NotRecorded(_))
    }
}

/// Business-logic boundary for the four recognized event kinds.
#[async_trait]
pub trait TransactionHandler: Send + Sync {
    async fn payment_completed(&self, record: &TransactionRecord) -> Result<(), HandlerError>;

    async fn payment_failed(&self, record: &TransactionRecord) -> Result<(), HandlerError>;

    async fn withdrawal_completed(&self, record: &TransactionRecord) -> Result<(), HandlerError>;

    async fn withdrawal_failed(&self, record: &TransactionRecord) -> Result<(), HandlerError>;
}

/// Balance-crediting boundary used for first-deposit bonuses.
///
/// Implementations own idempotency; the dispatcher does not guard against
/// crediting the same transaction twice.
#[async_trait]
pub trait BonusCreditor: Send + Sync {
    async fn credit_bonus(&self, record: &TransactionRecord, bonus: f64)
        -> Result<(), HandlerError>;
}
