//! Event dispatch module.
//!
//! Routes a decoded [`WebhookEvent`] to the matching collaborator method:
//!
//! ```text
//! payment.completed    → TransactionHandler::payment_completed (+ BonusCreditor)
//! payment.failed       → TransactionHandler::payment_failed
//! withdrawal.completed → TransactionHandler::withdrawal_completed
//! withdrawal.failed    → TransactionHandler::withdrawal_failed
//! anything else        → ignored
//! ```
//!
//! Collaborator errors and panics are contained here, per event, and reported
//! through [`DispatchOutcome`]. Dispatch itself never fails.

pub mod handler;
pub mod logging;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::events::{EventKind, TransactionRecord, WebhookEvent};

pub use handler::{BonusCreditor, HandlerError, TransactionHandler};
pub use logging::LoggingHandler;

/// Share of a first deposit credited as a signup bonus.
pub const FIRST_DEPOSIT_BONUS_RATE: f64 = 0.5;

/// Signup bonus owed for a completed payment, if any.
///
/// No cap, rounding or double-credit guard is applied.
pub fn first_deposit_bonus(record: &TransactionRecord) -> Option<f64> {
    record
        .is_first_deposit()
        .then(|| record.amount * FIRST_DEPOSIT_BONUS_RATE)
}

/// Result of dispatching one event.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The collaborator accepted the event.
    Handled {
        kind: EventKind,
        transaction_id: String,
        bonus: Option<f64>,
    },
    /// No collaborator exists for this event name.
    Ignored { event: String },
    /// The collaborator failed or panicked.
    Failed {
        kind: EventKind,
        transaction_id: String,
        error: HandlerError,
    },
}

impl DispatchOutcome {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Handled { .. } => "handled",
            DispatchOutcome::Ignored { .. } => "ignored",
            DispatchOutcome::Failed { .. } => "failed",
        }
    }

    /// Whether the provider should redeliver this webhook.
    pub fn needs_retry(&self) -> bool {
        matches!(self, DispatchOutcome::Failed { error, .. } if error.is_retryable())
    }
}

/// Routes events to collaborators.
#[derive(Clone)]
pub struct Dispatcher {
    handler: Arc<dyn TransactionHandler>,
    creditor: Arc<dyn BonusCreditor>,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn TransactionHandler>, creditor: Arc<dyn BonusCreditor>) -> Self {
        Self { handler, creditor }
    }

    /// Dispatcher backed by [`LoggingHandler`] for every collaborator.
    pub fn logging() -> Self {
        let handler = Arc::new(LoggingHandler);
        Self::new(handler.clone(), handler)
    }

    /// Dispatch one event and wait for its collaborator to finish.
    pub async fn dispatch(&self, event: WebhookEvent) -> DispatchOutcome {
        let kind = event.kind();

        match event {
            WebhookEvent::PaymentCompleted(record) => {
                self.contained(kind, &record, self.payment_completed(&record))
                    .await
            }
            WebhookEvent::PaymentFailed(record) => {
                let work = self.handler.payment_failed(&record).map(|r| r.map(|_| None));
                self.contained(kind, &record, work).await
            }
            WebhookEvent::WithdrawalCompleted(record) => {
                let work = self
                    .handler
                    .withdrawal_completed(&record)
                    .map(|r| r.map(|_| None));
                self.contained(kind, &record, work).await
            }
            WebhookEvent::WithdrawalFailed(record) => {
                let work = self
                    .handler
                    .withdrawal_failed(&record)
                    .map(|r| r.map(|_| None));
                self.contained(kind, &record, work).await
            }
            WebhookEvent::Unrecognized(event) => {
                warn!(event = %event, "webhook_unknown_event");
                DispatchOutcome::Ignored { event }
            }
        }
    }

    async fn payment_completed(&self, record: &TransactionRecord) -> Result<Option<f64>, HandlerError> {
        self.handler.payment_completed(record).await?;

        let bonus = first_deposit_bonus(record);
        if let Some(bonus) = bonus {
            info!(
                transaction_id = %record.id,
                amount = record.amount,
                bonus = bonus,
                "first_deposit_bonus_applying"
            );
            self.creditor.credit_bonus(record, bonus).await?;
        }

        Ok(bonus)
    }

    /// Run collaborator work, turning errors and panics into an outcome.
    async fn contained<F>(&self, kind: EventKind, record: &TransactionRecord, work: F) -> DispatchOutcome
    where
        F: Future<Output = Result<Option<f64>, HandlerError>>,
    {
        info!(event = %kind, transaction_id = %record.id, "webhook_event_processing");

        let result = match AssertUnwindSafe(work).catch_unwind().await {
            Ok(result) => result,
            Err(_) => Err(HandlerError::NotRecorded("collaborator panicked".to_string())),
        };

        match result {
            Ok(bonus) => {
                info!(event = %kind, transaction_id = %record.id, "webhook_event_handled");
                DispatchOutcome::Handled {
                    kind,
                    transaction_id: record.id.clone(),
                    bonus,
                }
            }
            Err(e) => {
                error!(
                    event = %kind,
                    transaction_id = %record.id,
                    retryable = e.is_retryable(),
                    error = %e,
                    "webhook_event_failed"
                );
                DispatchOutcome::Failed {
                    kind,
                    transaction_id: record.id.clone(),
                    error: e,
                }
            }
        }
    }
}
