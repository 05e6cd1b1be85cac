//! Log-only collaborator.
//!
//! Records each transaction as a structured log line and succeeds. Used by
//! the binary until real balance, email and accounting services are wired in.

use async_trait::async_trait;
use tracing::{info, warn};

use super::handler::{BonusCreditor, HandlerError, TransactionHandler};
use crate::events::TransactionRecord;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandler;

#[async_trait]
impl TransactionHandler for LoggingHandler {
    async fn payment_completed(&self, record: &TransactionRecord) -> Result<(), HandlerError> {
        info!(
            transaction_id = %record.id,
            amount = record.amount,
            currency = %record.currency,
            customer_email = ?record.customer_email,
            customer_name = ?record.customer_name,
            "payment_completed"
        );
        Ok(())
    }

    async fn payment_failed(&self, record: &TransactionRecord) -> Result<(), HandlerError> {
        warn!(
            transaction_id = %record.id,
            amount = record.amount,
            customer_email = ?record.customer_email,
            error = ?record.error,
            "payment_failed"
        );
        Ok(())
    }

    async fn withdrawal_completed(&self, record: &TransactionRecord) -> Result<(), HandlerError> {
        info!(
            transaction_id = %record.id,
            amount = record.amount,
            customer_email = ?record.customer_email,
            "withdrawal_completed"
        );
        Ok(())
    }

    async fn withdrawal_failed(&self, record: &TransactionRecord) -> Result<(), HandlerError> {
        warn!(
            transaction_id = %record.id,
            amount = record.amount,
            customer_email = ?record.customer_email,
            error = ?record.error,
            "withdrawal_failed"
        );
        Ok(())
    }
}

#[async_trait]
impl BonusCreditor for LoggingHandler {
    async fn credit_bonus(
        &self,
        record: &TransactionRecord,
        bonus: f64,
    ) -> Result<(), HandlerError> {
        info!(
            transaction_id = %record.id,
            bonus = bonus,
            currency = %record.currency,
            "first_deposit_bonus_credited"
        );
        Ok(())
    }
}
