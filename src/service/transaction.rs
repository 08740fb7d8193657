//! Transaction posting service
//!
//! Orchestrates one posting attempt end to end: validate, resolve account and
//! operation, adjust the limit, persist the record, and reverse the limit
//! change if persistence fails afterward.
//!
//! The limit write and the transaction insert are two independent store calls,
//! not one atomic commit. The reversal is a best-effort application-level undo
//! of the first write, attempted once; its own failure is logged and swallowed
//! while the original persistence error is what the caller sees.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;

use crate::domain::{NewTransaction, Transaction};
use crate::error::{AppError, AppResult};
use crate::store::{AccountStore, OperationStore, TransactionStore};

use super::account::LimitAdjuster;
use super::Deadline;

/// Attempts at the limit write before a lost concurrent update is surfaced.
const LIMIT_WRITE_ATTEMPTS: u32 = 3;

/// A request to post one transaction against an account.
#[derive(Debug, Clone, Deserialize)]
pub struct PostTransaction {
    #[serde(default)]
    pub account_id: i64,
    #[serde(default)]
    pub operation_id: i64,
    #[serde(default)]
    pub amount: i64,
}

impl PostTransaction {
    /// Shape check only; never touches storage. Every failed field is
    /// reported, not just the first.
    pub fn validate(&self) -> AppResult<()> {
        let mut failures = Vec::new();

        if self.account_id <= 0 {
            failures.push("account_id is required".to_string());
        }
        if self.operation_id <= 0 {
            failures.push("operation_id is required".to_string());
        }
        if self.amount == 0 {
            failures.push("amount is required".to_string());
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(failures))
        }
    }
}

pub struct TransactionService {
    accounts: Arc<dyn AccountStore>,
    operations: Arc<dyn OperationStore>,
    transactions: Arc<dyn TransactionStore>,
    limits: Arc<dyn LimitAdjuster>,
    timeout: Duration,
}

impl TransactionService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        operations: Arc<dyn OperationStore>,
        transactions: Arc<dyn TransactionStore>,
        limits: Arc<dyn LimitAdjuster>,
        timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            operations,
            transactions,
            limits,
            timeout,
        }
    }

    /// Post one transaction.
    ///
    /// Strict order, no step skipped: validate, resolve account, resolve
    /// operation, adjust limit, persist, compensate on persistence failure.
    /// Every failure aborts the remaining steps and is returned as-is; the
    /// only error that triggers further internal action is a failed insert,
    /// which gets one reversing limit call before it is surfaced.
    pub async fn post(&self, request: PostTransaction) -> AppResult<Transaction> {
        if let Err(err) = request.validate() {
            tracing::error!(error = %err, "transaction request failed validation");
            return Err(err);
        }

        let deadline = Deadline::after(self.timeout);

        let mut account = bounded(&deadline, self.accounts.find_by_id(request.account_id)).await?;
        let operation = bounded(&deadline, self.operations.find_by_id(request.operation_id)).await?;

        // Read-modify-write on the limit: on a lost concurrent write, re-read
        // the account and try again from fresh state, a bounded number of times.
        let mut attempts = 0;
        loop {
            attempts += 1;

            let adjusted = bounded(
                &deadline,
                self.limits
                    .adjust_limit(&mut account, request.amount, operation.debit),
            )
            .await;

            match adjusted {
                Ok(()) => break,
                Err(AppError::LimitConflict) if attempts < LIMIT_WRITE_ATTEMPTS => {
                    tracing::debug!(
                        account_id = request.account_id,
                        attempts,
                        "lost a concurrent limit write, re-reading account"
                    );
                    account =
                        bounded(&deadline, self.accounts.find_by_id(request.account_id)).await?;
                }
                Err(err) => {
                    tracing::error!(account_id = request.account_id, error = %err, "limit adjustment failed");
                    return Err(err);
                }
            }
        }

        let mut amount = request.amount.saturating_abs();
        if operation.debit {
            amount = -amount;
        }

        let record = NewTransaction {
            account_id: request.account_id,
            operation_id: request.operation_id,
            amount,
            event_date: Utc::now(),
        };

        let created = bounded(&deadline, self.transactions.create(record)).await;

        match created {
            Ok(transaction) => Ok(transaction),
            Err(err) => {
                // The limit was already moved; undo it with the inverse flag
                // and the same magnitude. Best effort: the original insert
                // error is what the caller gets either way.
                let reversed = bounded(
                    &deadline,
                    self.limits
                        .adjust_limit(&mut account, request.amount, !operation.debit),
                )
                .await;

                if let Err(undo) = reversed {
                    tracing::warn!(
                        account_id = request.account_id,
                        error = %undo,
                        "limit compensation failed, account limit may be inconsistent"
                    );
                }

                tracing::error!(account_id = request.account_id, error = %err, "transaction create failed, limit change reversed");
                Err(err)
            }
        }
    }
}

/// Run a store call under the posting deadline's remaining budget.
async fn bounded<T>(deadline: &Deadline, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
    match tokio::time::timeout(deadline.remaining(), call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::DeadlineExceeded),
    }
}
