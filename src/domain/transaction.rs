//! Transaction entity and the page-scoped collection view

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A posted transaction. Created exactly once per successful posting attempt,
/// immutable afterwards.
///
/// `amount` is signed: negative when the operation is a debit, positive
/// otherwise. The magnitude always equals the absolute value of the requested
/// amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub operation_id: i64,
    pub amount: i64,
    pub event_date: DateTime<Utc>,
}

/// Fields for a transaction that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub operation_id: i64,
    pub amount: i64,
    pub event_date: DateTime<Utc>,
}

/// One page of transactions plus the sum of its amounts.
///
/// `total` is derived from the page contents every time the collection is
/// built; it is never stored and it is not the account's global balance.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionCollection {
    pub total: f64,
    pub transactions: Vec<Transaction>,
}

impl TransactionCollection {
    /// Build a collection from one page of transactions, recomputing `total`.
    pub fn from_page(transactions: Vec<Transaction>) -> Self {
        let mut collection = Self {
            total: 0.0,
            transactions,
        };
        collection.sum();
        collection
    }

    fn sum(&mut self) {
        let total: Decimal = self
            .transactions
            .iter()
            .map(|transaction| Decimal::from(transaction.amount))
            .sum();

        self.total = total.to_f64().unwrap_or_default();
    }
}
