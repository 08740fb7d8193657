//! Operation type entity

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered operation type, referenced by every transaction.
///
/// `debit` is the sign flag: when true, posting a transaction with this
/// operation decreases the account limit (a charge); when false, it increases
/// the limit (a payment). Operations are immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Operation {
    pub id: i64,
    pub description: String,
    pub debit: bool,
}

/// Fields for an operation that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewOperation {
    pub description: String,
    pub debit: bool,
}
