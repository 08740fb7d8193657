//! Account entity

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A ledger account with an available spending limit.
///
/// `limit` is the spending capacity in minor currency units (cents). It is
/// mutated only through the account limit service; nothing else may write it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i64,

    /// External identifier (e.g. a national ID), unique across accounts.
    #[serde(rename = "document_number")]
    #[sqlx(rename = "document_number")]
    pub document: String,

    pub limit: i64,

    /// Fencing token for limit writes. Every persisted limit change bumps it,
    /// and stale writers lose. Not part of the API surface.
    #[serde(skip)]
    pub version: i64,
}

/// Fields for an account that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub document: String,
    pub limit: i64,
}
