//! Ledger entities
//!
//! Plain data carried between the API, services and stores.

mod account;
mod operation;
mod transaction;

pub use account::{Account, NewAccount};
pub use operation::{NewOperation, Operation};
pub use transaction::{NewTransaction, Transaction, TransactionCollection};
