//! Common test utilities
//!
//! In-memory store doubles implementing the store traits, so the full router
//! can be driven without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use card_ledger::api::AppState;
use card_ledger::domain::{
    Account, NewAccount, NewOperation, NewTransaction, Operation, Transaction,
    TransactionCollection,
};
use card_ledger::error::{AppError, AppResult};
use card_ledger::service::{AccountLimitService, TransactionService};
use card_ledger::store::{
    AccountFilter, AccountStore, OperationFilter, OperationStore, TransactionFilter,
    TransactionStore,
};

#[derive(Default)]
pub struct InMemoryAccounts {
    next_id: AtomicI64,
    rows: Mutex<HashMap<i64, Account>>,
}

#[async_trait]
impl AccountStore for InMemoryAccounts {
    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let mut rows = self.rows.lock().unwrap();

        if rows.values().any(|a| a.document == account.document) {
            return Err(AppError::DocumentTaken);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Account {
            id,
            document: account.document,
            limit: account.limit,
            version: 0,
        };
        rows.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Account> {
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::AccountNotFound(id))
    }

    async fn find_all(&self, filter: AccountFilter) -> AppResult<Vec<Account>> {
        let rows = self.rows.lock().unwrap();
        let needle = filter.document.map(|d| d.to_lowercase());

        let mut accounts: Vec<Account> = rows
            .values()
            .filter(|account| match &needle {
                Some(needle) => account.document.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();
        accounts.sort_by_key(|account| account.id);

        let (limit, offset) = filter.page.limit_offset();
        Ok(accounts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn update_limit(&self, account: &mut Account) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&account.id)
            .ok_or(AppError::AccountNotFound(account.id))?;

        if row.version != account.version {
            return Err(AppError::LimitConflict);
        }

        row.limit = account.limit;
        row.version += 1;
        account.version += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryOperations {
    next_id: AtomicI64,
    rows: Mutex<HashMap<i64, Operation>>,
}

#[async_trait]
impl OperationStore for InMemoryOperations {
    async fn create(&self, operation: NewOperation) -> AppResult<Operation> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Operation {
            id,
            description: operation.description,
            debit: operation.debit,
        };
        self.rows.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Operation> {
        self.rows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(AppError::OperationNotFound(id))
    }

    async fn find_all(&self, filter: OperationFilter) -> AppResult<Vec<Operation>> {
        let rows = self.rows.lock().unwrap();
        let needle = filter.description.map(|d| d.to_lowercase());

        let mut operations: Vec<Operation> = rows
            .values()
            .filter(|operation| match filter.debit {
                Some(debit) => operation.debit == debit,
                None => true,
            })
            .filter(|operation| match &needle {
                Some(needle) => operation.description.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();
        operations.sort_by_key(|operation| operation.id);

        let (limit, offset) = filter.page.limit_offset();
        Ok(operations
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryTransactions {
    next_id: AtomicI64,
    rows: Mutex<Vec<Transaction>>,
}

#[async_trait]
impl TransactionStore for InMemoryTransactions {
    async fn create(&self, transaction: NewTransaction) -> AppResult<Transaction> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Transaction {
            id,
            account_id: transaction.account_id,
            operation_id: transaction.operation_id,
            amount: transaction.amount,
            event_date: transaction.event_date,
        };
        self.rows.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn find_all(&self, filter: TransactionFilter) -> AppResult<TransactionCollection> {
        let rows = self.rows.lock().unwrap();

        let mut transactions: Vec<Transaction> = rows
            .iter()
            .filter(|transaction| match filter.account_id {
                Some(account_id) => transaction.account_id == account_id,
                None => true,
            })
            .filter(|transaction| match filter.operation_id {
                Some(operation_id) => transaction.operation_id == operation_id,
                None => true,
            })
            .filter(|transaction| {
                match (filter.event_date_start, filter.event_date_end) {
                    (Some(start), Some(end)) => {
                        transaction.event_date >= start && transaction.event_date <= end
                    }
                    _ => true,
                }
            })
            .cloned()
            .collect();
        transactions.sort_by_key(|transaction| transaction.id);

        let (limit, offset) = filter.page.limit_offset();
        let page = transactions
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok(TransactionCollection::from_page(page))
    }
}

/// Application state over fresh in-memory stores.
pub fn in_memory_state() -> AppState {
    let accounts: Arc<dyn AccountStore> = Arc::new(InMemoryAccounts::default());
    let operations: Arc<dyn OperationStore> = Arc::new(InMemoryOperations::default());
    let transactions: Arc<dyn TransactionStore> = Arc::new(InMemoryTransactions::default());
    let limits = Arc::new(AccountLimitService::new(accounts.clone()));
    let posting = Arc::new(TransactionService::new(
        accounts.clone(),
        operations.clone(),
        transactions.clone(),
        limits,
        Duration::from_secs(1),
    ));

    AppState {
        accounts,
        operations,
        transactions,
        posting,
    }
}
