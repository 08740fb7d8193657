//! Account limit service
//!
//! The sole authority for mutating an account's limit.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Account;
use crate::error::{AppError, AppResult};
use crate::store::AccountStore;

/// Anything able to move an account's limit. The posting workflow depends on
/// this seam rather than on the concrete service.
#[async_trait]
pub trait LimitAdjuster: Send + Sync {
    async fn adjust_limit(&self, account: &mut Account, amount: i64, debit: bool) -> AppResult<()>;
}

pub struct AccountLimitService {
    accounts: Arc<dyn AccountStore>,
}

impl AccountLimitService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl LimitAdjuster for AccountLimitService {
    /// Adjust the account limit by `|amount|` in the direction given by `debit`.
    ///
    /// A debit larger than the available limit fails with `LimitExceeded`
    /// before anything is touched; credits always go through. On the non-error
    /// path there is exactly one store write.
    async fn adjust_limit(&self, account: &mut Account, amount: i64, debit: bool) -> AppResult<()> {
        let amount = amount.saturating_abs();

        if debit {
            if amount > account.limit {
                return Err(AppError::LimitExceeded);
            }

            account.limit -= amount;
            return self.accounts.update_limit(account).await;
        }

        account.limit += amount;
        self.accounts.update_limit(account).await
    }
}
