//! Business services
//!
//! The account limit authority and the transaction posting workflow. These two
//! carry all of the real invariants; everything around them is plumbing.

mod account;
mod transaction;


pub use account::{AccountLimitService, LimitAdjuster};
pub use transaction::{PostTransaction, TransactionService};

use std::time::{Duration, Instant};

/// Wall-clock budget for one posting attempt.
///
/// Every store call made after validation runs under the remaining budget, so
/// a stalled call late in the workflow (compensation included) fails rather
/// than hangs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline(Instant);

impl Deadline {
    pub(crate) fn after(budget: Duration) -> Self {
        Self(Instant::now() + budget)
    }

    pub(crate) fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}
