//! Transaction store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::{NewTransaction, Transaction, TransactionCollection};
use crate::error::AppResult;

use super::Page;

/// Listing filter for transactions.
///
/// The date range only applies when both bounds are present.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub page: Page,
    pub account_id: Option<i64>,
    pub operation_id: Option<i64>,
    pub event_date_start: Option<DateTime<Utc>>,
    pub event_date_end: Option<DateTime<Utc>>,
}

/// Owns Transaction records.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create(&self, transaction: NewTransaction) -> AppResult<Transaction>;

    /// Fetch one page of transactions; the collection's `total` is recomputed
    /// from the returned page.
    async fn find_all(&self, filter: TransactionFilter) -> AppResult<TransactionCollection>;
}

pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn find_all_query(filter: &TransactionFilter) -> QueryBuilder<'static, Postgres> {
    let (limit, offset) = filter.page.limit_offset();

    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        r#"SELECT id, account_id, operation_id, amount, event_date FROM "transaction" WHERE true"#,
    );

    if let Some(account_id) = filter.account_id {
        query.push(" AND account_id = ").push_bind(account_id);
    }

    if let Some(operation_id) = filter.operation_id {
        query.push(" AND operation_id = ").push_bind(operation_id);
    }

    if let (Some(start), Some(end)) = (filter.event_date_start, filter.event_date_end) {
        query
            .push(" AND event_date BETWEEN ")
            .push_bind(start)
            .push(" AND ")
            .push_bind(end);
    }

    query
        .push(" ORDER BY id LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    query
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn create(&self, transaction: NewTransaction) -> AppResult<Transaction> {
        let created = sqlx::query_as(
            r#"
            INSERT INTO "transaction" (account_id, operation_id, amount, event_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, account_id, operation_id, amount, event_date
            "#,
        )
        .bind(transaction.account_id)
        .bind(transaction.operation_id)
        .bind(transaction.amount)
        .bind(transaction.event_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_all(&self, filter: TransactionFilter) -> AppResult<TransactionCollection> {
        let transactions = find_all_query(&filter)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        Ok(TransactionCollection::from_page(transactions))
    }
}
